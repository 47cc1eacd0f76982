//! LeverLab Core: ledger, filter engine, monthly aggregation, range returns.
//!
//! This crate contains the pure analysis pipeline:
//! - Domain types (trade records, the descending-by-time ledger, month keys)
//! - Filter engine over exchange, leverage tier and inclusive date range
//! - Monthly aggregator (entry/exit balance and return per calendar month)
//! - Range return calculator (strategy vs. BTC benchmark over a window)
//! - Typed errors for every failure the pipeline can report
//!
//! Nothing here performs I/O or holds state between calls; every result is a
//! function of the ledger and the filter parameters passed in.

pub mod domain;
pub mod error;
pub mod filter;
pub mod monthly;
pub mod returns;

pub use domain::{DatasetHash, Ledger, TradeRecord, TradeType, YearMonth};
pub use error::{AnalysisError, ErrorKind, ReturnLeg, ValidationError};
pub use filter::{filter, filter_with_mode, parse_leverage, FilterMode, FilterParams, FilteredTrades};
pub use monthly::{aggregate_by_month, MonthlyBucket};
pub use returns::{range_returns, RangeReturns};
