//! Domain types for LeverLab

pub mod ids;
pub mod ledger;
pub mod period;
pub mod trade;

pub use ids::DatasetHash;
pub use ledger::Ledger;
pub use period::YearMonth;
pub use trade::{TradeRecord, TradeType};
