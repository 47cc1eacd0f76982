//! Analysis coordinator: filter once, then fan out.
//!
//! `analyze` is the explicit composition of the pipeline stages. It filters
//! the ledger a single time and hands the same subset to the monthly
//! aggregator, the range return calculator and the panel builder. No state
//! survives between calls.

use leverlab_core::{
    aggregate_by_month, filter_with_mode, range_returns, AnalysisError, DatasetHash, FilterMode,
    FilterParams, Ledger, MonthlyBucket, RangeReturns, ValidationError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::panels::Panels;
use crate::selection::FilterSelection;

/// Current schema version for persisted reports.
///
/// Bump this when the serialized shape of `AnalysisReport` changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
}

impl From<ValidationError> for RunError {
    fn from(err: ValidationError) -> Self {
        RunError::Analysis(err.into())
    }
}

/// The three scalar indicators shown for a selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    pub benchmark_return_pct: f64,
    pub strategy_return_pct: f64,
    pub strategy_vs_market_pct: f64,
}

impl From<RangeReturns> for Indicators {
    fn from(r: RangeReturns) -> Self {
        Self {
            benchmark_return_pct: r.benchmark_return_pct,
            strategy_return_pct: r.strategy_return_pct,
            strategy_vs_market_pct: r.strategy_vs_market(),
        }
    }
}

/// Everything derived from one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub schema_version: u32,
    pub dataset_hash: DatasetHash,
    pub params: FilterParams,
    pub trade_count: usize,
    /// Most recent month first.
    pub monthly: Vec<MonthlyBucket>,
    /// `None` when the selection matched no trades.
    pub indicators: Option<Indicators>,
    pub panels: Panels,
}

impl AnalysisReport {
    pub fn is_empty(&self) -> bool {
        self.trade_count == 0
    }
}

/// Run the pipeline for already validated parameters.
pub fn analyze_params(
    ledger: &Ledger,
    params: &FilterParams,
    mode: FilterMode,
) -> Result<AnalysisReport, RunError> {
    let trades = filter_with_mode(ledger, params, mode)?;
    debug!(
        exchange = params.exchange(),
        leverage = params.leverage(),
        matched = trades.len(),
        "filtered ledger"
    );

    let monthly = aggregate_by_month(&trades)?;
    let indicators = match range_returns(&trades) {
        Ok(returns) => Some(Indicators::from(returns)),
        Err(AnalysisError::EmptyRange) => None,
        Err(e) => return Err(e.into()),
    };
    let panels = Panels::build(&trades, &monthly);

    info!(
        exchange = params.exchange(),
        leverage = params.leverage(),
        trades = trades.len(),
        months = monthly.len(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        schema_version: SCHEMA_VERSION,
        dataset_hash: ledger.fingerprint(),
        params: params.clone(),
        trade_count: trades.len(),
        monthly,
        indicators,
        panels,
    })
}

/// Resolve an untyped selection against the ledger and run the pipeline.
pub fn analyze(
    ledger: &Ledger,
    selection: &FilterSelection,
    mode: FilterMode,
) -> Result<AnalysisReport, RunError> {
    let params = selection.resolve(ledger)?;
    analyze_params(ledger, &params, mode)
}
