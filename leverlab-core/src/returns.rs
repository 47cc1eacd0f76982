//! Range return calculator: whole-window strategy and benchmark returns.
//!
//! Both legs read the head (most recent) and tail (oldest) of a descending
//! subset:
//!
//! - benchmark = `head.btc_price * 100 / tail.btc_price - 100`
//! - strategy  = `head.entry_balance * 100 / tail.exit_balance - 100`
//!
//! The strategy leg deliberately pairs the most recent *entry* balance with
//! the oldest *exit* balance. This matches the historical reports built from
//! these ledgers and must not be swapped for a first-entry/last-exit formula.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, ReturnLeg};
use crate::filter::FilteredTrades;
use crate::monthly::pct_change;

/// Window returns in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeReturns {
    pub strategy_return_pct: f64,
    pub benchmark_return_pct: f64,
}

impl RangeReturns {
    /// Strategy minus benchmark, in percentage points.
    pub fn strategy_vs_market(&self) -> f64 {
        self.strategy_return_pct - self.benchmark_return_pct
    }
}

pub fn range_returns(trades: &FilteredTrades<'_>) -> Result<RangeReturns, AnalysisError> {
    let (head, tail) = match (trades.head(), trades.tail()) {
        (Some(head), Some(tail)) => (head, tail),
        _ => return Err(AnalysisError::EmptyRange),
    };

    let benchmark_return_pct = pct_change(head.btc_price, tail.btc_price)
        .ok_or(AnalysisError::DivisionByZero(ReturnLeg::Benchmark))?;
    let strategy_return_pct = pct_change(head.entry_balance, tail.exit_balance)
        .ok_or(AnalysisError::DivisionByZero(ReturnLeg::Strategy))?;

    Ok(RangeReturns {
        strategy_return_pct,
        benchmark_return_pct,
    })
}
