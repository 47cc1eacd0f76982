//! Monthly aggregator: per calendar month entry/exit balance and return.

use serde::{Deserialize, Serialize};

use crate::domain::YearMonth;
use crate::error::{AnalysisError, ReturnLeg};
use crate::filter::FilteredTrades;

/// One calendar month of a filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub year_month: YearMonth,
    /// Entry balance of the oldest trade in the month.
    pub entry_balance: f64,
    /// Exit balance of the most recent trade in the month.
    pub exit_balance: f64,
    /// `exit * 100 / entry - 100`.
    pub return_pct: f64,
    pub trade_count: usize,
    pub pnl_incl_fees: f64,
}

/// Percentage change from `base` to `value`.
///
/// `None` when `base` is zero or the quotient overflows (a subnormal base,
/// an extreme value), so no stage ever reports an infinite return.
pub(crate) fn pct_change(value: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    let pct = value * 100.0 / base - 100.0;
    pct.is_finite().then_some(pct)
}

/// Bucket a subset by year-month.
///
/// Buckets come out in the order their first record appears, i.e. most
/// recent month first. Callers that chart chronologically reverse the result.
/// A descending subset keeps each month contiguous, so one pass suffices.
pub fn aggregate_by_month(trades: &FilteredTrades<'_>) -> Result<Vec<MonthlyBucket>, AnalysisError> {
    let mut buckets: Vec<MonthlyBucket> = Vec::new();

    for record in trades {
        let ym = record.year_month();
        match buckets.last_mut() {
            Some(bucket) if bucket.year_month == ym => {
                // Later in the slice means older, so this becomes the month's entry.
                bucket.entry_balance = record.entry_balance;
                bucket.trade_count += 1;
                bucket.pnl_incl_fees += record.pnl_incl_fees;
            }
            _ => buckets.push(MonthlyBucket {
                year_month: ym,
                entry_balance: record.entry_balance,
                exit_balance: record.exit_balance,
                return_pct: 0.0,
                trade_count: 1,
                pnl_incl_fees: record.pnl_incl_fees,
            }),
        }
    }

    for bucket in &mut buckets {
        bucket.return_pct = pct_change(bucket.exit_balance, bucket.entry_balance)
            .ok_or(AnalysisError::DivisionByZero(ReturnLeg::Monthly(bucket.year_month)))?;
    }

    Ok(buckets)
}
