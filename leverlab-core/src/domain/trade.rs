//! TradeRecord: one closed leveraged trade from the execution log.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::period::YearMonth;
use crate::error::ValidationError;

/// Direction of a closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeType {
    Long,
    Short,
}

impl std::fmt::Display for TradeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeType::Long => write!(f, "Long"),
            TradeType::Short => write!(f, "Short"),
        }
    }
}

/// A single closed trade.
///
/// Balances are the account balance immediately before (`entry_balance`)
/// and after (`exit_balance`) the trade. `btc_price` is the reference asset
/// price at `entry_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Display aid only; never used for ordering.
    pub sequence_number: i64,
    pub exchange: String,
    pub leverage: u32,
    pub trade_type: TradeType,
    pub entry_time: NaiveDateTime,
    pub entry_balance: f64,
    pub exit_balance: f64,
    pub pnl_incl_fees: f64,
    pub btc_price: f64,
}

impl TradeRecord {
    /// Calendar bucket this trade falls into.
    pub fn year_month(&self) -> YearMonth {
        YearMonth::from_datetime(self.entry_time)
    }

    /// Notional exposure of the trade: entry balance times leverage.
    pub fn exposure(&self) -> f64 {
        self.entry_balance * self.leverage as f64
    }

    /// Check the per-record contract enforced when a ledger is built.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.leverage == 0 {
            return Err(ValidationError::NonPositiveLeverage { value: 0 });
        }
        let fields = [
            ("entry_balance", self.entry_balance),
            ("exit_balance", self.exit_balance),
            ("pnl_incl_fees", self.pnl_incl_fees),
            ("btc_price", self.btc_price),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteField {
                    sequence_number: self.sequence_number,
                    field,
                });
            }
        }
        Ok(())
    }
}
