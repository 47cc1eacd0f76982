//! Filter option discovery: which exchanges, leverage tiers and date ranges
//! a ledger can be sliced by.

use chrono::NaiveDateTime;
use leverlab_core::Ledger;
use serde::{Deserialize, Serialize};

/// Exchange preselected when the ledger contains it.
pub const DEFAULT_EXCHANGE: &str = "Bitmex";
/// Leverage tier preselected when the ledger contains it.
pub const DEFAULT_LEVERAGE: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeOption {
    pub name: String,
    pub trade_count: usize,
    /// Leverage tiers traded on this exchange, first appearance order.
    pub leverages: Vec<u32>,
    pub first_trade: NaiveDateTime,
    pub last_trade: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub exchanges: Vec<ExchangeOption>,
    /// Every leverage tier in the ledger.
    pub leverages: Vec<u32>,
    pub default_exchange: Option<String>,
    pub default_leverage: Option<u32>,
}

impl FilterOptions {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let exchanges: Vec<ExchangeOption> = ledger
            .exchanges()
            .into_iter()
            .filter_map(|name| {
                let (first_trade, last_trade) = ledger.time_bounds(name)?;
                let mut leverages = Vec::new();
                let mut trade_count = 0;
                for r in ledger.iter().filter(|r| r.exchange == name) {
                    trade_count += 1;
                    if !leverages.contains(&r.leverage) {
                        leverages.push(r.leverage);
                    }
                }
                Some(ExchangeOption {
                    name: name.to_string(),
                    trade_count,
                    leverages,
                    first_trade,
                    last_trade,
                })
            })
            .collect();

        let leverages = ledger.leverages();

        let default_exchange = exchanges
            .iter()
            .find(|e| e.name == DEFAULT_EXCHANGE)
            .or_else(|| exchanges.first())
            .map(|e| e.name.clone());
        let default_leverage = if leverages.contains(&DEFAULT_LEVERAGE) {
            Some(DEFAULT_LEVERAGE)
        } else {
            leverages.first().copied()
        };

        Self {
            exchanges,
            leverages,
            default_exchange,
            default_leverage,
        }
    }

    pub fn exchange(&self, name: &str) -> Option<&ExchangeOption> {
        self.exchanges.iter().find(|e| e.name == name)
    }
}
