//! Untyped filter selection as it arrives from a config file or the CLI.
//!
//! A selection may leave either date bound open. Open bounds fall back to
//! the selected exchange's first and last trade, the same range a user sees
//! preselected when switching exchange.

use chrono::{NaiveDate, NaiveDateTime};
use leverlab_core::{FilterParams, Ledger, ValidationError};
use serde::{Deserialize, Serialize};

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a naive timestamp. A bare `YYYY-MM-DD` means midnight of that day.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Filter choice before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub exchange: String,
    /// Leverage exactly as typed; validated when the selection is resolved.
    pub leverage: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl FilterSelection {
    pub fn new(exchange: impl Into<String>, leverage: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            leverage: leverage.into(),
            start: None,
            end: None,
        }
    }

    pub fn with_range(mut self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Fill open bounds from the ledger and validate.
    ///
    /// Bounds come from the exchange's own trades when it has any, otherwise
    /// from the whole ledger, otherwise the widest representable range.
    pub fn resolve(&self, ledger: &Ledger) -> Result<FilterParams, ValidationError> {
        let (lo, hi) = ledger
            .time_bounds(&self.exchange)
            .or_else(|| ledger.overall_bounds())
            .unwrap_or((NaiveDateTime::MIN, NaiveDateTime::MAX));
        FilterParams::parse(
            self.exchange.clone(),
            &self.leverage,
            self.start.unwrap_or(lo),
            self.end.unwrap_or(hi),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leverlab_core::{TradeRecord, TradeType};

    fn ts(text: &str) -> NaiveDateTime {
        parse_timestamp(text).unwrap()
    }

    fn trade(exchange: &str, when: &str) -> TradeRecord {
        TradeRecord {
            sequence_number: 1,
            exchange: exchange.into(),
            leverage: 1,
            trade_type: TradeType::Long,
            entry_time: ts(when),
            entry_balance: 1.0,
            exit_balance: 1.0,
            pnl_incl_fees: 0.0,
            btc_price: 1.0,
        }
    }

    #[test]
    fn parses_supported_formats() {
        assert_eq!(ts("2020-03-04").to_string(), "2020-03-04 00:00:00");
        assert_eq!(ts("2020-03-04 05:06:07").to_string(), "2020-03-04 05:06:07");
        assert_eq!(ts("2020-03-04T05:06:07").to_string(), "2020-03-04 05:06:07");
        assert_eq!(ts("2020-03-04 05:06").to_string(), "2020-03-04 05:06:00");
        assert_eq!(
            ts("2020-03-04 05:06:07.250").to_string(),
            "2020-03-04 05:06:07.250"
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("March 4th").is_none());
        assert!(parse_timestamp("2020-13-01").is_none());
    }

    #[test]
    fn open_bounds_use_exchange_range() {
        let ledger = Ledger::from_records(vec![
            trade("Bitmex", "2020-01-05 10:00:00"),
            trade("Bitmex", "2020-04-01 09:30:00"),
            trade("Deribit", "2021-01-01 00:00:00"),
        ])
        .unwrap();
        let params = FilterSelection::new("Bitmex", "1").resolve(&ledger).unwrap();
        assert_eq!(params.start(), ts("2020-01-05 10:00:00"));
        assert_eq!(params.end(), ts("2020-04-01 09:30:00"));
    }

    #[test]
    fn explicit_bounds_win() {
        let ledger = Ledger::from_records(vec![trade("Bitmex", "2020-01-05")]).unwrap();
        let params = FilterSelection::new("Bitmex", "1")
            .with_range(Some(ts("2019-01-01")), None)
            .resolve(&ledger)
            .unwrap();
        assert_eq!(params.start(), ts("2019-01-01"));
        assert_eq!(params.end(), ts("2020-01-05"));
    }

    #[test]
    fn unknown_exchange_falls_back_to_ledger_range() {
        let ledger = Ledger::from_records(vec![trade("Bitmex", "2020-01-05")]).unwrap();
        let params = FilterSelection::new("Kraken", "1").resolve(&ledger).unwrap();
        assert_eq!(params.start(), ts("2020-01-05"));
    }

    #[test]
    fn bad_leverage_is_rejected() {
        let ledger = Ledger::from_records(Vec::new()).unwrap();
        assert!(matches!(
            FilterSelection::new("Bitmex", "ten").resolve(&ledger),
            Err(ValidationError::NonIntegerLeverage { .. })
        ));
    }
}
