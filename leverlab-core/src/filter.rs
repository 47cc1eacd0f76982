//! Filter engine: exchange, leverage and date-range selection over a ledger.
//!
//! Filtering is a stable predicate selection: the output keeps the ledger's
//! descending-by-time order, so the head of a [`FilteredTrades`] is always
//! the most recent trade and the tail the oldest.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::ledger::first_out_of_order;
use crate::domain::{Ledger, TradeRecord};
use crate::error::{AnalysisError, ValidationError};

/// Parse user-supplied leverage text into a positive integer tier.
///
/// Surrounding whitespace is ignored. Anything else that is not a base-10
/// integer, including `"2.0"`, is rejected.
pub fn parse_leverage(text: &str) -> Result<u32, ValidationError> {
    let value: i64 = text
        .trim()
        .parse()
        .map_err(|_| ValidationError::NonIntegerLeverage {
            input: text.to_string(),
        })?;
    if value <= 0 {
        return Err(ValidationError::NonPositiveLeverage { value });
    }
    u32::try_from(value).map_err(|_| ValidationError::NonIntegerLeverage {
        input: text.to_string(),
    })
}

/// How to treat an exchange that never occurs in the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Unknown exchange simply matches nothing.
    #[default]
    Lenient,
    /// Unknown exchange is an `UnknownCategory` error.
    Strict,
}

/// Validated filter parameters. Both date bounds are inclusive.
///
/// Deserialization goes through [`FilterParams::new`], so a persisted report
/// cannot smuggle in parameters the constructor would reject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFilterParams")]
pub struct FilterParams {
    exchange: String,
    leverage: u32,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Deserialize)]
struct RawFilterParams {
    exchange: String,
    leverage: u32,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<RawFilterParams> for FilterParams {
    type Error = ValidationError;

    fn try_from(raw: RawFilterParams) -> Result<Self, Self::Error> {
        Self::new(raw.exchange, raw.leverage, raw.start, raw.end)
    }
}

impl FilterParams {
    pub fn new(
        exchange: impl Into<String>,
        leverage: u32,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        let exchange = exchange.into();
        if exchange.is_empty() {
            return Err(ValidationError::EmptyExchange);
        }
        if leverage == 0 {
            return Err(ValidationError::NonPositiveLeverage { value: 0 });
        }
        if start > end {
            return Err(ValidationError::InvertedDateRange { start, end });
        }
        Ok(Self {
            exchange,
            leverage,
            start,
            end,
        })
    }

    /// Build parameters from untyped leverage text, as it arrives from a
    /// form field or command line.
    pub fn parse(
        exchange: impl Into<String>,
        leverage: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        Self::new(exchange, parse_leverage(leverage)?, start, end)
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn leverage(&self) -> u32 {
        self.leverage
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// The selection predicate. Exchange comparison is case-sensitive.
    pub fn matches(&self, record: &TradeRecord) -> bool {
        record.exchange == self.exchange
            && record.leverage == self.leverage
            && record.entry_time >= self.start
            && record.entry_time <= self.end
    }
}

/// An order-checked view over ledger records, most recent first.
///
/// Only produced by filtering or by [`FilteredTrades::new`], which verifies
/// the descending order, so downstream stages can rely on head/tail meaning.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilteredTrades<'a> {
    records: Vec<&'a TradeRecord>,
}

impl<'a> FilteredTrades<'a> {
    /// Wrap arbitrary records, rejecting them if they are not descending.
    pub fn new(records: Vec<&'a TradeRecord>) -> Result<Self, ValidationError> {
        if let Some(index) = first_out_of_order(records.iter().map(|r| r.entry_time)) {
            return Err(ValidationError::UnorderedLedger { index });
        }
        Ok(Self { records })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Every record of the ledger, unfiltered.
    pub fn all(ledger: &'a Ledger) -> Self {
        Self {
            records: ledger.iter().collect(),
        }
    }

    pub fn records(&self) -> &[&'a TradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a TradeRecord> + '_ {
        self.records.iter().copied()
    }

    /// Most recent record.
    pub fn head(&self) -> Option<&'a TradeRecord> {
        self.records.first().copied()
    }

    /// Oldest record.
    pub fn tail(&self) -> Option<&'a TradeRecord> {
        self.records.last().copied()
    }

    /// Apply another selection to this subset. Order is preserved.
    pub fn refine(&self, params: &FilterParams) -> FilteredTrades<'a> {
        Self {
            records: self
                .records
                .iter()
                .copied()
                .filter(|r| params.matches(r))
                .collect(),
        }
    }

    /// Records matching a trade direction, in subset order.
    pub fn of_type(&self, trade_type: crate::domain::TradeType) -> FilteredTrades<'a> {
        Self {
            records: self
                .records
                .iter()
                .copied()
                .filter(|r| r.trade_type == trade_type)
                .collect(),
        }
    }

    pub fn to_owned_records(&self) -> Vec<TradeRecord> {
        self.records.iter().map(|r| (*r).clone()).collect()
    }
}

impl<'s, 'a> IntoIterator for &'s FilteredTrades<'a> {
    type Item = &'a TradeRecord;
    type IntoIter = std::iter::Copied<std::slice::Iter<'s, &'a TradeRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter().copied()
    }
}

/// Select the ledger records matching `params`. Never fails: no match is an
/// empty subset.
pub fn filter<'a>(ledger: &'a Ledger, params: &FilterParams) -> FilteredTrades<'a> {
    FilteredTrades {
        records: ledger.iter().filter(|r| params.matches(r)).collect(),
    }
}

/// [`filter`] with explicit handling of exchanges the ledger has never seen.
pub fn filter_with_mode<'a>(
    ledger: &'a Ledger,
    params: &FilterParams,
    mode: FilterMode,
) -> Result<FilteredTrades<'a>, AnalysisError> {
    if mode == FilterMode::Strict && !ledger.contains_exchange(params.exchange()) {
        return Err(AnalysisError::UnknownCategory {
            exchange: params.exchange().to_string(),
        });
    }
    Ok(filter(ledger, params))
}
