//! Ledger: the immutable, descending-by-time collection of trade records.
//!
//! Every aggregation downstream reads the head of a slice as "most recent"
//! and the tail as "oldest". Reversing the order silently flips the sign of
//! every return, so the order is fixed here, once, and checked again at each
//! stage entry point (see [`crate::filter::FilteredTrades`]).

use chrono::NaiveDateTime;
use serde::Serialize;

use super::ids::DatasetHash;
use super::trade::TradeRecord;
use crate::error::ValidationError;

/// Index of the first record whose entry time is later than its
/// predecessor's, or `None` if the sequence is descending (ties allowed).
pub(crate) fn first_out_of_order<I>(times: I) -> Option<usize>
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    let mut prev: Option<NaiveDateTime> = None;
    for (i, t) in times.into_iter().enumerate() {
        if let Some(p) = prev {
            if t > p {
                return Some(i);
            }
        }
        prev = Some(t);
    }
    None
}

/// The full trade log, most recent trade first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ledger {
    records: Vec<TradeRecord>,
}

impl Ledger {
    /// Build a ledger from records in any order.
    ///
    /// Records are stable-sorted descending by `entry_time`, so trades with
    /// identical timestamps keep their source order.
    pub fn from_records(mut records: Vec<TradeRecord>) -> Result<Self, ValidationError> {
        for record in &records {
            record.validate()?;
        }
        records.sort_by(|a, b| b.entry_time.cmp(&a.entry_time));
        Ok(Self { records })
    }

    /// Build a ledger from records the source claims are already descending.
    ///
    /// Rejects the input instead of re-sorting when the claim is false.
    pub fn from_ordered(records: Vec<TradeRecord>) -> Result<Self, ValidationError> {
        for record in &records {
            record.validate()?;
        }
        if let Some(index) = first_out_of_order(records.iter().map(|r| r.entry_time)) {
            return Err(ValidationError::UnorderedLedger { index });
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TradeRecord> {
        self.records.iter()
    }

    /// Distinct exchanges in order of first appearance.
    pub fn exchanges(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.exchange.as_str()) {
                seen.push(&record.exchange);
            }
        }
        seen
    }

    /// Distinct leverage tiers in order of first appearance.
    pub fn leverages(&self) -> Vec<u32> {
        let mut seen = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.leverage) {
                seen.push(record.leverage);
            }
        }
        seen
    }

    pub fn contains_exchange(&self, exchange: &str) -> bool {
        self.records.iter().any(|r| r.exchange == exchange)
    }

    /// Earliest and latest entry time for an exchange, `None` if it has no trades.
    pub fn time_bounds(&self, exchange: &str) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut matching = self.records.iter().filter(|r| r.exchange == exchange);
        let latest = matching.next()?.entry_time;
        let earliest = matching.last().map_or(latest, |r| r.entry_time);
        Some((earliest, latest))
    }

    /// Earliest and latest entry time across the whole ledger.
    pub fn overall_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let latest = self.records.first()?.entry_time;
        let earliest = self.records.last()?.entry_time;
        Some((earliest, latest))
    }

    /// BLAKE3 hash over every field of every record, in ledger order.
    pub fn fingerprint(&self) -> DatasetHash {
        let mut hasher = blake3::Hasher::new();
        for r in &self.records {
            hasher.update(&r.sequence_number.to_le_bytes());
            hasher.update(r.exchange.as_bytes());
            hasher.update(&r.leverage.to_le_bytes());
            hasher.update(r.trade_type.to_string().as_bytes());
            hasher.update(r.entry_time.to_string().as_bytes());
            hasher.update(&r.entry_balance.to_le_bytes());
            hasher.update(&r.exit_balance.to_le_bytes());
            hasher.update(&r.pnl_incl_fees.to_le_bytes());
            hasher.update(&r.btc_price.to_le_bytes());
        }
        DatasetHash(hasher.finalize().to_hex().to_string())
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a TradeRecord;
    type IntoIter = std::slice::Iter<'a, TradeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
