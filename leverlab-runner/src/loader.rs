//! Ledger loading from the flat-file trade log.
//!
//! The log is a CSV with one closed trade per row and human-readable column
//! headers (`Entry time`, `Pnl (incl fees)`, ...). Unknown columns are
//! ignored. Rows may arrive in any order; the ledger is sorted descending by
//! entry time once, here.

use std::io::Read;
use std::path::{Path, PathBuf};

use leverlab_core::{Ledger, TradeRecord, TradeType, ValidationError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::selection::parse_timestamp;

/// Errors from the ledger loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open ledger '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed ledger row: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unparseable entry time '{value}'")]
    Timestamp { row: usize, value: String },

    #[error("invalid ledger: {0}")]
    Invalid(#[from] ValidationError),
}

/// One CSV row, before timestamp parsing.
#[derive(Debug, Deserialize)]
struct LedgerRow {
    #[serde(rename = "Number")]
    number: i64,
    #[serde(rename = "Trade type")]
    trade_type: TradeType,
    #[serde(rename = "Exchange")]
    exchange: String,
    #[serde(rename = "Margin")]
    margin: u32,
    #[serde(rename = "Entry time")]
    entry_time: String,
    #[serde(rename = "Entry balance")]
    entry_balance: f64,
    #[serde(rename = "Exit balance")]
    exit_balance: f64,
    #[serde(rename = "Pnl (incl fees)")]
    pnl_incl_fees: f64,
    #[serde(rename = "BTC Price")]
    btc_price: f64,
}

impl LedgerRow {
    fn into_record(self, row: usize) -> Result<TradeRecord, LoadError> {
        let entry_time = parse_timestamp(&self.entry_time).ok_or_else(|| LoadError::Timestamp {
            row,
            value: self.entry_time.clone(),
        })?;
        Ok(TradeRecord {
            sequence_number: self.number,
            exchange: self.exchange,
            leverage: self.margin,
            trade_type: self.trade_type,
            entry_time,
            entry_balance: self.entry_balance,
            exit_balance: self.exit_balance,
            pnl_incl_fees: self.pnl_incl_fees,
            btc_price: self.btc_price,
        })
    }
}

/// Load a ledger from any reader producing the CSV trade log.
pub fn load_ledger_from_reader<R: Read>(reader: R) -> Result<Ledger, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, row) in rdr.deserialize::<LedgerRow>().enumerate() {
        // Row 1 is the header.
        records.push(row?.into_record(i + 2)?);
    }
    debug!(rows = records.len(), "parsed ledger rows");

    Ok(Ledger::from_records(records)?)
}

/// Load a ledger from a CSV file on disk.
pub fn load_ledger(path: &Path) -> Result<Ledger, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ledger = load_ledger_from_reader(file)?;
    info!(
        path = %path.display(),
        trades = ledger.len(),
        exchanges = ledger.exchanges().len(),
        hash = %ledger.fingerprint().short(),
        "ledger loaded"
    );
    Ok(ledger)
}
