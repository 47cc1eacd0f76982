//! Presentation-ready series derived from one filtered subset.
//!
//! Every chart, table and indicator of the dashboard view is built here from
//! the same `FilteredTrades`, so nothing downstream has to filter again.
//! Point series keep ledger order (most recent first); the monthly candles
//! are reversed into chronological order because they are read left to right.

use chrono::NaiveDateTime;
use leverlab_core::{FilteredTrades, MonthlyBucket, TradeRecord, TradeType, YearMonth};
use serde::{Deserialize, Serialize};

/// One month drawn as a candle: opens at the month's entry balance and
/// closes at its exit balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCandle {
    pub year_month: YearMonth,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub return_pct: f64,
}

impl From<&MonthlyBucket> for MonthlyCandle {
    fn from(bucket: &MonthlyBucket) -> Self {
        Self {
            year_month: bucket.year_month,
            open: bucket.entry_balance,
            high: bucket.exit_balance,
            low: bucket.entry_balance,
            close: bucket.exit_balance,
            return_pct: bucket.return_pct,
        }
    }
}

/// A row of the raw trade table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRow {
    pub sequence_number: i64,
    pub trade_type: TradeType,
    pub exposure: f64,
    pub entry_balance: f64,
    pub exit_balance: f64,
    pub pnl_incl_fees: f64,
}

impl From<&TradeRecord> for TradeRow {
    fn from(r: &TradeRecord) -> Self {
        Self {
            sequence_number: r.sequence_number,
            trade_type: r.trade_type,
            exposure: r.exposure(),
            entry_balance: r.entry_balance,
            exit_balance: r.exit_balance,
            pnl_incl_fees: r.pnl_incl_fees,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: NaiveDateTime,
    pub value: f64,
}

/// Realized PnL per trade, split by direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PnlByDate {
    pub long: Vec<SeriesPoint>,
    pub short: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Panels {
    pub monthly_candles: Vec<MonthlyCandle>,
    pub trade_table: Vec<TradeRow>,
    pub pnl_by_date: PnlByDate,
    pub btc_price: Vec<SeriesPoint>,
    /// Entry balance over time.
    pub balance: Vec<SeriesPoint>,
}

fn series(trades: &FilteredTrades<'_>, value: impl Fn(&TradeRecord) -> f64) -> Vec<SeriesPoint> {
    trades
        .iter()
        .map(|r| SeriesPoint {
            time: r.entry_time,
            value: value(r),
        })
        .collect()
}

impl Panels {
    /// `monthly` must be the aggregation of `trades`, in ledger order.
    pub fn build(trades: &FilteredTrades<'_>, monthly: &[MonthlyBucket]) -> Self {
        Self {
            monthly_candles: monthly.iter().rev().map(MonthlyCandle::from).collect(),
            trade_table: trades.iter().map(TradeRow::from).collect(),
            pnl_by_date: PnlByDate {
                long: series(&trades.of_type(TradeType::Long), |r| r.pnl_incl_fees),
                short: series(&trades.of_type(TradeType::Short), |r| r.pnl_incl_fees),
            },
            btc_price: series(trades, |r| r.btc_price),
            balance: series(trades, |r| r.entry_balance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use leverlab_core::{aggregate_by_month, Ledger};

    fn trade(seq: i64, month: u32, kind: TradeType, entry: f64, exit: f64) -> TradeRecord {
        TradeRecord {
            sequence_number: seq,
            exchange: "Bitmex".into(),
            leverage: 3,
            trade_type: kind,
            entry_time: NaiveDate::from_ymd_opt(2020, month, 10)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            entry_balance: entry,
            exit_balance: exit,
            pnl_incl_fees: exit - entry,
            btc_price: 1_000.0 * month as f64,
        }
    }

    fn ledger() -> Ledger {
        Ledger::from_records(vec![
            trade(1, 1, TradeType::Long, 100.0, 110.0),
            trade(2, 2, TradeType::Short, 110.0, 104.0),
            trade(3, 3, TradeType::Long, 104.0, 120.0),
        ])
        .unwrap()
    }

    #[test]
    fn candles_are_chronological() {
        let ledger = ledger();
        let trades = FilteredTrades::all(&ledger);
        let monthly = aggregate_by_month(&trades).unwrap();
        let panels = Panels::build(&trades, &monthly);
        let months: Vec<u32> = panels
            .monthly_candles
            .iter()
            .map(|c| c.year_month.month)
            .collect();
        assert_eq!(months, vec![1, 2, 3]);
        let jan = &panels.monthly_candles[0];
        assert_eq!((jan.open, jan.close), (100.0, 110.0));
        assert_eq!((jan.low, jan.high), (100.0, 110.0));
    }

    #[test]
    fn table_rows_carry_exposure() {
        let ledger = ledger();
        let trades = FilteredTrades::all(&ledger);
        let panels = Panels::build(&trades, &[]);
        assert_eq!(panels.trade_table.len(), 3);
        assert_eq!(panels.trade_table[0].sequence_number, 3);
        assert!((panels.trade_table[0].exposure - 312.0).abs() < 1e-9);
    }

    #[test]
    fn pnl_split_by_direction() {
        let ledger = ledger();
        let trades = FilteredTrades::all(&ledger);
        let panels = Panels::build(&trades, &[]);
        assert_eq!(panels.pnl_by_date.long.len(), 2);
        assert_eq!(panels.pnl_by_date.short.len(), 1);
        assert!((panels.pnl_by_date.short[0].value + 6.0).abs() < 1e-9);
    }

    #[test]
    fn price_and_balance_series_follow_ledger_order() {
        let ledger = ledger();
        let trades = FilteredTrades::all(&ledger);
        let panels = Panels::build(&trades, &[]);
        let prices: Vec<f64> = panels.btc_price.iter().map(|p| p.value).collect();
        assert_eq!(prices, vec![3_000.0, 2_000.0, 1_000.0]);
        assert_eq!(panels.balance[0].value, 104.0);
    }

    #[test]
    fn empty_subset_gives_empty_panels() {
        let panels = Panels::build(&FilteredTrades::empty(), &[]);
        assert_eq!(panels, Panels::default());
    }
}
