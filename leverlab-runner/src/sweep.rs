//! Exchange × leverage sweep.
//!
//! Evaluates every exchange/leverage pair in the ledger over the exchange's
//! full trading range. Pairs are independent, so they run in parallel with
//! all workers reading the same `&Ledger`.

use leverlab_core::{
    aggregate_by_month, filter, range_returns, AnalysisError, ErrorKind, FilterParams, Ledger,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::session::Indicators;

/// Result for one exchange/leverage pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub exchange: String,
    pub leverage: u32,
    pub trade_count: usize,
    pub month_count: usize,
    /// Failure kind when a stage could not produce a value (e.g. a zero balance).
    pub outcome: Result<Indicators, ErrorKind>,
}

impl SweepRow {
    pub fn delta(&self) -> Option<f64> {
        self.outcome.as_ref().ok().map(|i| i.strategy_vs_market_pct)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepResults {
    /// Best strategy-vs-market delta first; failed rows last.
    pub rows: Vec<SweepRow>,
}

impl SweepResults {
    fn new(mut rows: Vec<SweepRow>) -> Self {
        rows.sort_by(|a, b| match (a.delta(), b.delta()) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => (a.exchange.as_str(), a.leverage).cmp(&(b.exchange.as_str(), b.leverage)),
        });
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn best(&self) -> Option<&SweepRow> {
        self.rows.first().filter(|r| r.outcome.is_ok())
    }

    pub fn top(&self, n: usize) -> &[SweepRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}

/// Every (exchange, leverage) pair that has at least one trade, with the
/// exchange's full time range.
fn combinations(ledger: &Ledger) -> Vec<FilterParams> {
    let mut out = Vec::new();
    for exchange in ledger.exchanges() {
        let Some((start, end)) = ledger.time_bounds(exchange) else {
            continue;
        };
        for leverage in ledger.leverages() {
            let traded = ledger
                .iter()
                .any(|r| r.exchange == exchange && r.leverage == leverage);
            if !traded {
                continue;
            }
            // Exchange is non-empty and bounds come from real trades, so this validates.
            if let Ok(params) = FilterParams::new(exchange, leverage, start, end) {
                out.push(params);
            }
        }
    }
    out
}

fn evaluate(ledger: &Ledger, params: &FilterParams) -> SweepRow {
    let trades = filter(ledger, params);
    let monthly = aggregate_by_month(&trades);
    let month_count = monthly.as_ref().map_or(0, |m| m.len());
    let outcome = monthly
        .and_then(|_| range_returns(&trades))
        .map(Indicators::from)
        .map_err(|e: AnalysisError| {
            warn!(
                exchange = params.exchange(),
                leverage = params.leverage(),
                error = %e,
                "sweep pair failed"
            );
            e.kind()
        });

    SweepRow {
        exchange: params.exchange().to_string(),
        leverage: params.leverage(),
        trade_count: trades.len(),
        month_count,
        outcome,
    }
}

/// Run the sweep, in parallel unless `parallel` is false.
pub fn run_sweep(ledger: &Ledger, parallel: bool) -> SweepResults {
    let combos = combinations(ledger);
    info!(pairs = combos.len(), parallel, "starting sweep");

    let rows: Vec<SweepRow> = if parallel {
        combos.par_iter().map(|p| evaluate(ledger, p)).collect()
    } else {
        combos.iter().map(|p| evaluate(ledger, p)).collect()
    };

    SweepResults::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::parse_timestamp;
    use leverlab_core::{TradeRecord, TradeType};

    fn trade(exchange: &str, leverage: u32, when: &str, entry: f64, exit: f64) -> TradeRecord {
        TradeRecord {
            sequence_number: 1,
            exchange: exchange.into(),
            leverage,
            trade_type: TradeType::Long,
            entry_time: parse_timestamp(when).unwrap(),
            entry_balance: entry,
            exit_balance: exit,
            pnl_incl_fees: exit - entry,
            btc_price: 10_000.0,
        }
    }

    fn ledger() -> Ledger {
        Ledger::from_records(vec![
            trade("Bitmex", 1, "2020-02-01", 120.0, 125.0),
            trade("Bitmex", 1, "2020-01-01", 100.0, 100.0),
            trade("Bitmex", 5, "2020-02-01", 90.0, 95.0),
            trade("Bitmex", 5, "2020-01-01", 100.0, 100.0),
            trade("Deribit", 1, "2020-03-01", 50.0, 40.0),
            trade("Deribit", 1, "2020-01-15", 10.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn only_traded_pairs_are_swept() {
        let results = run_sweep(&ledger(), false);
        let mut pairs: Vec<(String, u32)> = results
            .rows
            .iter()
            .map(|r| (r.exchange.clone(), r.leverage))
            .collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("Bitmex".to_string(), 1),
                ("Bitmex".to_string(), 5),
                ("Deribit".to_string(), 1)
            ]
        );
    }

    #[test]
    fn rows_are_ranked_by_delta_with_failures_last() {
        let results = run_sweep(&ledger(), false);
        let best = results.best().unwrap();
        assert_eq!((best.exchange.as_str(), best.leverage), ("Bitmex", 1));
        assert!((best.delta().unwrap() - 20.0).abs() < 1e-9);

        let last = results.rows.last().unwrap();
        assert_eq!(last.exchange, "Deribit");
        assert_eq!(last.outcome, Err(ErrorKind::DivisionByZero));
    }

    #[test]
    fn parallel_matches_sequential() {
        let ledger = ledger();
        assert_eq!(run_sweep(&ledger, true), run_sweep(&ledger, false));
    }

    #[test]
    fn top_is_clamped() {
        let results = run_sweep(&ledger(), true);
        assert_eq!(results.top(2).len(), 2);
        assert_eq!(results.top(50).len(), results.len());
    }

    #[test]
    fn empty_ledger_sweeps_nothing() {
        let results = run_sweep(&Ledger::from_records(Vec::new()).unwrap(), true);
        assert!(results.is_empty());
        assert!(results.best().is_none());
    }
}
