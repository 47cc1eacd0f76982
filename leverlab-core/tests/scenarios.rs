//! Worked scenarios for the filter → aggregate → returns pipeline.

use chrono::{NaiveDate, NaiveDateTime};
use leverlab_core::{
    aggregate_by_month, filter, range_returns, AnalysisError, ErrorKind, FilterParams,
    FilteredTrades, Ledger, ReturnLeg, TradeRecord, TradeType, ValidationError, YearMonth,
};

fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn record(seq: i64, when: NaiveDateTime, entry: f64, exit: f64, btc: f64) -> TradeRecord {
    TradeRecord {
        sequence_number: seq,
        exchange: "Bitmex".into(),
        leverage: 1,
        trade_type: TradeType::Long,
        entry_time: when,
        entry_balance: entry,
        exit_balance: exit,
        pnl_incl_fees: exit - entry,
        btc_price: btc,
    }
}

fn full_range() -> FilterParams {
    FilterParams::new("Bitmex", 1, at(2000, 1, 1), at(2100, 1, 1)).unwrap()
}

#[test]
fn two_month_window_returns() {
    let ledger = Ledger::from_ordered(vec![
        record(2, at(2020, 2, 15), 100.0, 110.0, 10_000.0),
        record(1, at(2020, 1, 10), 90.0, 100.0, 8_000.0),
    ])
    .unwrap();
    let subset = filter(&ledger, &full_range());
    let returns = range_returns(&subset).unwrap();

    assert!((returns.benchmark_return_pct - 25.0).abs() < 1e-9);
    assert!(returns.strategy_return_pct.abs() < 1e-9);
    assert!((returns.strategy_vs_market() + 25.0).abs() < 1e-9);
}

#[test]
fn single_flat_record_is_zero_everywhere() {
    let ledger =
        Ledger::from_ordered(vec![record(1, at(2020, 5, 5), 500.0, 500.0, 9_000.0)]).unwrap();
    let subset = filter(&ledger, &full_range());

    let buckets = aggregate_by_month(&subset).unwrap();
    assert_eq!(buckets.len(), 1);
    assert!(buckets[0].return_pct.abs() < 1e-12);

    let returns = range_returns(&subset).unwrap();
    assert!(returns.benchmark_return_pct.abs() < 1e-12);
    assert!(returns.strategy_return_pct.abs() < 1e-12);
}

#[test]
fn absent_exchange_gives_empty_subset_and_no_buckets() {
    let ledger = Ledger::from_ordered(vec![
        record(2, at(2020, 2, 15), 100.0, 110.0, 10_000.0),
        record(1, at(2020, 1, 10), 90.0, 100.0, 8_000.0),
    ])
    .unwrap();
    let params = FilterParams::new("Kraken", 1, at(2000, 1, 1), at(2100, 1, 1)).unwrap();
    let subset = filter(&ledger, &params);

    assert!(subset.is_empty());
    assert!(aggregate_by_month(&subset).unwrap().is_empty());
    assert_eq!(
        range_returns(&subset).unwrap_err().kind(),
        ErrorKind::EmptyRange
    );
}

#[test]
fn same_month_bucket_uses_recent_exit_and_older_entry() {
    let ledger = Ledger::from_ordered(vec![
        record(2, at(2020, 3, 20), 120.0, 126.0, 6_000.0),
        record(1, at(2020, 3, 2), 100.0, 120.0, 5_000.0),
    ])
    .unwrap();
    let subset = filter(&ledger, &full_range());
    let buckets = aggregate_by_month(&subset).unwrap();

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].year_month, YearMonth::new(2020, 3));
    assert_eq!(buckets[0].exit_balance, 126.0);
    assert_eq!(buckets[0].entry_balance, 100.0);
    assert!((buckets[0].return_pct - 26.0).abs() < 1e-9);
}

#[test]
fn unordered_source_is_sorted_once_at_construction() {
    let ledger = Ledger::from_records(vec![
        record(1, at(2020, 1, 10), 90.0, 100.0, 8_000.0),
        record(2, at(2020, 2, 15), 100.0, 110.0, 10_000.0),
    ])
    .unwrap();
    let returns = range_returns(&FilteredTrades::all(&ledger)).unwrap();
    // Same numbers as the already-descending scenario: sorting fixed the sign.
    assert!((returns.benchmark_return_pct - 25.0).abs() < 1e-9);
}

#[test]
fn non_integer_leverage_is_validation_error() {
    let err = FilterParams::parse("Bitmex", "x5", at(2020, 1, 1), at(2020, 2, 1)).unwrap_err();
    assert_eq!(
        err,
        ValidationError::NonIntegerLeverage {
            input: "x5".into()
        }
    );
    assert_eq!(AnalysisError::from(err).kind(), ErrorKind::Validation);
}

#[test]
fn zero_balance_month_surfaces_division_by_zero() {
    let ledger = Ledger::from_ordered(vec![
        record(2, at(2020, 4, 20), 10.0, 12.0, 7_000.0),
        record(1, at(2020, 4, 1), 0.0, 10.0, 6_800.0),
    ])
    .unwrap();
    let subset = filter(&ledger, &full_range());
    assert_eq!(
        aggregate_by_month(&subset),
        Err(AnalysisError::DivisionByZero(ReturnLeg::Monthly(
            YearMonth::new(2020, 4)
        )))
    );
}
