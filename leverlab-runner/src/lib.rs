//! LeverLab Runner: ledger loading, analysis sessions, sweeps and exports.
//!
//! This crate builds on `leverlab-core` to provide:
//! - CSV ledger loading into a validated `Ledger`
//! - Untyped filter selections resolved against the ledger
//! - The analysis coordinator that filters once and fans out to every stage
//! - Presentation panels (monthly candles, trade table, point series)
//! - Exchange × leverage sweeps in parallel
//! - JSON, CSV and Markdown artifacts
//! - TOML configuration

pub mod config;
pub mod export;
pub mod loader;
pub mod options;
pub mod panels;
pub mod selection;
pub mod session;
pub mod sweep;

pub use config::{AnalysisConfig, ConfigError};
pub use export::{
    export_json, export_monthly_csv, export_sweep_csv, export_trades_csv, import_json,
    render_markdown, save_artifacts,
};
pub use loader::{load_ledger, load_ledger_from_reader, LoadError};
pub use options::{ExchangeOption, FilterOptions, DEFAULT_EXCHANGE, DEFAULT_LEVERAGE};
pub use panels::{MonthlyCandle, Panels, PnlByDate, SeriesPoint, TradeRow};
pub use selection::{parse_timestamp, FilterSelection};
pub use session::{analyze, analyze_params, AnalysisReport, Indicators, RunError, SCHEMA_VERSION};
pub use sweep::{run_sweep, SweepResults, SweepRow};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn analysis_report_is_send_sync() {
        assert_send::<AnalysisReport>();
        assert_sync::<AnalysisReport>();
    }

    #[test]
    fn sweep_results_are_send_sync() {
        assert_send::<SweepResults>();
        assert_sync::<SweepResults>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<AnalysisConfig>();
        assert_sync::<AnalysisConfig>();
        assert_send::<FilterSelection>();
        assert_sync::<FilterSelection>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<LoadError>();
        assert_sync::<LoadError>();
    }
}
