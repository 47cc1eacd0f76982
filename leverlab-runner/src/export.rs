//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for analysis reports:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: monthly buckets, the filtered trade table, and sweep rows
//! - **Markdown**: a human-readable summary of one selection
//!
//! Persisted reports carry a `schema_version` field. Newer versions are
//! rejected on load.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::session::{AnalysisReport, SCHEMA_VERSION};
use crate::sweep::SweepResults;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisReport` to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize an `AnalysisReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Monthly buckets in chronological order.
///
/// Columns: month, entry_balance, exit_balance, return_pct, trades, pnl_incl_fees
pub fn export_monthly_csv(report: &AnalysisReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "month",
        "entry_balance",
        "exit_balance",
        "return_pct",
        "trades",
        "pnl_incl_fees",
    ])?;
    for b in report.monthly.iter().rev() {
        wtr.write_record([
            &b.year_month.to_string(),
            &format!("{:.2}", b.entry_balance),
            &format!("{:.2}", b.exit_balance),
            &format!("{:.4}", b.return_pct),
            &b.trade_count.to_string(),
            &format!("{:.2}", b.pnl_incl_fees),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// The filtered trade table, most recent first.
///
/// Columns: number, trade_type, exposure, entry_balance, exit_balance, pnl_incl_fees
pub fn export_trades_csv(report: &AnalysisReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "number",
        "trade_type",
        "exposure",
        "entry_balance",
        "exit_balance",
        "pnl_incl_fees",
    ])?;
    for row in &report.panels.trade_table {
        wtr.write_record([
            &row.sequence_number.to_string(),
            &row.trade_type.to_string(),
            &format!("{:.2}", row.exposure),
            &format!("{:.2}", row.entry_balance),
            &format!("{:.2}", row.exit_balance),
            &format!("{:.2}", row.pnl_incl_fees),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Sweep rows in rank order. Failed rows leave the return columns empty and
/// name the failure in `error`.
pub fn export_sweep_csv(results: &SweepResults) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "exchange",
        "leverage",
        "trades",
        "months",
        "strategy_return_pct",
        "benchmark_return_pct",
        "delta_pct",
        "error",
    ])?;
    for row in &results.rows {
        let (strategy, benchmark, delta, error) = match &row.outcome {
            Ok(i) => (
                format!("{:.4}", i.strategy_return_pct),
                format!("{:.4}", i.benchmark_return_pct),
                format!("{:.4}", i.strategy_vs_market_pct),
                String::new(),
            ),
            Err(kind) => (String::new(), String::new(), String::new(), format!("{kind:?}")),
        };
        wtr.write_record([
            &row.exchange,
            &row.leverage.to_string(),
            &row.trade_count.to_string(),
            &row.month_count.to_string(),
            &strategy,
            &benchmark,
            &delta,
            &error,
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown ───────────────────────────────────────────────────────

/// Render a single report as Markdown.
pub fn render_markdown(report: &AnalysisReport) -> String {
    let mut md = String::new();
    let p = &report.params;

    let _ = writeln!(md, "# {} x{}", p.exchange(), p.leverage());
    let _ = writeln!(md);
    let _ = writeln!(md, "- Period: {} to {}", p.start(), p.end());
    let _ = writeln!(md, "- Trades: {}", report.trade_count);
    let _ = writeln!(md, "- Dataset: `{}`", report.dataset_hash.short());
    let _ = writeln!(md);

    match &report.indicators {
        Some(ind) => {
            let _ = writeln!(md, "| Indicator | Value |");
            let _ = writeln!(md, "|---|---|");
            let _ = writeln!(md, "| Strategy Returns | {:.2}% |", ind.strategy_return_pct);
            let _ = writeln!(md, "| Market Returns | {:.2}% |", ind.benchmark_return_pct);
            let _ = writeln!(
                md,
                "| Strategy vs. Market Returns | {:.2}% |",
                ind.strategy_vs_market_pct
            );
        }
        None => {
            let _ = writeln!(md, "_No trades match this selection._");
        }
    }

    if !report.monthly.is_empty() {
        let _ = writeln!(md);
        let _ = writeln!(md, "## Monthly performance");
        let _ = writeln!(md);
        let _ = writeln!(md, "| Month | Entry | Exit | Return | Trades |");
        let _ = writeln!(md, "|---|---:|---:|---:|---:|");
        for b in report.monthly.iter().rev() {
            let _ = writeln!(
                md,
                "| {} | {:.2} | {:.2} | {:.2}% | {} |",
                b.year_month, b.entry_balance, b.exit_balance, b.return_pct, b.trade_count
            );
        }
    }

    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one report.
///
/// Creates a directory named `{exchange}_x{leverage}_{timestamp}/` under
/// `output_dir` containing:
/// - `report.json`: the full `AnalysisReport`
/// - `monthly.csv`: monthly buckets, chronological
/// - `trades.csv`: the filtered trade table
/// - `summary.md`: Markdown summary
///
/// Returns the path of the created directory.
pub fn save_artifacts(report: &AnalysisReport, output_dir: &Path) -> Result<PathBuf> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let name = format!(
        "{}_x{}_{stamp}",
        sanitize(report.params.exchange()),
        report.params.leverage()
    );
    let run_dir = output_dir.join(name);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create {}", run_dir.display()))?;

    let files = [
        ("report.json", export_json(report)?),
        ("monthly.csv", export_monthly_csv(report)?),
        ("trades.csv", export_trades_csv(report)?),
        ("summary.md", render_markdown(report)),
    ];
    for (file, contents) in files {
        let path = run_dir.join(file);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
