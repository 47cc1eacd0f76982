//! LeverLab CLI: leveraged-trade ledger analysis.
//!
//! Commands:
//! - `summary`: filter the ledger and print the indicators and monthly table
//! - `export`: same as `summary`, then write the artifact bundle to disk
//! - `options`: list the exchanges, leverage tiers and date ranges available
//! - `sweep`: rank every exchange/leverage pair by strategy-vs-market return
//!
//! Filter flags override values from `--config`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use leverlab_core::{FilterMode, Ledger};
use leverlab_runner::{
    analyze, export_sweep_csv, load_ledger, parse_timestamp, run_sweep, save_artifacts,
    AnalysisConfig, AnalysisReport, FilterOptions, FilterSelection, SweepResults,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "leverlab",
    about = "LeverLab CLI: monthly and range returns for a leveraged trade ledger"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ledger CSV. Overrides `[ledger] path` from the config.
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct FilterArgs {
    /// Exchange name (e.g. Bitmex).
    #[arg(long)]
    exchange: Option<String>,

    /// Leverage tier, a positive integer.
    #[arg(long)]
    leverage: Option<String>,

    /// Range start (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS). Defaults to the exchange's first trade.
    #[arg(long)]
    start: Option<String>,

    /// Range end. Defaults to the exchange's last trade.
    #[arg(long)]
    end: Option<String>,

    /// Fail on an exchange the ledger has never seen instead of returning an empty result.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print indicators and monthly performance for one selection.
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Analyze one selection and save JSON, CSV and Markdown artifacts.
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output directory. Overrides `[output] dir` from the config.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// List the filter options the ledger offers.
    Options,
    /// Rank every exchange/leverage pair.
    Sweep {
        /// Rows to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Evaluate pairs one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Also write the full ranking as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    let ledger = open_ledger(cli.ledger.as_ref(), &config)?;
    info!(trades = ledger.len(), "ledger ready");

    match cli.command {
        Commands::Summary { filter } => {
            let report = run_analysis(&ledger, &config, &filter)?;
            print_summary(&report);
            Ok(())
        }
        Commands::Export { filter, output_dir } => {
            let report = run_analysis(&ledger, &config, &filter)?;
            print_summary(&report);
            let dir = output_dir.unwrap_or_else(|| config.output.dir.clone());
            let run_dir = save_artifacts(&report, &dir)?;
            info!(dir = %run_dir.display(), "export finished");
            println!("Artifacts saved to: {}", run_dir.display());
            Ok(())
        }
        Commands::Options => {
            print_options(&FilterOptions::from_ledger(&ledger));
            Ok(())
        }
        Commands::Sweep {
            top,
            sequential,
            csv,
        } => {
            let results = run_sweep(&ledger, !sequential);
            info!(
                pairs = results.len(),
                best = ?results.best().map(|r| (r.exchange.as_str(), r.leverage)),
                "sweep finished"
            );
            print_sweep(&results, top);
            if let Some(path) = csv {
                std::fs::write(&path, export_sweep_csv(&results)?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Sweep saved to: {}", path.display());
            }
            Ok(())
        }
    }
}

fn open_ledger(flag: Option<&PathBuf>, config: &AnalysisConfig) -> Result<Ledger> {
    let Some(path) = flag.or(config.ledger.path.as_ref()) else {
        bail!("no ledger given: pass --ledger or set [ledger] path in the config");
    };
    Ok(load_ledger(path)?)
}

fn run_analysis(
    ledger: &Ledger,
    config: &AnalysisConfig,
    args: &FilterArgs,
) -> Result<AnalysisReport> {
    let base = config.selection()?;
    let parse = |flag: &str, value: &Option<String>| -> Result<_> {
        value
            .as_deref()
            .map(|v| parse_timestamp(v).with_context(|| format!("--{flag}: cannot parse '{v}'")))
            .transpose()
    };
    let selection = FilterSelection::new(
        args.exchange.clone().unwrap_or(base.exchange),
        args.leverage.clone().unwrap_or(base.leverage),
    )
    .with_range(
        parse("start", &args.start)?.or(base.start),
        parse("end", &args.end)?.or(base.end),
    );
    let mode = if args.strict {
        FilterMode::Strict
    } else {
        config.mode()
    };
    info!(
        exchange = %selection.exchange,
        leverage = %selection.leverage,
        ?mode,
        "running analysis"
    );

    Ok(analyze(ledger, &selection, mode)?)
}

fn print_summary(report: &AnalysisReport) {
    let p = &report.params;
    println!();
    println!("=== {} x{} ===", p.exchange(), p.leverage());
    println!("Period:            {} to {}", p.start(), p.end());
    println!("Trades:            {}", report.trade_count);
    println!("Dataset:           {}", report.dataset_hash.short());
    println!();

    let Some(ind) = &report.indicators else {
        println!("No trades match this selection.");
        return;
    };
    println!("Strategy Returns:  {:.2}%", ind.strategy_return_pct);
    println!("Market Returns:    {:.2}%", ind.benchmark_return_pct);
    println!("Strategy vs. Mkt:  {:.2}%", ind.strategy_vs_market_pct);
    println!();

    println!(
        "{:<8} {:>12} {:>12} {:>9} {:>7}",
        "Month", "Entry", "Exit", "Return", "Trades"
    );
    println!("{}", "-".repeat(52));
    for b in report.monthly.iter().rev() {
        println!(
            "{:<8} {:>12.2} {:>12.2} {:>8.2}% {:>7}",
            b.year_month.to_string(),
            b.entry_balance,
            b.exit_balance,
            b.return_pct,
            b.trade_count
        );
    }
}

fn print_options(options: &FilterOptions) {
    if options.exchanges.is_empty() {
        println!("Ledger is empty.");
        return;
    }
    println!(
        "{:<12} {:>7} {:<20} {:<20} Leverage",
        "Exchange", "Trades", "First trade", "Last trade"
    );
    println!("{}", "-".repeat(72));
    for e in &options.exchanges {
        let tiers: Vec<String> = e.leverages.iter().map(|l| format!("x{l}")).collect();
        println!(
            "{:<12} {:>7} {:<20} {:<20} {}",
            e.name,
            e.trade_count,
            e.first_trade.to_string(),
            e.last_trade.to_string(),
            tiers.join(" ")
        );
    }
    println!();
    if let (Some(exchange), Some(leverage)) = (&options.default_exchange, options.default_leverage)
    {
        println!("Default selection: {exchange} x{leverage}");
    }
}

fn print_sweep(results: &SweepResults, top: usize) {
    if results.is_empty() {
        println!("Ledger is empty.");
        return;
    }
    println!(
        "{:<4} {:<12} {:>5} {:>7} {:>10} {:>10} {:>10}",
        "#", "Exchange", "Lev", "Trades", "Strategy", "Market", "Delta"
    );
    println!("{}", "-".repeat(64));
    for (i, row) in results.top(top).iter().enumerate() {
        match &row.outcome {
            Ok(ind) => println!(
                "{:<4} {:<12} {:>5} {:>7} {:>9.2}% {:>9.2}% {:>9.2}%",
                i + 1,
                row.exchange,
                format!("x{}", row.leverage),
                row.trade_count,
                ind.strategy_return_pct,
                ind.benchmark_return_pct,
                ind.strategy_vs_market_pct
            ),
            Err(kind) => println!(
                "{:<4} {:<12} {:>5} {:>7} failed: {kind:?}",
                i + 1,
                row.exchange,
                format!("x{}", row.leverage),
                row.trade_count
            ),
        }
    }
    if results.len() > top {
        println!("... {} more", results.len() - top);
    }
}
