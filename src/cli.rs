//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::configured_cointegration::ConfiguredCointegration;
use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    annualization_factor, significance, signal_mode, thresholds, validate_config,
};
use crate::domain::error::PairtraderError;
use crate::domain::price_series::PricePair;
use crate::domain::signal::{generate_signal, SignalMode, SignalSeries};
use crate::ports::cointegration_port::CointegrationPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "pairtrader", about = "Pairs trading backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override [data] prices
        #[arg(long)]
        prices: Option<PathBuf>,
        /// Override [report] trades_output
        #[arg(long)]
        trades_output: Option<PathBuf>,
        /// Override [report] equity_output
        #[arg(long)]
        equity_output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Write the spread and z-score series
    Spread {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show instruments and data range in the price table
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Where the price data lives and which two instruments form the pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairSpec {
    pub prices: PathBuf,
    pub instrument_a: String,
    pub instrument_b: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutputs {
    pub trades: PathBuf,
    pub equity: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            prices,
            trades_output,
            equity_output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest_command(&config, prices, trades_output, equity_output)
            }
        }
        Command::Spread { config, output } => run_spread(&config, output),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config } => run_info(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, PairtraderError> {
    tracing::info!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

pub fn build_pair_spec(config: &dyn ConfigPort) -> Result<PairSpec, PairtraderError> {
    let required = |key: &str| {
        config
            .get_string("data", key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PairtraderError::ConfigMissing {
                section: "data".into(),
                key: key.into(),
            })
    };

    Ok(PairSpec {
        prices: PathBuf::from(required("prices")?),
        instrument_a: required("instrument_a")?.to_uppercase(),
        instrument_b: required("instrument_b")?.to_uppercase(),
        start_date: config.get_date("data", "start_date")?,
        end_date: config.get_date("data", "end_date")?,
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, PairtraderError> {
    let bt_config = BacktestConfig {
        thresholds: thresholds(config)?,
        signal_mode: signal_mode(config)?,
        annualization_factor: annualization_factor(config)?,
        force_close_at_end: config.get_bool("backtest", "force_close_at_end", false),
    };
    bt_config.validate()?;
    Ok(bt_config)
}

pub fn build_report_outputs(
    config: &dyn ConfigPort,
    trades_override: Option<PathBuf>,
    equity_override: Option<PathBuf>,
) -> ReportOutputs {
    let from_config = |key: &str| {
        config
            .get_string("report", key)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    };
    ReportOutputs {
        trades: trades_override
            .or_else(|| from_config("trades_output"))
            .unwrap_or_else(|| PathBuf::from("trades.csv")),
        equity: equity_override.or_else(|| from_config("equity_output")),
    }
}

/// Fetch both legs, run the advisory cointegration check, and align them.
pub fn load_pair(
    data_port: &dyn PriceDataPort,
    cointegration: &dyn CointegrationPort,
    spec: &PairSpec,
    significance: f64,
) -> Result<PricePair, PairtraderError> {
    let a = data_port.fetch_prices(&spec.instrument_a, spec.start_date, spec.end_date)?;
    let b = data_port.fetch_prices(&spec.instrument_b, spec.start_date, spec.end_date)?;
    tracing::info!(
        "Loaded {} ({} points) and {} ({} points)",
        a.instrument(),
        a.len(),
        b.instrument(),
        b.len()
    );

    match cointegration.test(&a, &b)? {
        Some(result) if result.is_cointegrated(significance) => {
            tracing::info!(
                statistic = result.test_statistic,
                p_value = result.p_value,
                "pair is likely cointegrated"
            );
        }
        Some(result) => {
            tracing::warn!(
                statistic = result.test_statistic,
                p_value = result.p_value,
                "no cointegration detected (p >= {significance}); continuing"
            );
        }
        None => tracing::debug!("no cointegration result supplied"),
    }

    PricePair::new(a, b)
}

/// Load, backtest and export. Returns the result for summary printing.
pub fn run_backtest_pipeline(
    data_port: &dyn PriceDataPort,
    cointegration: &dyn CointegrationPort,
    report_port: &dyn ReportPort,
    spec: &PairSpec,
    bt_config: &BacktestConfig,
    outputs: &ReportOutputs,
    significance: f64,
) -> Result<BacktestResult, PairtraderError> {
    let pair = load_pair(data_port, cointegration, spec, significance)?;

    tracing::info!(
        "Running backtest: {} / {}, {} points, mode {}, entry {}, exit {}",
        pair.instrument_a(),
        pair.instrument_b(),
        pair.len(),
        bt_config.signal_mode,
        bt_config.thresholds.entry(),
        bt_config.thresholds.exit(),
    );
    let result = run_backtest(&pair, bt_config)?;

    report_port.write_trades(
        &result.trades,
        pair.instrument_a(),
        pair.instrument_b(),
        &outputs.trades,
    )?;
    tracing::info!("Saved trade log to {}", outputs.trades.display());

    if let Some(path) = &outputs.equity {
        report_port.write_equity_curve(&result.equity_curve, path)?;
        tracing::info!("Saved equity curve to {}", path.display());
    }

    Ok(result)
}

pub fn format_summary(result: &BacktestResult, instrument_a: &str, instrument_b: &str) -> String {
    let s = &result.summary;
    let mut out = String::new();
    let _ = writeln!(out, "=== Backtest Summary: {} / {} ===", instrument_a, instrument_b);
    let _ = writeln!(out, "Total Trades:     {}", s.trade_count);
    let _ = writeln!(out, "Total Return:     {:.2}%", s.total_return * 100.0);
    let _ = writeln!(out, "Sharpe Ratio:     {:.2}", s.sharpe_ratio);
    let _ = writeln!(out, "Max Drawdown:     {:.2}%", s.max_drawdown * 100.0);
    let _ = writeln!(out, "Win Rate:         {:.1}%", s.win_rate * 100.0);
    let _ = writeln!(out, "Avg Holding:      {:.1} days", s.avg_holding_days);
    if let Some(open) = &result.open_position {
        let _ = writeln!(
            out,
            "Open at end:      {} since {} (excluded)",
            open.kind.label(instrument_a, instrument_b),
            open.entry_date
        );
    }
    out
}

fn run_backtest_command(
    config_path: &Path,
    prices_override: Option<PathBuf>,
    trades_override: Option<PathBuf>,
    equity_override: Option<PathBuf>,
) -> Result<(), PairtraderError> {
    let config = load_config(config_path)?;
    let mut spec = build_pair_spec(&config)?;
    if let Some(prices) = prices_override {
        spec.prices = prices;
    }
    let bt_config = build_backtest_config(&config)?;
    let outputs = build_report_outputs(&config, trades_override, equity_override);
    let significance = significance(&config)?;

    let data_port = CsvPriceAdapter::new(spec.prices.clone());
    let cointegration = ConfiguredCointegration::from_config(&config);
    let result = run_backtest_pipeline(
        &data_port,
        &cointegration,
        &CsvReportAdapter::new(),
        &spec,
        &bt_config,
        &outputs,
        significance,
    )?;

    print!("{}", format_summary(&result, &spec.instrument_a, &spec.instrument_b));
    Ok(())
}

fn run_dry_run(config_path: &Path) -> Result<(), PairtraderError> {
    let config = load_config(config_path)?;
    let spec = build_pair_spec(&config)?;
    let bt_config = build_backtest_config(&config)?;
    let outputs = build_report_outputs(&config, None, None);

    println!("Pair:               {} / {}", spec.instrument_a, spec.instrument_b);
    println!("Prices:             {}", spec.prices.display());
    if spec.start_date.is_some() || spec.end_date.is_some() {
        let bound = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "Date range:         {} to {}",
            bound(spec.start_date),
            bound(spec.end_date)
        );
    }
    println!("Signal mode:        {}", bt_config.signal_mode);
    println!("Entry threshold:    {}", bt_config.thresholds.entry());
    println!("Exit threshold:     {}", bt_config.thresholds.exit());
    println!("Annualization:      {}", bt_config.annualization_factor);
    println!("Force close at end: {}", bt_config.force_close_at_end);
    println!("Trades output:      {}", outputs.trades.display());

    tracing::info!("Dry run complete: configuration is valid");
    Ok(())
}

pub fn write_spread(
    data_port: &dyn PriceDataPort,
    report_port: &dyn ReportPort,
    spec: &PairSpec,
    mode: SignalMode,
    output: &Path,
) -> Result<SignalSeries, PairtraderError> {
    let a = data_port.fetch_prices(&spec.instrument_a, spec.start_date, spec.end_date)?;
    let b = data_port.fetch_prices(&spec.instrument_b, spec.start_date, spec.end_date)?;
    let pair = PricePair::new(a, b)?;
    let signal = generate_signal(&pair, mode)?;
    report_port.write_signal(&signal, output)?;
    Ok(signal)
}

fn run_spread(config_path: &Path, output: Option<PathBuf>) -> Result<(), PairtraderError> {
    let config = load_config(config_path)?;
    let spec = build_pair_spec(&config)?;
    let bt_config = build_backtest_config(&config)?;
    let output = output.unwrap_or_else(|| PathBuf::from("spread.csv"));

    let signal = write_spread(
        &CsvPriceAdapter::new(spec.prices.clone()),
        &CsvReportAdapter::new(),
        &spec,
        bt_config.signal_mode,
        &output,
    )?;
    tracing::info!("Wrote {} signal points to {}", signal.len(), output.display());
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), PairtraderError> {
    let config = load_config(config_path)?;
    build_pair_spec(&config)?;
    build_backtest_config(&config)?;
    println!("Configuration is valid.");
    Ok(())
}

fn run_info(config_path: &Path) -> Result<(), PairtraderError> {
    let config = load_config(config_path)?;
    let spec = build_pair_spec(&config)?;
    let adapter = CsvPriceAdapter::new(spec.prices.clone());

    let instruments = adapter.list_instruments()?;
    if instruments.is_empty() {
        tracing::warn!("No instruments found in {}", spec.prices.display());
        return Ok(());
    }

    for instrument in &instruments {
        match adapter.get_data_range(instrument) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} points, {} to {}", instrument, count, first, last);
            }
            Ok(None) => println!("{}: no data", instrument),
            Err(e) => tracing::warn!("{}: {}", instrument, e),
        }
    }
    Ok(())
}
