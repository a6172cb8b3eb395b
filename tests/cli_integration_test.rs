//! CLI integration tests for config parsing and command orchestration.
//!
//! Tests cover:
//! - Config parsing (build_pair_spec, build_backtest_config, build_report_outputs)
//! - load_config with real INI files on disk
//! - Backtest pipeline with mock ports
//! - End-to-end backtest with real CSV price files and CSV reports
//! - Summary formatting
//! - Spread export

mod common;

use common::*;
use pairtrader::adapters::configured_cointegration::ConfiguredCointegration;
use pairtrader::adapters::csv_adapter::CsvPriceAdapter;
use pairtrader::adapters::csv_report_adapter::CsvReportAdapter;
use pairtrader::adapters::file_config_adapter::FileConfigAdapter;
use pairtrader::cli;
use pairtrader::domain::backtest::BacktestConfig;
use pairtrader::domain::cointegration::DEFAULT_SIGNIFICANCE;
use pairtrader::domain::error::PairtraderError;
use pairtrader::domain::signal::SignalMode;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[data]
prices = data/prices.csv
instrument_a = ko
instrument_b = pep
start_date = 2024-01-01
end_date = 2024-12-31

[signal]
mode = full_sample
entry_threshold = 1.0
exit_threshold = 0.5

[backtest]
annualization_factor = 252
force_close_at_end = false

[report]
trades_output = out/trades.csv
equity_output = out/equity.csv
"#;

const PRICES_CSV: &str = "\
Date,KO,PEP
2024-01-01,100.0,100.0
2024-01-02,100.0,100.0
2024-01-03,100.0,100.0
2024-01-04,96.0,100.0
2024-01-05,100.0,100.0
";

mod config_parsing {
    use super::*;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn pair_spec_from_config() {
        let spec = cli::build_pair_spec(&config(VALID_INI)).unwrap();
        assert_eq!(spec.prices, PathBuf::from("data/prices.csv"));
        assert_eq!(spec.instrument_a, "KO");
        assert_eq!(spec.instrument_b, "PEP");
        assert_eq!(spec.start_date, Some(date(2024, 1, 1)));
        assert_eq!(spec.end_date, Some(date(2024, 12, 31)));
    }

    #[test]
    fn pair_spec_missing_instrument() {
        let err = cli::build_pair_spec(&config("[data]\nprices = p.csv\ninstrument_a = KO\n"))
            .unwrap_err();
        assert!(matches!(err, PairtraderError::ConfigMissing { key, .. } if key == "instrument_b"));
    }

    #[test]
    fn backtest_config_from_valid_ini() {
        let bt = cli::build_backtest_config(&config(VALID_INI)).unwrap();
        assert_eq!(bt, BacktestConfig::default());
    }

    #[test]
    fn backtest_config_defaults_when_sections_absent() {
        let bt = cli::build_backtest_config(&config("[data]\nprices = p.csv\n")).unwrap();
        assert_eq!(bt, BacktestConfig::default());
    }

    #[test]
    fn rolling_mode_reads_window() {
        let bt = cli::build_backtest_config(&config(
            "[signal]\nmode = Rolling\nwindow = 60\nentry_threshold = 2.0\nexit_threshold = 0.0\n\n[backtest]\nforce_close_at_end = true\n",
        ))
        .unwrap();
        assert_eq!(bt.signal_mode, SignalMode::Rolling(60));
        assert_eq!(bt.thresholds.entry(), 2.0);
        assert_eq!(bt.thresholds.exit(), 0.0);
        assert!(bt.force_close_at_end);
    }

    #[test]
    fn rolling_mode_default_window() {
        let bt = cli::build_backtest_config(&config("[signal]\nmode = rolling\n")).unwrap();
        assert_eq!(bt.signal_mode, SignalMode::Rolling(20));
    }

    #[test]
    fn unknown_mode_rejected() {
        let err = cli::build_backtest_config(&config("[signal]\nmode = kalman\n")).unwrap_err();
        assert!(matches!(err, PairtraderError::ConfigInvalid { key, .. } if key == "mode"));
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let err = cli::build_backtest_config(&config(
            "[signal]\nentry_threshold = 0.5\nexit_threshold = 1.0\n",
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            PairtraderError::InvalidThreshold { entry, exit } if entry == 0.5 && exit == 1.0
        ));
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn negative_annualization_rejected() {
        let err = cli::build_backtest_config(&config("[backtest]\nannualization_factor = -5\n"))
            .unwrap_err();
        assert!(
            matches!(err, PairtraderError::ConfigInvalid { key, .. } if key == "annualization_factor")
        );
    }

    #[test]
    fn malformed_numbers_are_not_replaced_by_defaults() {
        for (ini, key) in [
            ("[signal]\nentry_threshold = 0.3x\nexit_threshold = 0.2\n", "entry_threshold"),
            ("[signal]\nmode = rolling\nwindow = abc\n", "window"),
            ("[backtest]\nannualization_factor = 25o\n", "annualization_factor"),
        ] {
            let err = cli::build_backtest_config(&config(ini)).unwrap_err();
            assert!(
                matches!(&err, PairtraderError::ConfigInvalid { key: k, .. } if k == key),
                "{key}: {err:?}"
            );
            assert_eq!(err.exit_status(), 2);
        }
    }

    #[test]
    fn load_config_rejects_malformed_significance() {
        let file = write_temp_ini(&format!("{VALID_INI}\n[cointegration]\nsignificance = 0.05x\n"));
        let err = cli::load_config(file.path()).unwrap_err();
        assert!(matches!(err, PairtraderError::ConfigInvalid { key, .. } if key == "significance"));
    }

    #[test]
    fn report_outputs_from_config() {
        let outputs = cli::build_report_outputs(&config(VALID_INI), None, None);
        assert_eq!(outputs.trades, PathBuf::from("out/trades.csv"));
        assert_eq!(outputs.equity, Some(PathBuf::from("out/equity.csv")));
    }

    #[test]
    fn report_outputs_overrides_win() {
        let outputs = cli::build_report_outputs(
            &config(VALID_INI),
            Some(PathBuf::from("t.csv")),
            Some(PathBuf::from("e.csv")),
        );
        assert_eq!(outputs.trades, PathBuf::from("t.csv"));
        assert_eq!(outputs.equity, Some(PathBuf::from("e.csv")));
    }

    #[test]
    fn report_outputs_default_trades_path() {
        let outputs = cli::build_report_outputs(&config("[data]\nprices = p.csv\n"), None, None);
        assert_eq!(outputs.trades, PathBuf::from("trades.csv"));
        assert_eq!(outputs.equity, None);
    }
}

mod load_config_from_disk {
    use super::*;

    #[test]
    fn valid_file_loads() {
        let file = write_temp_ini(VALID_INI);
        assert!(cli::load_config(file.path()).is_ok());
    }

    #[test]
    fn invalid_file_fails_validation() {
        let file = write_temp_ini("[data]\nprices = p.csv\ninstrument_a = KO\ninstrument_b = KO\n");
        let err = cli::load_config(file.path()).unwrap_err();
        assert!(matches!(err, PairtraderError::ConfigInvalid { .. }));
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let err = cli::load_config(std::path::Path::new("/nonexistent/pair.ini")).unwrap_err();
        assert!(matches!(err, PairtraderError::ConfigParse { .. }));
        assert_eq!(err.exit_status(), 2);
    }
}

mod pipeline_with_mocks {
    use super::*;

    fn data_port() -> MockPriceDataPort {
        MockPriceDataPort::new()
            .with_prices("KO", &[100.0, 100.0, 100.0, 96.0, 100.0])
            .with_prices("PEP", &[100.0; 5])
    }

    #[test]
    fn writes_trades_and_returns_result() {
        let report = MockReportPort::default();
        let result = cli::run_backtest_pipeline(
            &data_port(),
            &MockCointegration::none(),
            &report,
            &sample_spec(),
            &BacktestConfig::default(),
            &sample_outputs(),
            DEFAULT_SIGNIFICANCE,
        )
        .unwrap();

        assert_eq!(result.trades.len(), 1);
        let written = report.trades.borrow();
        assert_eq!(written.len(), 1);
        let (trades, a, b, path) = &written[0];
        assert_eq!(trades, &result.trades);
        assert_eq!(a, "KO");
        assert_eq!(b, "PEP");
        assert_eq!(path, &PathBuf::from("trades.csv"));
        assert!(report.curves.borrow().is_empty());
    }

    #[test]
    fn writes_equity_curve_when_requested() {
        let report = MockReportPort::default();
        let outputs = cli::ReportOutputs {
            trades: PathBuf::from("trades.csv"),
            equity: Some(PathBuf::from("equity.csv")),
        };
        let result = cli::run_backtest_pipeline(
            &data_port(),
            &MockCointegration::none(),
            &report,
            &sample_spec(),
            &BacktestConfig::default(),
            &outputs,
            DEFAULT_SIGNIFICANCE,
        )
        .unwrap();

        let curves = report.curves.borrow();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].0, result.equity_curve);
        assert_eq!(curves[0].1, PathBuf::from("equity.csv"));
    }

    #[test]
    fn failed_cointegration_does_not_stop_backtest() {
        let coint = MockCointegration::with_p_value(0.4);
        let result = cli::run_backtest_pipeline(
            &data_port(),
            &coint,
            &MockReportPort::default(),
            &sample_spec(),
            &BacktestConfig::default(),
            &sample_outputs(),
            DEFAULT_SIGNIFICANCE,
        )
        .unwrap();
        assert_eq!(*coint.calls.borrow(), 1);
        assert_eq!(result.trades.len(), 1);
    }

    #[test]
    fn data_error_propagates_without_writing() {
        let port = data_port().with_error("PEP", "missing value for PEP on 2024-01-03");
        let report = MockReportPort::default();
        let err = cli::run_backtest_pipeline(
            &port,
            &MockCointegration::none(),
            &report,
            &sample_spec(),
            &BacktestConfig::default(),
            &sample_outputs(),
            DEFAULT_SIGNIFICANCE,
        )
        .unwrap_err();
        assert!(matches!(err, PairtraderError::DataAlignment { .. }));
        assert_eq!(err.exit_status(), 5);
        assert!(report.trades.borrow().is_empty());
    }

    #[test]
    fn degenerate_pair_writes_nothing() {
        let port = MockPriceDataPort::new()
            .with_prices("KO", &[10.0, 11.0, 12.0])
            .with_prices("PEP", &[8.0, 9.0, 10.0]);
        let report = MockReportPort::default();
        let err = cli::run_backtest_pipeline(
            &port,
            &MockCointegration::none(),
            &report,
            &sample_spec(),
            &BacktestConfig::default(),
            &sample_outputs(),
            DEFAULT_SIGNIFICANCE,
        )
        .unwrap_err();
        assert!(matches!(err, PairtraderError::DegenerateSignal { .. }));
        assert!(report.trades.borrow().is_empty());
    }
}

mod summary_output {
    use super::*;

    #[test]
    fn summary_lists_headline_metrics() {
        let pair = make_pair(&[100.0, 100.0, 96.0, 100.0, 104.0, 100.0, 96.0, 100.0], &[100.0; 8]);
        let result =
            pairtrader::domain::backtest::run_backtest(&pair, &BacktestConfig::default()).unwrap();
        let text = cli::format_summary(&result, "KO", "PEP");

        assert!(text.contains("KO / PEP"));
        assert!(text.contains("Total Trades:     3"));
        assert!(text.contains("Max Drawdown:     0.00%"));
        assert!(text.contains("Win Rate:         100.0%"));
        assert!(text.contains("Avg Holding:      1.0 days"));
        assert!(!text.contains("Open at end"));
    }

    #[test]
    fn summary_mentions_open_position() {
        let pair = make_pair(&[100.0, 100.0, 100.0, 100.0, 96.0], &[100.0; 5]);
        let result =
            pairtrader::domain::backtest::run_backtest(&pair, &BacktestConfig::default()).unwrap();
        let text = cli::format_summary(&result, "KO", "PEP");

        assert!(text.contains("Total Trades:     0"));
        assert!(text.contains("Total Return:     0.00%"));
        assert!(text.contains("Open at end:      Long KO / Short PEP since 2024-01-05"));
    }
}

mod spread_export {
    use super::*;

    #[test]
    fn writes_full_signal_series() {
        let port = MockPriceDataPort::new()
            .with_prices("KO", &[100.0, 100.0, 100.0, 96.0, 100.0])
            .with_prices("PEP", &[100.0; 5]);
        let report = MockReportPort::default();
        let signal = cli::write_spread(
            &port,
            &report,
            &sample_spec(),
            SignalMode::FullSample,
            std::path::Path::new("spread.csv"),
        )
        .unwrap();

        assert_eq!(signal.len(), 5);
        let written = report.signals.borrow();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, signal);
        assert_eq!(written[0].1, PathBuf::from("spread.csv"));
    }
}

mod end_to_end_csv {
    use super::*;

    #[test]
    fn backtest_from_csv_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let prices = dir.path().join("prices.csv");
        fs::write(&prices, PRICES_CSV).unwrap();
        let trades_path = dir.path().join("trades.csv");
        let equity_path = dir.path().join("equity.csv");

        let ini = format!(
            "[data]\nprices = {}\ninstrument_a = KO\ninstrument_b = PEP\n\n[cointegration]\ntest_statistic = -3.4\np_value = 0.03\n",
            prices.display()
        );
        let config = FileConfigAdapter::from_string(&ini).unwrap();
        let spec = cli::build_pair_spec(&config).unwrap();
        let bt_config = cli::build_backtest_config(&config).unwrap();
        let outputs = cli::build_report_outputs(
            &config,
            Some(trades_path.clone()),
            Some(equity_path.clone()),
        );

        let result = cli::run_backtest_pipeline(
            &CsvPriceAdapter::new(spec.prices.clone()),
            &ConfiguredCointegration::from_config(&config),
            &CsvReportAdapter::new(),
            &spec,
            &bt_config,
            &outputs,
            DEFAULT_SIGNIFICANCE,
        )
        .unwrap();
        assert_eq!(result.trades.len(), 1);

        let trades_csv = fs::read_to_string(&trades_path).unwrap();
        let mut lines = trades_csv.lines();
        assert_eq!(lines.next(), Some("Entry Date,Exit Date,Position,Return"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("2024-01-04,2024-01-05,Long KO / Short PEP,"));
        assert_eq!(lines.next(), None);

        let equity_csv = fs::read_to_string(&equity_path).unwrap();
        assert_eq!(equity_csv.lines().next(), Some("Trade,Equity"));
        assert_eq!(equity_csv.lines().count(), 2);
    }

    #[test]
    fn flat_run_writes_header_only_trade_log() {
        let dir = tempfile::TempDir::new().unwrap();
        let prices = dir.path().join("prices.csv");
        fs::write(
            &prices,
            "Date,KO,PEP\n2024-01-01,96.0,100.0\n2024-01-02,100.0,100.0\n2024-01-03,100.0,100.0\n2024-01-04,100.0,100.0\n",
        )
        .unwrap();
        let trades_path = dir.path().join("trades.csv");

        let result = cli::run_backtest_pipeline(
            &CsvPriceAdapter::new(prices),
            &MockCointegration::none(),
            &CsvReportAdapter::new(),
            &sample_spec(),
            &BacktestConfig::default(),
            &cli::ReportOutputs {
                trades: trades_path.clone(),
                equity: None,
            },
            DEFAULT_SIGNIFICANCE,
        )
        .unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(
            fs::read_to_string(&trades_path).unwrap().trim_end(),
            "Entry Date,Exit Date,Position,Return"
        );
    }

    #[test]
    fn missing_price_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = cli::run_backtest_pipeline(
            &CsvPriceAdapter::new(dir.path().join("absent.csv")),
            &MockCointegration::none(),
            &MockReportPort::default(),
            &sample_spec(),
            &BacktestConfig::default(),
            &sample_outputs(),
            DEFAULT_SIGNIFICANCE,
        )
        .unwrap_err();
        assert!(matches!(err, PairtraderError::Io(_)));
        assert_eq!(err.exit_status(), 1);
    }
}
