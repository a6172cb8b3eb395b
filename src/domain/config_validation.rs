//! Configuration validation.
//!
//! Validates all config fields before a backtest runs. The typed readers here
//! are shared with the CLI so a value is parsed the same way it was validated.
//! A key that is present but does not parse is an error, never a default.

use std::fmt::Display;
use std::str::FromStr;

use crate::domain::cointegration::DEFAULT_SIGNIFICANCE;
use crate::domain::error::PairtraderError;
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;
use crate::domain::signal::SignalMode;
use crate::domain::state_machine::{Thresholds, DEFAULT_ENTRY_THRESHOLD, DEFAULT_EXIT_THRESHOLD};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_ROLLING_WINDOW: usize = 20;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    validate_data_config(config)?;
    validate_signal_config(config)?;
    validate_backtest_config(config)?;
    validate_cointegration_config(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    require(config, "data", "prices")?;
    let a = require(config, "data", "instrument_a")?;
    let b = require(config, "data", "instrument_b")?;
    if a.eq_ignore_ascii_case(&b) {
        return Err(invalid("data", "instrument_b", "instrument_b must differ from instrument_a"));
    }

    let start = config.get_date("data", "start_date")?;
    let end = config.get_date("data", "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid("data", "start_date", "start_date must be before end_date"));
        }
    }
    Ok(())
}

pub fn validate_signal_config(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    signal_mode(config)?;
    thresholds(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    annualization_factor(config)?;
    Ok(())
}

pub fn validate_cointegration_config(config: &dyn ConfigPort) -> Result<(), PairtraderError> {
    if let Some(p_value) = parse_value::<f64>(config, "cointegration", "p_value")? {
        if !(0.0..=1.0).contains(&p_value) {
            return Err(invalid("cointegration", "p_value", "p_value must be between 0 and 1"));
        }
    }
    if let Some(statistic) = parse_value::<f64>(config, "cointegration", "test_statistic")? {
        if !statistic.is_finite() {
            return Err(invalid("cointegration", "test_statistic", "test_statistic must be finite"));
        }
    }
    significance(config)?;
    Ok(())
}

/// Typed value of `[section] key`. Absent or blank is `None`.
pub fn parse_value<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, PairtraderError>
where
    T: FromStr,
    T::Err: Display,
{
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map(Some).map_err(|e| {
            PairtraderError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("cannot parse '{}': {}", raw.trim(), e),
            }
        }),
        _ => Ok(None),
    }
}

/// `[signal] mode` and, for rolling mode, `window`.
pub fn signal_mode(config: &dyn ConfigPort) -> Result<SignalMode, PairtraderError> {
    let mode = config
        .get_string("signal", "mode")
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty());
    match mode.as_deref() {
        None | Some("full_sample") => Ok(SignalMode::FullSample),
        Some("rolling") => {
            let window = parse_value::<i64>(config, "signal", "window")?;
            match window.map(usize::try_from) {
                None => Ok(SignalMode::Rolling(DEFAULT_ROLLING_WINDOW)),
                Some(Ok(window)) if window >= 2 => Ok(SignalMode::Rolling(window)),
                Some(_) => Err(invalid("signal", "window", "rolling window must be at least 2")),
            }
        }
        Some(other) => Err(invalid(
            "signal",
            "mode",
            &format!("unknown mode '{}' (expected full_sample or rolling)", other),
        )),
    }
}

/// `[signal] entry_threshold` and `exit_threshold`.
pub fn thresholds(config: &dyn ConfigPort) -> Result<Thresholds, PairtraderError> {
    let entry = parse_value::<f64>(config, "signal", "entry_threshold")?
        .unwrap_or(DEFAULT_ENTRY_THRESHOLD);
    let exit = parse_value::<f64>(config, "signal", "exit_threshold")?
        .unwrap_or(DEFAULT_EXIT_THRESHOLD);
    Thresholds::new(entry, exit)
}

/// `[backtest] annualization_factor`, a positive integer.
pub fn annualization_factor(config: &dyn ConfigPort) -> Result<u32, PairtraderError> {
    match parse_value::<i64>(config, "backtest", "annualization_factor")? {
        None => Ok(TRADING_DAYS_PER_YEAR),
        Some(factor) => u32::try_from(factor)
            .ok()
            .filter(|&f| f > 0)
            .ok_or_else(|| {
                invalid(
                    "backtest",
                    "annualization_factor",
                    "annualization_factor must be a positive integer",
                )
            }),
    }
}

/// `[cointegration] significance`, strictly between 0 and 1.
pub fn significance(config: &dyn ConfigPort) -> Result<f64, PairtraderError> {
    let significance = parse_value::<f64>(config, "cointegration", "significance")?
        .unwrap_or(DEFAULT_SIGNIFICANCE);
    if significance > 0.0 && significance < 1.0 {
        Ok(significance)
    } else {
        Err(invalid(
            "cointegration",
            "significance",
            "significance must be between 0 and 1 (exclusive)",
        ))
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> PairtraderError {
    PairtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, PairtraderError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(PairtraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}
