//! Spread and z-score signal generation.
//!
//! `spread[t] = A[t] - B[t]`. In `FullSample` mode the z-score uses the mean
//! and sample (n-1) standard deviation of the whole history, so the signal at
//! `t` depends on data after `t`. `Rolling(w)` normalizes against the trailing
//! `w` points only; the first `w - 1` points are invalid.
//!
//! A spread whose standard deviation is below `DEGENERATE_TOLERANCE` times the
//! price level is treated as constant, so rounding noise from a constant
//! offset cannot produce a signal.

use chrono::NaiveDate;
use std::fmt;

use super::error::PairtraderError;
use super::price_series::PricePair;

pub const DEGENERATE_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalMode {
    #[default]
    FullSample,
    Rolling(usize),
}

impl fmt::Display for SignalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalMode::FullSample => write!(f, "full_sample"),
            SignalMode::Rolling(window) => write!(f, "rolling({window})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub spread: f64,
    pub zscore: f64,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalSeries {
    pub mode: SignalMode,
    pub points: Vec<SignalPoint>,
}

impl SignalSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Z-score at `i`, or `None` during warm-up.
    pub fn zscore(&self, i: usize) -> Option<f64> {
        self.points
            .get(i)
            .filter(|p| p.valid)
            .map(|p| p.zscore)
    }
}

pub fn compute_spread(pair: &PricePair) -> Vec<f64> {
    (0..pair.len())
        .map(|i| pair.price_a(i) - pair.price_b(i))
        .collect()
}

/// Mean and sample (n-1) standard deviation.
fn mean_and_sample_stddev(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}

pub fn generate_signal(pair: &PricePair, mode: SignalMode) -> Result<SignalSeries, PairtraderError> {
    let spread = compute_spread(pair);
    let price_level = (0..pair.len())
        .map(|i| pair.price_a(i).max(pair.price_b(i)))
        .fold(1.0_f64, f64::max);
    let min_stddev = price_level * DEGENERATE_TOLERANCE;

    let zscores = match mode {
        SignalMode::FullSample => full_sample_zscores(&spread, min_stddev)?,
        SignalMode::Rolling(window) => rolling_zscores(&spread, window, min_stddev)?,
    };

    let points = pair
        .dates()
        .zip(spread.iter().zip(zscores))
        .map(|(date, (&spread, z))| SignalPoint {
            date,
            spread,
            zscore: z.unwrap_or(0.0),
            valid: z.is_some(),
        })
        .collect();

    Ok(SignalSeries { mode, points })
}

fn full_sample_zscores(spread: &[f64], min_stddev: f64) -> Result<Vec<Option<f64>>, PairtraderError> {
    if spread.len() < 2 {
        return Err(PairtraderError::DegenerateSignal {
            reason: format!(
                "sample standard deviation undefined for {} point(s)",
                spread.len()
            ),
        });
    }

    let (mean, stddev) = mean_and_sample_stddev(spread);
    if stddev <= min_stddev || !stddev.is_finite() {
        return Err(PairtraderError::DegenerateSignal {
            reason: format!("spread is constant at {mean}"),
        });
    }

    Ok(spread.iter().map(|s| Some((s - mean) / stddev)).collect())
}

fn rolling_zscores(
    spread: &[f64],
    window: usize,
    min_stddev: f64,
) -> Result<Vec<Option<f64>>, PairtraderError> {
    if window < 2 {
        return Err(PairtraderError::ConfigInvalid {
            section: "signal".to_string(),
            key: "window".to_string(),
            reason: "rolling window must be at least 2".to_string(),
        });
    }
    if window > spread.len() {
        return Err(PairtraderError::InsufficientData {
            points: spread.len(),
            minimum: window,
        });
    }

    let mut zscores = vec![None; window - 1];
    zscores.extend(spread.windows(window).map(|w| {
        let (mean, stddev) = mean_and_sample_stddev(w);
        let current = w[window - 1];
        (stddev > min_stddev).then(|| (current - mean) / stddev)
    }));

    if zscores.iter().all(Option::is_none) {
        return Err(PairtraderError::DegenerateSignal {
            reason: format!("spread has zero variance in every {window}-point window"),
        });
    }

    Ok(zscores)
}
