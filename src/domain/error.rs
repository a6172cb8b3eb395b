//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for pairtrader.
#[derive(Debug, thiserror::Error)]
pub enum PairtraderError {
    #[error("data alignment error: {reason}")]
    DataAlignment { reason: String },

    #[error("degenerate signal: {reason}")]
    DegenerateSignal { reason: String },

    #[error("invalid thresholds: exit ({exit}) must satisfy 0 <= exit < entry ({entry})")]
    InvalidThreshold { entry: f64, exit: f64 },

    #[error("invalid price for {instrument} on {date}: {price}")]
    InvalidPrice {
        instrument: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("insufficient data: have {points} points, need {minimum}")]
    InsufficientData { points: usize, minimum: usize },

    #[error("no data for {instrument}")]
    NoData { instrument: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PairtraderError {
    pub fn alignment(reason: impl Into<String>) -> Self {
        PairtraderError::DataAlignment {
            reason: reason.into(),
        }
    }

    /// Process exit status for this error class.
    pub fn exit_status(&self) -> u8 {
        match self {
            PairtraderError::Io(_) | PairtraderError::Report { .. } => 1,
            PairtraderError::ConfigParse { .. }
            | PairtraderError::ConfigMissing { .. }
            | PairtraderError::ConfigInvalid { .. }
            | PairtraderError::InvalidThreshold { .. } => 2,
            PairtraderError::DataAlignment { .. }
            | PairtraderError::InvalidPrice { .. }
            | PairtraderError::InsufficientData { .. }
            | PairtraderError::NoData { .. }
            | PairtraderError::DegenerateSignal { .. } => 5,
        }
    }
}

impl From<&PairtraderError> for std::process::ExitCode {
    fn from(err: &PairtraderError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
