//! Advisory cointegration gate.
//!
//! The test itself (e.g. Engle-Granger) runs outside this crate. Only its
//! statistic and p-value are consumed, and a failing pair is still backtested.

pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CointegrationResult {
    pub test_statistic: f64,
    pub p_value: f64,
}

impl CointegrationResult {
    pub fn is_cointegrated(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}
