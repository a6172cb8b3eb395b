//! Cointegration result supplied through configuration.
//!
//! The test is run by an external statistics tool; its output is recorded in
//! the `[cointegration]` section:
//!
//! ```ini
//! [cointegration]
//! test_statistic = -3.42
//! p_value = 0.038
//! ```

use crate::domain::cointegration::CointegrationResult;
use crate::domain::error::PairtraderError;
use crate::domain::price_series::PriceSeries;
use crate::ports::config_port::ConfigPort;
use crate::ports::cointegration_port::CointegrationPort;

pub struct ConfiguredCointegration {
    result: Option<CointegrationResult>,
}

impl ConfiguredCointegration {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let p_value = config.get_double("cointegration", "p_value", f64::NAN);
        let result = (!p_value.is_nan()).then(|| CointegrationResult {
            test_statistic: config.get_double("cointegration", "test_statistic", f64::NAN),
            p_value,
        });
        Self { result }
    }
}

impl CointegrationPort for ConfiguredCointegration {
    fn test(
        &self,
        _a: &PriceSeries,
        _b: &PriceSeries,
    ) -> Result<Option<CointegrationResult>, PairtraderError> {
        Ok(self.result)
    }
}
