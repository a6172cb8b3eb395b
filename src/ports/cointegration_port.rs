//! Cointegration test port trait.

use crate::domain::cointegration::CointegrationResult;
use crate::domain::error::PairtraderError;
use crate::domain::price_series::PriceSeries;

pub trait CointegrationPort {
    /// `Ok(None)` when no test result is available for the pair.
    fn test(
        &self,
        a: &PriceSeries,
        b: &PriceSeries,
    ) -> Result<Option<CointegrationResult>, PairtraderError>;
}
