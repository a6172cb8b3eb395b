//! Price history access port trait.

use crate::domain::error::PairtraderError;
use crate::domain::price_series::PriceSeries;
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Prices for one instrument, optionally restricted to `start..=end`.
    fn fetch_prices(
        &self,
        instrument: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, PairtraderError>;

    fn list_instruments(&self) -> Result<Vec<String>, PairtraderError>;

    /// First date, last date and point count, or `None` if the instrument has no prices.
    fn get_data_range(
        &self,
        instrument: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, PairtraderError> {
        let series = self.fetch_prices(instrument, None, None)?;
        Ok(series
            .first_date()
            .zip(series.last_date())
            .map(|(first, last)| (first, last, series.len())))
    }
}
