//! CSV price table adapter.
//!
//! Reads a wide table with one date column followed by one close-price column
//! per instrument:
//!
//! ```text
//! Date,KO,PEP
//! 2018-01-02,45.7,117.1
//! ```
//!
//! Rows before the first dated row whose first cell is not a date (extra
//! header rows written by some download tools) are skipped. After that every
//! row must carry a date, and dates must be strictly increasing; nothing is
//! re-sorted. Dates may carry a time suffix.

use crate::domain::error::PairtraderError;
use crate::domain::price_series::{PricePoint, PriceSeries};
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Header row plus dated rows in file order. Dates must be strictly
    /// increasing.
    fn read_table(
        &self,
    ) -> Result<(csv::StringRecord, Vec<(NaiveDate, csv::StringRecord)>), PairtraderError> {
        let content = fs::read_to_string(&self.path)?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| PairtraderError::alignment(format!("CSV header error: {}", e)))?
            .clone();

        let mut rows: Vec<(NaiveDate, csv::StringRecord)> = Vec::new();
        for result in rdr.records() {
            let record =
                result.map_err(|e| PairtraderError::alignment(format!("CSV parse error: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let cell = record.get(0).unwrap_or_default();

            let Some(date) = parse_date(cell) else {
                if rows.is_empty() {
                    continue;
                }
                return Err(PairtraderError::alignment(format!(
                    "invalid date '{}' on line {}",
                    cell.trim(),
                    line
                )));
            };
            if let Some((prev, _)) = rows.last() {
                if date <= *prev {
                    return Err(PairtraderError::alignment(format!(
                        "dates not strictly increasing: {} follows {} on line {}",
                        date, prev, line
                    )));
                }
            }
            rows.push((date, record));
        }
        Ok((headers, rows))
    }
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    let day = cell.get(..10).unwrap_or(cell);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl PriceDataPort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        instrument: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, PairtraderError> {
        let (headers, rows) = self.read_table()?;
        let column = headers
            .iter()
            .skip(1)
            .position(|h| h.trim().eq_ignore_ascii_case(instrument))
            .map(|i| i + 1)
            .ok_or_else(|| PairtraderError::NoData {
                instrument: instrument.to_string(),
            })?;

        let mut points = Vec::with_capacity(rows.len());
        for (date, record) in &rows {
            let date = *date;
            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }

            let cell = record.get(column).map(str::trim).unwrap_or_default();
            if cell.is_empty() {
                return Err(PairtraderError::alignment(format!(
                    "missing value for {} on {}",
                    instrument, date
                )));
            }
            let price: f64 = cell.parse().map_err(|e| {
                PairtraderError::alignment(format!(
                    "invalid price for {} on {}: {}",
                    instrument, date, e
                ))
            })?;
            points.push(PricePoint { date, price });
        }

        let name = headers.get(column).unwrap_or(instrument).trim();
        PriceSeries::new(name, points)
    }

    fn list_instruments(&self) -> Result<Vec<String>, PairtraderError> {
        let (headers, _) = self.read_table()?;
        Ok(headers
            .iter()
            .skip(1)
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect())
    }
}
