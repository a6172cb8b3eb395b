#![allow(dead_code)]

use chrono::NaiveDate;
use pairtrader::cli::{PairSpec, ReportOutputs};
use pairtrader::domain::cointegration::CointegrationResult;
use pairtrader::domain::error::PairtraderError;
use pairtrader::domain::position::Trade;
use pairtrader::domain::price_series::{PricePair, PricePoint, PriceSeries};
use pairtrader::domain::signal::SignalSeries;
use pairtrader::ports::cointegration_port::CointegrationPort;
use pairtrader::ports::data_port::PriceDataPort;
use pairtrader::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MockPriceDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, instrument: &str, prices: &[f64]) -> Self {
        self.data
            .insert(instrument.to_string(), make_points(prices));
        self
    }

    pub fn with_points(mut self, instrument: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(instrument.to_string(), points);
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors
            .insert(instrument.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockPriceDataPort {
    fn fetch_prices(
        &self,
        instrument: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, PairtraderError> {
        if let Some(reason) = self.errors.get(instrument) {
            return Err(PairtraderError::alignment(reason.clone()));
        }
        let points = self
            .data
            .get(instrument)
            .ok_or_else(|| PairtraderError::NoData {
                instrument: instrument.to_string(),
            })?
            .iter()
            .copied()
            .filter(|p| start_date.is_none_or(|s| p.date >= s))
            .filter(|p| end_date.is_none_or(|e| p.date <= e))
            .collect();
        PriceSeries::new(instrument, points)
    }

    fn list_instruments(&self) -> Result<Vec<String>, PairtraderError> {
        let mut names: Vec<String> = self.data.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

pub struct MockCointegration {
    pub result: Option<CointegrationResult>,
    pub calls: RefCell<usize>,
}

impl MockCointegration {
    pub fn none() -> Self {
        Self {
            result: None,
            calls: RefCell::new(0),
        }
    }

    pub fn with_p_value(p_value: f64) -> Self {
        Self {
            result: Some(CointegrationResult {
                test_statistic: -3.0,
                p_value,
            }),
            calls: RefCell::new(0),
        }
    }
}

impl CointegrationPort for MockCointegration {
    fn test(
        &self,
        _a: &PriceSeries,
        _b: &PriceSeries,
    ) -> Result<Option<CointegrationResult>, PairtraderError> {
        *self.calls.borrow_mut() += 1;
        Ok(self.result)
    }
}

#[derive(Default)]
pub struct MockReportPort {
    pub trades: RefCell<Vec<(Vec<Trade>, String, String, PathBuf)>>,
    pub curves: RefCell<Vec<(Vec<f64>, PathBuf)>>,
    pub signals: RefCell<Vec<(SignalSeries, PathBuf)>>,
}

impl ReportPort for MockReportPort {
    fn write_trades(
        &self,
        trades: &[Trade],
        instrument_a: &str,
        instrument_b: &str,
        output_path: &Path,
    ) -> Result<(), PairtraderError> {
        self.trades.borrow_mut().push((
            trades.to_vec(),
            instrument_a.to_string(),
            instrument_b.to_string(),
            output_path.to_path_buf(),
        ));
        Ok(())
    }

    fn write_equity_curve(&self, curve: &[f64], output_path: &Path) -> Result<(), PairtraderError> {
        self.curves
            .borrow_mut()
            .push((curve.to_vec(), output_path.to_path_buf()));
        Ok(())
    }

    fn write_signal(&self, signal: &SignalSeries, output_path: &Path) -> Result<(), PairtraderError> {
        self.signals
            .borrow_mut()
            .push((signal.clone(), output_path.to_path_buf()));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily points starting 2024-01-01.
pub fn make_points(prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint {
            date: date(2024, 1, 1) + chrono::Duration::days(i as i64),
            price,
        })
        .collect()
}

pub fn make_pair(a: &[f64], b: &[f64]) -> PricePair {
    PricePair::new(
        PriceSeries::new("KO", make_points(a)).unwrap(),
        PriceSeries::new("PEP", make_points(b)).unwrap(),
    )
    .unwrap()
}

pub fn sample_spec() -> PairSpec {
    PairSpec {
        prices: PathBuf::from("prices.csv"),
        instrument_a: "KO".to_string(),
        instrument_b: "PEP".to_string(),
        start_date: None,
        end_date: None,
    }
}

pub fn sample_outputs() -> ReportOutputs {
    ReportOutputs {
        trades: PathBuf::from("trades.csv"),
        equity: None,
    }
}
