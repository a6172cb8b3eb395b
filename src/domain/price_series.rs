//! Price series and aligned instrument pairs.

use chrono::NaiveDate;

use super::error::PairtraderError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Ordered prices for a single instrument. Dates are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    instrument: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(
        instrument: impl Into<String>,
        points: Vec<PricePoint>,
    ) -> Result<Self, PairtraderError> {
        let instrument = instrument.into();

        for point in &points {
            if !point.price.is_finite() {
                return Err(PairtraderError::alignment(format!(
                    "missing value for {} on {}",
                    instrument, point.date
                )));
            }
            if point.price <= 0.0 {
                return Err(PairtraderError::InvalidPrice {
                    instrument,
                    date: point.date,
                    price: point.price,
                });
            }
        }

        if let Some(w) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(PairtraderError::alignment(format!(
                "{} dates not strictly increasing at {}",
                instrument, w[1].date
            )));
        }

        Ok(Self { instrument, points })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Two price series sharing an identical date index.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePair {
    a: PriceSeries,
    b: PriceSeries,
}

impl PricePair {
    pub fn new(a: PriceSeries, b: PriceSeries) -> Result<Self, PairtraderError> {
        if a.is_empty() || b.is_empty() {
            return Err(PairtraderError::alignment(format!(
                "empty series ({}: {} points, {}: {} points)",
                a.instrument,
                a.len(),
                b.instrument,
                b.len()
            )));
        }
        if a.len() != b.len() {
            return Err(PairtraderError::alignment(format!(
                "length mismatch ({}: {}, {}: {})",
                a.instrument,
                a.len(),
                b.instrument,
                b.len()
            )));
        }
        if let Some((pa, pb)) = a
            .points
            .iter()
            .zip(&b.points)
            .find(|(pa, pb)| pa.date != pb.date)
        {
            return Err(PairtraderError::alignment(format!(
                "date mismatch ({} has {}, {} has {})",
                a.instrument, pa.date, b.instrument, pb.date
            )));
        }
        Ok(Self { a, b })
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    pub fn instrument_a(&self) -> &str {
        &self.a.instrument
    }

    pub fn instrument_b(&self) -> &str {
        &self.b.instrument
    }

    pub fn date(&self, i: usize) -> NaiveDate {
        self.a.points[i].date
    }

    pub fn price_a(&self, i: usize) -> f64 {
        self.a.points[i].price
    }

    pub fn price_b(&self, i: usize) -> f64 {
        self.b.points[i].price
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.a.points.iter().map(|p| p.date)
    }
}
