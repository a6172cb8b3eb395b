//! Pair position states and closed trade records.

use chrono::NaiveDate;
use serde::Serialize;

/// Direction of an open pair position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PositionKind {
    /// Spread below its mean: buy A, sell B.
    LongAShortB,
    /// Spread above its mean: sell A, buy B.
    ShortALongB,
}

impl PositionKind {
    /// Human-readable label, e.g. "Long KO / Short PEP".
    pub fn label(&self, instrument_a: &str, instrument_b: &str) -> String {
        match self {
            PositionKind::LongAShortB => format!("Long {instrument_a} / Short {instrument_b}"),
            PositionKind::ShortALongB => format!("Short {instrument_a} / Long {instrument_b}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    pub kind: PositionKind,
    pub entry_date: NaiveDate,
    pub entry_price_a: f64,
    pub entry_price_b: f64,
}

impl OpenPosition {
    /// Return if the position were closed at the given prices.
    pub fn unrealized_return(&self, price_a: f64, price_b: f64) -> f64 {
        pair_return(
            self.kind,
            self.entry_price_a,
            self.entry_price_b,
            price_a,
            price_b,
        )
    }

    pub fn close(self, exit_date: NaiveDate, exit_price_a: f64, exit_price_b: f64) -> Trade {
        Trade {
            entry_date: self.entry_date,
            exit_date,
            kind: self.kind,
            entry_price_a: self.entry_price_a,
            entry_price_b: self.entry_price_b,
            exit_price_a,
            exit_price_b,
            ret: self.unrealized_return(exit_price_a, exit_price_b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    #[default]
    Flat,
    Open(OpenPosition),
}

impl Position {
    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }

    pub fn kind(&self) -> Option<PositionKind> {
        match self {
            Position::Flat => None,
            Position::Open(open) => Some(open.kind),
        }
    }
}

/// Unit-notional return of a long leg minus a short leg.
///
/// LongAShortB: `(xA/eA - 1) - (xB/eB - 1)`
/// ShortALongB: `(eA/xA - 1) - (eB/xB - 1)`
pub fn pair_return(kind: PositionKind, entry_a: f64, entry_b: f64, exit_a: f64, exit_b: f64) -> f64 {
    match kind {
        PositionKind::LongAShortB => (exit_a / entry_a - 1.0) - (exit_b / entry_b - 1.0),
        PositionKind::ShortALongB => (entry_a / exit_a - 1.0) - (entry_b / exit_b - 1.0),
    }
}

/// A closed pair trade. Created once, when the position closes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub kind: PositionKind,
    pub entry_price_a: f64,
    pub entry_price_b: f64,
    pub exit_price_a: f64,
    pub exit_price_b: f64,
    pub ret: f64,
}

impl Trade {
    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}
