//! Signal-to-trade state machine.
//!
//! States are `Flat`, `LongAShortB` and `ShortALongB`. At each step, in order:
//! 1. Flat and z < -entry: open LongAShortB at the current prices.
//! 2. Flat and z > entry: open ShortALongB at the current prices.
//! 3. Open and |z| < exit: close, record the trade, go flat.
//! 4. Otherwise hold.

use chrono::NaiveDate;

use super::error::PairtraderError;
use super::ledger::TradeLedger;
use super::position::{OpenPosition, Position, PositionKind, Trade};

pub const DEFAULT_ENTRY_THRESHOLD: f64 = 1.0;
pub const DEFAULT_EXIT_THRESHOLD: f64 = 0.5;

/// Entry/exit z-score thresholds, `0 <= exit < entry`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    entry: f64,
    exit: f64,
}

impl Thresholds {
    pub fn new(entry: f64, exit: f64) -> Result<Self, PairtraderError> {
        let valid = entry.is_finite() && exit.is_finite() && exit >= 0.0 && exit < entry;
        if !valid {
            return Err(PairtraderError::InvalidThreshold { entry, exit });
        }
        Ok(Self { entry, exit })
    }

    pub fn entry(&self) -> f64 {
        self.entry
    }

    pub fn exit(&self) -> f64 {
        self.exit
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            entry: DEFAULT_ENTRY_THRESHOLD,
            exit: DEFAULT_EXIT_THRESHOLD,
        }
    }
}

/// Outcome of a single step. Exactly one per timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Opened(PositionKind),
    Closed(Trade),
    Hold,
}

/// What to do with a position still open when the data runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndOfDataPolicy {
    /// Report realized trades only; the open leg is dropped.
    #[default]
    Drop,
    /// Close at the final prices and record the trade.
    ForceClose,
}

impl EndOfDataPolicy {
    pub fn from_force_close(force_close_at_end: bool) -> Self {
        if force_close_at_end {
            EndOfDataPolicy::ForceClose
        } else {
            EndOfDataPolicy::Drop
        }
    }
}

/// Final state of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub ledger: TradeLedger,
    /// Position left open at end of data (only under `EndOfDataPolicy::Drop`).
    pub open_position: Option<OpenPosition>,
}

#[derive(Debug, Clone)]
pub struct PositionStateMachine {
    thresholds: Thresholds,
    position: Position,
    ledger: TradeLedger,
}

impl PositionStateMachine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            position: Position::Flat,
            ledger: TradeLedger::new(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn ledger(&self) -> &TradeLedger {
        &self.ledger
    }

    /// Advance one timestep. A `None` signal (warm-up) always holds.
    pub fn step(
        &mut self,
        date: NaiveDate,
        zscore: Option<f64>,
        price_a: f64,
        price_b: f64,
    ) -> Transition {
        let Some(z) = zscore else {
            return Transition::Hold;
        };

        match self.position {
            Position::Flat if z < -self.thresholds.entry => {
                self.open(PositionKind::LongAShortB, date, price_a, price_b)
            }
            Position::Flat if z > self.thresholds.entry => {
                self.open(PositionKind::ShortALongB, date, price_a, price_b)
            }
            Position::Open(open) if z.abs() < self.thresholds.exit => {
                Transition::Closed(self.close(open, date, price_a, price_b))
            }
            _ => Transition::Hold,
        }
    }

    /// Stop consuming input and hand over the ledger.
    pub fn finish(
        mut self,
        policy: EndOfDataPolicy,
        last_date: NaiveDate,
        last_price_a: f64,
        last_price_b: f64,
    ) -> Settlement {
        let open_position = match (self.position, policy) {
            (Position::Flat, _) => None,
            (Position::Open(open), EndOfDataPolicy::ForceClose) => {
                tracing::debug!(entry_date = %open.entry_date, "force-closing position at end of data");
                self.close(open, last_date, last_price_a, last_price_b);
                None
            }
            (Position::Open(open), EndOfDataPolicy::Drop) => Some(open),
        };

        Settlement {
            ledger: self.ledger,
            open_position,
        }
    }

    fn open(
        &mut self,
        kind: PositionKind,
        date: NaiveDate,
        price_a: f64,
        price_b: f64,
    ) -> Transition {
        self.position = Position::Open(OpenPosition {
            kind,
            entry_date: date,
            entry_price_a: price_a,
            entry_price_b: price_b,
        });
        Transition::Opened(kind)
    }

    fn close(&mut self, open: OpenPosition, date: NaiveDate, price_a: f64, price_b: f64) -> Trade {
        let trade = open.close(date, price_a, price_b);
        self.ledger.record(trade);
        self.position = Position::Flat;
        trade
    }
}
