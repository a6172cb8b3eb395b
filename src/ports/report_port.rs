//! Result export port trait.

use crate::domain::error::PairtraderError;
use crate::domain::position::Trade;
use crate::domain::signal::SignalSeries;
use std::path::Path;

/// Port for writing backtest outputs.
pub trait ReportPort {
    fn write_trades(
        &self,
        trades: &[Trade],
        instrument_a: &str,
        instrument_b: &str,
        output_path: &Path,
    ) -> Result<(), PairtraderError>;

    fn write_equity_curve(&self, curve: &[f64], output_path: &Path) -> Result<(), PairtraderError>;

    fn write_signal(&self, signal: &SignalSeries, output_path: &Path) -> Result<(), PairtraderError>;
}
