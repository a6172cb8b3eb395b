//! CSV export of trades, equity curve and spread signal.

use crate::domain::error::PairtraderError;
use crate::domain::position::Trade;
use crate::domain::signal::SignalSeries;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct TradeRow {
    #[serde(rename = "Entry Date")]
    entry_date: String,
    #[serde(rename = "Exit Date")]
    exit_date: String,
    #[serde(rename = "Position")]
    position: String,
    #[serde(rename = "Return")]
    ret: f64,
}

#[derive(Serialize)]
struct EquityRow {
    #[serde(rename = "Trade")]
    trade: usize,
    #[serde(rename = "Equity")]
    equity: f64,
}

#[derive(Serialize)]
struct SignalRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Spread")]
    spread: f64,
    #[serde(rename = "ZScore")]
    zscore: Option<f64>,
}

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn write_rows<T: Serialize>(
        output_path: &Path,
        rows: impl IntoIterator<Item = T>,
    ) -> Result<(), PairtraderError> {
        let report_err = |e: csv::Error| PairtraderError::Report {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        };

        let mut wtr = csv::Writer::from_path(output_path).map_err(report_err)?;
        for row in rows {
            wtr.serialize(row).map_err(report_err)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_trades(
        &self,
        trades: &[Trade],
        instrument_a: &str,
        instrument_b: &str,
        output_path: &Path,
    ) -> Result<(), PairtraderError> {
        if trades.is_empty() {
            // serialize() emits headers with the first row only
            std::fs::write(output_path, "Entry Date,Exit Date,Position,Return\n")?;
            return Ok(());
        }
        Self::write_rows(
            output_path,
            trades.iter().map(|t| TradeRow {
                entry_date: t.entry_date.to_string(),
                exit_date: t.exit_date.to_string(),
                position: t.kind.label(instrument_a, instrument_b),
                ret: t.ret,
            }),
        )
    }

    fn write_equity_curve(&self, curve: &[f64], output_path: &Path) -> Result<(), PairtraderError> {
        if curve.is_empty() {
            std::fs::write(output_path, "Trade,Equity\n")?;
            return Ok(());
        }
        Self::write_rows(
            output_path,
            curve.iter().enumerate().map(|(i, &equity)| EquityRow {
                trade: i + 1,
                equity,
            }),
        )
    }

    fn write_signal(&self, signal: &SignalSeries, output_path: &Path) -> Result<(), PairtraderError> {
        Self::write_rows(
            output_path,
            signal.points.iter().map(|p| SignalRow {
                date: p.date.to_string(),
                spread: p.spread,
                zscore: p.valid.then_some(p.zscore),
            }),
        )
    }
}
