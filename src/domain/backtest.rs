//! Backtest run over one aligned price pair.
//!
//! prices -> signal -> state machine -> (ledger, summary). The scan starts at
//! the second timestamp and walks the index strictly in order.

use super::error::PairtraderError;
use super::metrics::{equity_curve, PerformanceSummary, TRADING_DAYS_PER_YEAR};
use super::position::{OpenPosition, Trade};
use super::price_series::PricePair;
use super::signal::{generate_signal, SignalMode, SignalSeries};
use super::state_machine::{EndOfDataPolicy, PositionStateMachine, Thresholds, Transition};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub thresholds: Thresholds,
    pub signal_mode: SignalMode,
    pub annualization_factor: u32,
    pub force_close_at_end: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            thresholds: Thresholds::default(),
            signal_mode: SignalMode::FullSample,
            annualization_factor: TRADING_DAYS_PER_YEAR,
            force_close_at_end: false,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), PairtraderError> {
        if self.annualization_factor == 0 {
            return Err(PairtraderError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "annualization_factor".to_string(),
                reason: "annualization_factor must be positive".to_string(),
            });
        }
        if matches!(self.signal_mode, SignalMode::Rolling(window) if window < 2) {
            return Err(PairtraderError::ConfigInvalid {
                section: "signal".to_string(),
                key: "window".to_string(),
                reason: "rolling window must be at least 2".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub signal: SignalSeries,
    pub trades: Vec<Trade>,
    /// Position still open at end of data, excluded from `trades` and `summary`.
    pub open_position: Option<OpenPosition>,
    pub summary: PerformanceSummary,
    pub equity_curve: Vec<f64>,
}

pub fn run_backtest(
    pair: &PricePair,
    config: &BacktestConfig,
) -> Result<BacktestResult, PairtraderError> {
    config.validate()?;
    let signal = generate_signal(pair, config.signal_mode)?;

    let mut machine = PositionStateMachine::new(config.thresholds);
    for t in 1..pair.len() {
        let date = pair.date(t);
        match machine.step(date, signal.zscore(t), pair.price_a(t), pair.price_b(t)) {
            Transition::Opened(kind) => {
                tracing::debug!(%date, ?kind, zscore = signal.points[t].zscore, "opened position");
            }
            Transition::Closed(trade) => {
                tracing::debug!(%date, ret = trade.ret, "closed position");
            }
            Transition::Hold => {}
        }
    }

    let last = pair.len() - 1;
    let settlement = machine.finish(
        EndOfDataPolicy::from_force_close(config.force_close_at_end),
        pair.date(last),
        pair.price_a(last),
        pair.price_b(last),
    );

    if let Some(open) = &settlement.open_position {
        tracing::warn!(
            entry_date = %open.entry_date,
            unrealized = open.unrealized_return(pair.price_a(last), pair.price_b(last)),
            "position still open at end of data; excluded from results"
        );
    }

    let trades = settlement.ledger.into_trades();
    let summary = PerformanceSummary::compute(&trades, config.annualization_factor);
    let returns: Vec<f64> = trades.iter().map(|t| t.ret).collect();

    Ok(BacktestResult {
        signal,
        equity_curve: equity_curve(&returns),
        trades,
        open_position: settlement.open_position,
        summary,
    })
}
