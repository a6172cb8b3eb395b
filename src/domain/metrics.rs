//! Performance metrics over realized trade returns.
//!
//! Returns are per trade, in ledger order. The equity curve is indexed by
//! trade number, not by calendar date.

use super::position::Trade;

pub const TRADING_DAYS_PER_YEAR: u32 = 252;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub trade_count: usize,
    pub total_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    pub avg_return: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub avg_holding_days: f64,
}

impl PerformanceSummary {
    pub fn compute(trades: &[Trade], annualization_factor: u32) -> Self {
        let returns: Vec<f64> = trades.iter().map(|t| t.ret).collect();
        let curve = equity_curve(&returns);

        let trade_count = returns.len();
        let total_return = curve.last().map(|e| e - 1.0).unwrap_or(0.0);
        let sharpe_ratio = sharpe_ratio(&returns, annualization_factor);
        let max_drawdown = max_drawdown(&curve);

        let trades_won = returns.iter().filter(|&&r| r > 0.0).count();
        let trades_lost = returns.iter().filter(|&&r| r < 0.0).count();

        let (win_rate, avg_return, avg_holding_days) = if trade_count > 0 {
            let n = trade_count as f64;
            let total_days: i64 = trades.iter().map(Trade::holding_days).sum();
            (
                trades_won as f64 / n,
                returns.iter().sum::<f64>() / n,
                total_days as f64 / n,
            )
        } else {
            (0.0, 0.0, 0.0)
        };

        let best_trade = returns.iter().copied().reduce(f64::max).unwrap_or(0.0);
        let worst_trade = returns.iter().copied().reduce(f64::min).unwrap_or(0.0);

        PerformanceSummary {
            trade_count,
            total_return,
            sharpe_ratio,
            max_drawdown,
            trades_won,
            trades_lost,
            win_rate,
            avg_return,
            best_trade,
            worst_trade,
            avg_holding_days,
        }
    }
}

/// `curve[i] = prod_{j <= i} (1 + r_j)`
pub fn equity_curve(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0_f64, |equity, r| {
            *equity *= 1.0 + r;
            Some(*equity)
        })
        .collect()
}

/// `mean / stddev * sqrt(factor)` using the population stddev.
///
/// Fewer than two returns, or zero dispersion, yields 0. A stddev within
/// rounding error of the mean counts as zero.
pub fn sharpe_ratio(returns: &[f64], annualization_factor: u32) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > n * f64::EPSILON * mean.abs().max(1.0) {
        mean / stddev * f64::from(annualization_factor).sqrt()
    } else {
        0.0
    }
}

/// Largest `running_max(curve) - curve`, in compounded-return units.
pub fn max_drawdown(curve: &[f64]) -> f64 {
    let Some(&first) = curve.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &equity in curve {
        peak = peak.max(equity);
        max_dd = max_dd.max(peak - equity);
    }
    max_dd
}
