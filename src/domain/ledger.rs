//! Append-only record of closed trades.

use super::position::Trade;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradeLedger {
    trades: Vec<Trade>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    /// Trades in the order they closed.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn returns(&self) -> Vec<f64> {
        self.trades.iter().map(|t| t.ret).collect()
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }
}
