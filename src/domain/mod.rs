//! Core domain types and logic.

pub mod backtest;
pub mod cointegration;
pub mod config_validation;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod position;
pub mod price_series;
pub mod signal;
pub mod state_machine;
