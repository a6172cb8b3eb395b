//! Port trait definitions.

pub mod cointegration_port;
pub mod config_port;
pub mod data_port;
pub mod report_port;
