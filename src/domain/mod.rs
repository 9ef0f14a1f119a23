//! Core engine types and logic.

pub mod price;
pub mod indicator;
pub mod frame;
pub mod factor;
pub mod signal;
pub mod simulator;
pub mod performance;
pub mod backtest;
pub mod universe;
pub mod config_validation;
pub mod error;
