//! backtally: indicator-vote trading strategy backtester.
//!
//! Hexagonal architecture: engine logic in [`domain`], port traits in [`ports`],
//! file-based implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
pub mod logging;
