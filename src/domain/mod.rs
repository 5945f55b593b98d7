//! Core domain types and logic.

pub mod backtest;
pub mod calendar;
pub mod config_validation;
pub mod drawdown;
pub mod error;
pub mod metrics;
pub mod observation;
pub mod ranking;
pub mod signals;
pub mod transition;
