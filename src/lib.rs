//! momentum-weekly: weekly top-N momentum backtest pipeline.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], and the stage driver in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
