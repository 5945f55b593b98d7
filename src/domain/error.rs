//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for momentum-weekly.
#[derive(Debug, thiserror::Error)]
pub enum MomentumError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unsupported data provider: {provider}")]
    UnsupportedProvider { provider: String },

    #[error("{provider} provider is not implemented yet")]
    ProviderNotImplemented { provider: String },

    #[error("no {what} found in {path}")]
    MissingInput { what: String, path: String },

    #[error("table error in {path}: {reason}")]
    Table { path: String, reason: String },

    #[error("duplicate observation for {symbol} on {date}")]
    DuplicateObservation { date: NaiveDate, symbol: String },

    #[error("not enough weekly rebalance dates to run backtest: found {anchors}, need at least 2")]
    InsufficientSchedule { anchors: usize },

    #[error("backtest result is empty: no rebalance period had a tradable symbol")]
    EmptyResult,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MomentumError {
    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        MomentumError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn table(path: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        MomentumError::Table {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<&MomentumError> for std::process::ExitCode {
    fn from(err: &MomentumError) -> Self {
        let code: u8 = match err {
            MomentumError::Io(_) | MomentumError::Table { .. } => 1,
            MomentumError::ConfigParse { .. }
            | MomentumError::ConfigMissing { .. }
            | MomentumError::ConfigInvalid { .. } => 2,
            MomentumError::UnsupportedProvider { .. }
            | MomentumError::ProviderNotImplemented { .. } => 3,
            MomentumError::MissingInput { .. } => 4,
            MomentumError::DuplicateObservation { .. }
            | MomentumError::InsufficientSchedule { .. }
            | MomentumError::EmptyResult => 5,
        };
        std::process::ExitCode::from(code)
    }
}
