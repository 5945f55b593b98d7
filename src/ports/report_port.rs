//! Report generation port trait.

use std::path::{Path, PathBuf};

use crate::domain::backtest::{BacktestConfig, PeriodRecord};
use crate::domain::error::MomentumError;
use crate::domain::metrics::PerformanceSummary;
use crate::domain::signals::MomentumConfig;

/// Everything a report renders.
pub struct ReportInput<'a> {
    pub title: &'a str,
    pub periods: &'a [PeriodRecord],
    pub summary: &'a PerformanceSummary,
    pub backtest: &'a BacktestConfig,
    pub momentum: &'a MomentumConfig,
}

/// Port for writing backtest reports.
pub trait ReportPort {
    /// Writes the report into `output_dir`, returning the main file's path.
    fn write(&self, input: &ReportInput<'_>, output_dir: &Path) -> Result<PathBuf, MomentumError>;
}
