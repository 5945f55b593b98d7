//! Markdown report with an SVG NAV curve.
//!
//! Writes `report.md` and `nav_curve.svg` side by side; the markdown links
//! the image by file name.

pub mod chart_svg;
pub mod tables;

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::backtest::PeriodRecord;
use crate::domain::error::MomentumError;
use crate::ports::report_port::{ReportInput, ReportPort};

pub const REPORT_FILE: &str = "report.md";
pub const CHART_FILE: &str = "nav_curve.svg";

#[derive(Debug, Default)]
pub struct MarkdownReportAdapter;

impl MarkdownReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// NAV values ordered by trade date.
fn nav_series(periods: &[PeriodRecord]) -> Vec<f64> {
    let mut ordered: Vec<&PeriodRecord> = periods.iter().collect();
    ordered.sort_by_key(|p| p.trade_date);
    ordered.iter().map(|p| p.nav).collect()
}

pub fn render_markdown(input: &ReportInput<'_>, chart_file: &str) -> String {
    let sections = [
        format!("# {}", input.title),
        tables::render_strategy_definition(input.backtest, input.momentum),
        tables::render_metrics(input.summary),
        format!("## NAV Curve\n![NAV curve]({})", chart_file),
        tables::render_lookahead_check(),
    ];
    let mut text = sections.join("\n\n");
    text.push('\n');
    text
}

impl ReportPort for MarkdownReportAdapter {
    fn write(&self, input: &ReportInput<'_>, output_dir: &Path) -> Result<PathBuf, MomentumError> {
        fs::create_dir_all(output_dir)?;

        let chart_path = output_dir.join(CHART_FILE);
        fs::write(&chart_path, chart_svg::render_nav_svg(&nav_series(input.periods)))?;

        let report_path = output_dir.join(REPORT_FILE);
        fs::write(&report_path, render_markdown(input, CHART_FILE))?;

        tracing::info!(
            report = %report_path.display(),
            chart = %chart_path.display(),
            "report written"
        );
        Ok(report_path)
    }
}
