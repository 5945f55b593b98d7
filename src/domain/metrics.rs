//! Performance summary over the finalized period records.

use serde::{Deserialize, Serialize};

use super::backtest::PeriodRecord;
use super::error::MomentumError;

/// Volatility at or below this is treated as zero when computing Sharpe.
const VOLATILITY_EPSILON: f64 = 1e-12;

/// One `metric,value` row of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub metric: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe: f64,
    /// Drawdown of the last period.
    pub drawdown: f64,
    pub max_drawdown: f64,
    pub average_turnover: f64,
    pub cost_ratio: f64,
    pub total_periods: usize,
}

impl PerformanceSummary {
    /// Summarizes records already ordered and stamped with drawdowns.
    ///
    /// Annualization counts trading days: the exponent is
    /// `trading_days_per_year / total_hold_days`. Sharpe assumes a zero
    /// risk-free rate and is 0 when volatility is negligible; cost ratio is 0
    /// when nothing was traded.
    pub fn compute(
        records: &[PeriodRecord],
        initial_nav: f64,
        trading_days_per_year: u32,
    ) -> Result<Self, MomentumError> {
        let last = records.last().ok_or(MomentumError::EmptyResult)?;
        let periods = records.len() as f64;
        let days_per_year = f64::from(trading_days_per_year);

        let total_return = last.nav / initial_nav - 1.0;
        let total_hold_days: f64 = records.iter().map(|r| r.hold_days as f64).sum();
        let annualized_return =
            (1.0 + total_return).powf(days_per_year / total_hold_days.max(1.0)) - 1.0;

        let avg_hold_days = total_hold_days / periods;
        let periods_per_year = days_per_year / avg_hold_days.max(1.0);
        let net_returns: Vec<f64> = records.iter().map(|r| r.net_return).collect();
        let annualized_volatility = population_stddev(&net_returns) * periods_per_year.sqrt();

        let sharpe = if annualized_volatility > VOLATILITY_EPSILON {
            annualized_return / annualized_volatility
        } else {
            0.0
        };

        let max_drawdown = records
            .iter()
            .map(|r| r.drawdown)
            .fold(f64::INFINITY, f64::min);

        let total_turnover: f64 = records.iter().map(|r| r.turnover).sum();
        let total_cost: f64 = records.iter().map(|r| r.trading_cost).sum();
        let cost_ratio = if total_turnover > 0.0 {
            total_cost / total_turnover
        } else {
            0.0
        };

        Ok(PerformanceSummary {
            total_return,
            annualized_return,
            annualized_volatility,
            sharpe,
            drawdown: last.drawdown,
            max_drawdown,
            average_turnover: total_turnover / periods,
            cost_ratio,
            total_periods: records.len(),
        })
    }

    /// The nine summary rows, in report order.
    pub fn to_records(&self) -> Vec<MetricRecord> {
        [
            ("total_return", self.total_return),
            ("annualized_return", self.annualized_return),
            ("annualized_volatility", self.annualized_volatility),
            ("sharpe", self.sharpe),
            ("drawdown", self.drawdown),
            ("max_drawdown", self.max_drawdown),
            ("average_turnover", self.average_turnover),
            ("cost_ratio", self.cost_ratio),
            ("total_periods", self.total_periods as f64),
        ]
        .into_iter()
        .map(|(metric, value)| MetricRecord {
            metric: metric.to_string(),
            value,
        })
        .collect()
    }

    /// Rebuilds a summary from stored rows; unknown names are ignored and
    /// missing ones read as zero.
    pub fn from_records(records: &[MetricRecord]) -> Self {
        let get = |name: &str| {
            records
                .iter()
                .find(|r| r.metric == name)
                .map(|r| r.value)
                .unwrap_or(0.0)
        };
        PerformanceSummary {
            total_return: get("total_return"),
            annualized_return: get("annualized_return"),
            annualized_volatility: get("annualized_volatility"),
            sharpe: get("sharpe"),
            drawdown: get("drawdown"),
            max_drawdown: get("max_drawdown"),
            average_turnover: get("average_turnover"),
            cost_ratio: get("cost_ratio"),
            total_periods: get("total_periods").max(0.0) as usize,
        }
    }
}

fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
