//! Markdown sections of the backtest report.

use crate::domain::backtest::BacktestConfig;
use crate::domain::metrics::PerformanceSummary;
use crate::domain::signals::MomentumConfig;

pub fn format_pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn render_strategy_definition(backtest: &BacktestConfig, momentum: &MomentumConfig) -> String {
    [
        "## Strategy Definition".to_string(),
        "- Universe: CSI 300 (mock provider placeholder)".to_string(),
        format!("- Selection: top {} by score, equal weight", backtest.top_n),
        format!(
            "- Signal: `score = {}` computed at the signal day close",
            momentum.formula()
        ),
        "- Rebalance: weekly, executed at the next trading day open".to_string(),
        format!(
            "- Costs: buy={}, sell={}",
            backtest.buy_cost_rate, backtest.sell_cost_rate
        ),
    ]
    .join("\n")
}

pub fn render_metrics(summary: &PerformanceSummary) -> String {
    [
        "## Backtest Metrics".to_string(),
        format!("- Total return: {}", format_pct(summary.total_return)),
        format!("- Annualized return: {}", format_pct(summary.annualized_return)),
        format!(
            "- Annualized volatility: {}",
            format_pct(summary.annualized_volatility)
        ),
        format!("- Sharpe: {:.4}", summary.sharpe),
        format!("- Current drawdown: {}", format_pct(summary.drawdown)),
        format!("- Max drawdown: {}", format_pct(summary.max_drawdown)),
        format!("- Average turnover: {}", format_pct(summary.average_turnover)),
        format!("- Cost ratio: {}", format_pct(summary.cost_ratio)),
        format!("- Rebalance periods: {}", summary.total_periods),
    ]
    .join("\n")
}

pub fn render_lookahead_check() -> String {
    [
        "## Lookahead Check",
        "- Signal date: t (after the close)",
        "- Trade date: t+1 (next trading day open)",
        "- The backtest engine enforces this ordering",
    ]
    .join("\n")
}
