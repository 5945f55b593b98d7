//! Weekly top-N momentum backtest.
//!
//! Pipeline: calendar and schedule, then for every consecutive anchor pair
//! rank the signal day, filter tradable candidates, transition the
//! portfolio, and finally stamp drawdowns and summarize.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::{REBALANCE_WEEKDAY, RebalancePeriod, RebalanceSchedule, TradingCalendar};
use super::error::MomentumError;
use super::metrics::{MetricRecord, PerformanceSummary};
use super::observation::ScoredObservation;
use super::ranking::{CrossSections, filter_tradable, rank_top_n};
use super::drawdown::stamp_drawdowns;
use super::transition::{CostModel, PeriodOutcome, TransitionState, transition};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub top_n: usize,
    pub buy_cost_rate: f64,
    pub sell_cost_rate: f64,
    pub initial_nav: f64,
    pub trading_days_per_year: u32,
}

impl BacktestConfig {
    pub fn cost_model(&self) -> CostModel {
        CostModel {
            buy_cost_rate: self.buy_cost_rate,
            sell_cost_rate: self.sell_cost_rate,
        }
    }
}

/// One executed rebalance-to-rebalance period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub signal_date: NaiveDate,
    pub trade_date: NaiveDate,
    pub next_trade_date: NaiveDate,
    pub hold_days: usize,
    pub gross_return: f64,
    pub turnover: f64,
    pub buy_turnover: f64,
    pub sell_turnover: f64,
    pub trading_cost: f64,
    pub net_return: f64,
    pub nav: f64,
    pub cummax_nav: f64,
    pub drawdown: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub periods: Vec<PeriodRecord>,
    pub summary: PerformanceSummary,
    /// Anchor pairs whose tradable set was empty.
    pub skipped_periods: usize,
}

impl BacktestResult {
    pub fn metric_records(&self) -> Vec<MetricRecord> {
        self.summary.to_records()
    }
}

struct Accumulator {
    state: TransitionState,
    records: Vec<PeriodRecord>,
    skipped: usize,
}

/// Runs the backtest over scored observations.
///
/// Fails with `DuplicateObservation` on repeated (date, symbol) rows,
/// `InsufficientSchedule` with fewer than two anchors, and `EmptyResult`
/// when no period had a tradable symbol.
pub fn run_backtest(
    observations: &[ScoredObservation],
    config: &BacktestConfig,
) -> Result<BacktestResult, MomentumError> {
    let sections = CrossSections::build(observations)?;
    let calendar = TradingCalendar::from_observations(observations);
    let schedule = RebalanceSchedule::build(&calendar, REBALANCE_WEEKDAY)?;
    let costs = config.cost_model();

    tracing::info!(
        trading_days = calendar.len(),
        anchors = schedule.len(),
        top_n = config.top_n,
        "running weekly momentum backtest"
    );

    let start = Accumulator {
        state: TransitionState::initial(config.initial_nav),
        records: Vec::with_capacity(schedule.len().saturating_sub(1)),
        skipped: 0,
    };

    let finished = schedule.periods().fold(start, |mut acc, period| {
        let candidates = rank_top_n(sections.on(period.current.signal_date), config.top_n);
        let legs = filter_tradable(
            &candidates,
            &sections,
            period.current.trade_date,
            period.next.trade_date,
        );

        if legs.is_empty() {
            tracing::debug!(
                signal_date = %period.current.signal_date,
                candidates = candidates.len(),
                "no tradable symbols, period skipped"
            );
            acc.skipped += 1;
            return acc;
        }
        if legs.len() < candidates.len() {
            tracing::debug!(
                signal_date = %period.current.signal_date,
                dropped = candidates.len() - legs.len(),
                "untradable candidates dropped"
            );
        }

        let (state, outcome) = transition(acc.state, &legs, &costs);
        acc.state = state;
        acc.records.push(period_record(&period, &outcome));
        acc
    });

    let mut periods = finished.records;
    if periods.is_empty() {
        return Err(MomentumError::EmptyResult);
    }
    if finished.skipped > 0 {
        tracing::warn!(skipped = finished.skipped, "rebalance periods without tradable symbols");
    }

    stamp_drawdowns(&mut periods);
    let summary = PerformanceSummary::compute(
        &periods,
        config.initial_nav,
        config.trading_days_per_year,
    )?;

    Ok(BacktestResult {
        periods,
        summary,
        skipped_periods: finished.skipped,
    })
}

fn period_record(
    period: &RebalancePeriod,
    outcome: &PeriodOutcome,
) -> PeriodRecord {
    PeriodRecord {
        signal_date: period.current.signal_date,
        trade_date: period.current.trade_date,
        next_trade_date: period.next.trade_date,
        hold_days: period.hold_days(),
        gross_return: outcome.gross_return,
        turnover: outcome.turnover.total,
        buy_turnover: outcome.turnover.buy,
        sell_turnover: outcome.turnover.sell,
        trading_cost: outcome.trading_cost,
        net_return: outcome.net_return,
        nav: outcome.nav,
        cummax_nav: 0.0,
        drawdown: 0.0,
    }
}
