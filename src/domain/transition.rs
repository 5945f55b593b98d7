//! Portfolio transition between consecutive rebalances.
//!
//! The only state carried across periods is [`TransitionState`]: the weights
//! held after the last executed rebalance and the compounded NAV. Each step
//! consumes the previous state and returns the next one together with the
//! period's outcome, so callers thread it through an ordered fold.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::ranking::TradableLeg;

/// Symbol weights of a long-only portfolio. Empty means no position.
///
/// Backed by a `BTreeMap` so iteration, and therefore float summation order,
/// is identical across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioWeights(BTreeMap<String, f64>);

impl PortfolioWeights {
    pub fn empty() -> Self {
        Self::default()
    }

    /// `1 / n` on each of the `n` distinct symbols.
    pub fn equal_weight<'a, I: IntoIterator<Item = &'a str>>(symbols: I) -> Self {
        let unique: BTreeSet<&str> = symbols.into_iter().collect();
        if unique.is_empty() {
            return Self::empty();
        }
        let weight = 1.0 / unique.len() as f64;
        Self(unique.into_iter().map(|s| (s.to_string(), weight)).collect())
    }

    /// Weight of `symbol`, zero when not held.
    pub fn weight(&self, symbol: &str) -> f64 {
        self.0.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Turnover {
    pub total: f64,
    pub buy: f64,
    pub sell: f64,
}

impl Turnover {
    /// Weight changes over the union of both symbol sets; a symbol missing
    /// from one side counts as weight zero there.
    pub fn between(previous: &PortfolioWeights, target: &PortfolioWeights) -> Self {
        let symbols: BTreeSet<&str> = previous.symbols().chain(target.symbols()).collect();

        symbols.into_iter().fold(Turnover::default(), |mut acc, symbol| {
            let delta = target.weight(symbol) - previous.weight(symbol);
            acc.total += delta.abs();
            if delta > 0.0 {
                acc.buy += delta;
            } else if delta < 0.0 {
                acc.sell += -delta;
            }
            acc
        })
    }
}

/// Flat per-notional costs, charged separately on each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub buy_cost_rate: f64,
    pub sell_cost_rate: f64,
}

impl CostModel {
    pub fn trading_cost(&self, turnover: &Turnover) -> f64 {
        turnover.buy * self.buy_cost_rate + turnover.sell * self.sell_cost_rate
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionState {
    pub weights: PortfolioWeights,
    pub nav: f64,
}

impl TransitionState {
    pub fn initial(initial_nav: f64) -> Self {
        Self {
            weights: PortfolioWeights::empty(),
            nav: initial_nav,
        }
    }
}

/// Realized result of one executed rebalance period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodOutcome {
    pub gross_return: f64,
    pub turnover: Turnover,
    pub trading_cost: f64,
    pub net_return: f64,
    pub nav: f64,
}

/// Moves from `state` into an equal-weight portfolio over `legs`.
///
/// Return accrues only to the new portfolio, from entry open to next entry
/// open. `legs` must be non-empty; an empty tradable set is a skipped period
/// and the caller keeps `state` untouched.
pub fn transition(
    state: TransitionState,
    legs: &[TradableLeg],
    costs: &CostModel,
) -> (TransitionState, PeriodOutcome) {
    debug_assert!(!legs.is_empty(), "transition requires at least one tradable leg");

    let target = PortfolioWeights::equal_weight(legs.iter().map(|leg| leg.symbol.as_str()));
    let gross_return: f64 = legs
        .iter()
        .map(|leg| target.weight(&leg.symbol) * leg.period_return())
        .sum();

    let turnover = Turnover::between(&state.weights, &target);
    let trading_cost = costs.trading_cost(&turnover);
    let net_return = gross_return - trading_cost;
    let nav = state.nav * (1.0 + net_return);

    let outcome = PeriodOutcome {
        gross_return,
        turnover,
        trading_cost,
        net_return,
        nav,
    };

    (
        TransitionState {
            weights: target,
            nav,
        },
        outcome,
    )
}
