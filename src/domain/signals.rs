//! Momentum score computation.
//!
//! mom(w)[i] = C[i] / C[i-w] - 1, or 0 during warmup or when C[i-w] == 0.
//! score[i]  = sum_k weight[k] * mom(window[k])[i]

use std::collections::BTreeMap;

use crate::domain::error::MomentumError;
use crate::domain::observation::{PriceBar, ScoredObservation};

/// Lookback windows (trading days) paired with their score weights.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentumConfig {
    windows: Vec<usize>,
    weights: Vec<f64>,
}

impl MomentumConfig {
    pub fn new(windows: Vec<usize>, weights: Vec<f64>) -> Result<Self, MomentumError> {
        if windows.len() != weights.len() {
            return Err(MomentumError::config_invalid(
                "strategy",
                "weights",
                format!(
                    "mom_windows and weights length mismatch ({} vs {})",
                    windows.len(),
                    weights.len()
                ),
            ));
        }
        if windows.is_empty() {
            return Err(MomentumError::config_invalid(
                "strategy",
                "mom_windows",
                "at least one window is required",
            ));
        }
        if windows.contains(&0) {
            return Err(MomentumError::config_invalid(
                "strategy",
                "mom_windows",
                "windows must be positive",
            ));
        }
        Ok(Self { windows, weights })
    }

    pub fn windows(&self) -> &[usize] {
        &self.windows
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Human-readable score formula, e.g. `0.5 * mom60 + 0.5 * mom120`.
    pub fn formula(&self) -> String {
        self.windows
            .iter()
            .zip(&self.weights)
            .map(|(w, k)| format!("{} * mom{}", k, w))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

pub fn pct_change(closes: &[f64], index: usize, window: usize) -> f64 {
    if index < window {
        return 0.0;
    }
    let base = closes[index - window];
    if base == 0.0 {
        0.0
    } else {
        closes[index] / base - 1.0
    }
}

/// Scores every bar, returning observations sorted by (date, symbol).
pub fn compute_scores(bars: &[PriceBar], config: &MomentumConfig) -> Vec<ScoredObservation> {
    let mut by_symbol: BTreeMap<&str, Vec<&PriceBar>> = BTreeMap::new();
    for bar in bars {
        by_symbol.entry(bar.symbol.as_str()).or_default().push(bar);
    }

    let mut scored = Vec::with_capacity(bars.len());
    for (_, mut series) in by_symbol {
        series.sort_by_key(|bar| bar.date);
        let closes: Vec<f64> = series.iter().map(|bar| bar.close).collect();

        for (i, bar) in series.iter().enumerate() {
            let momentum: Vec<f64> = config
                .windows
                .iter()
                .map(|&w| pct_change(&closes, i, w))
                .collect();
            let score = momentum
                .iter()
                .zip(&config.weights)
                .map(|(m, k)| k * m)
                .sum::<f64>();

            scored.push(ScoredObservation {
                date: bar.date,
                symbol: bar.symbol.clone(),
                open: Some(bar.open),
                close: bar.close,
                score,
                momentum,
            });
        }
    }

    scored.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.symbol.cmp(&b.symbol)));
    scored
}
