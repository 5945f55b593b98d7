//! Daily price rows and their scored form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One raw daily row as returned by a data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub symbol: String,
    pub open: f64,
    pub close: f64,
    pub in_universe: u8,
}

/// One symbol on one trading day with its momentum score.
///
/// `open` is `None` when the row carries no opening price. A zero or negative
/// open is kept as-is and treated as not tradable.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredObservation {
    pub date: NaiveDate,
    pub symbol: String,
    pub open: Option<f64>,
    pub close: f64,
    pub score: f64,
    /// Per-window momentum values, in configured window order.
    pub momentum: Vec<f64>,
}

impl ScoredObservation {
    /// Opening price usable for execution: present and strictly positive.
    pub fn tradable_open(&self) -> Option<f64> {
        self.open.filter(|&open| open > 0.0)
    }
}
