#![allow(dead_code)]

use chrono::{Datelike, Days, NaiveDate, Weekday};
use momentum_weekly::domain::backtest::BacktestConfig;
use momentum_weekly::domain::error::MomentumError;
use momentum_weekly::domain::observation::{PriceBar, ScoredObservation};
use momentum_weekly::ports::data_port::DataPort;
use std::cell::RefCell;
use std::io::Write;
use std::path::Path;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Monday to Friday for `weeks` weeks starting at Monday 2024-01-01.
pub fn weekdays(weeks: usize) -> Vec<NaiveDate> {
    let start = date(2024, 1, 1);
    (0..weeks * 7)
        .map(|i| start.checked_add_days(Days::new(i as u64)).unwrap())
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

pub fn obs(date: NaiveDate, symbol: &str, open: f64, score: f64) -> ScoredObservation {
    ScoredObservation {
        date,
        symbol: symbol.to_string(),
        open: Some(open),
        close: open,
        score,
        momentum: vec![score],
    }
}

/// One row per (day, symbol), with open and score taken in order from
/// `values`, cycling when exhausted.
pub fn grid(days: &[NaiveDate], symbols: &[&str], values: &[(f64, f64)]) -> Vec<ScoredObservation> {
    let mut rows = Vec::with_capacity(days.len() * symbols.len());
    let mut i = 0;
    for &day in days {
        for symbol in symbols {
            let (open, score) = values[i % values.len()];
            rows.push(obs(day, symbol, open, score));
            i += 1;
        }
    }
    rows
}

/// Deterministic trending grid: symbol k drifts by `k` percent a day and
/// scores by its index, so rankings are stable week to week.
pub fn trending_grid(weeks: usize, symbols: &[&str]) -> Vec<ScoredObservation> {
    let days = weekdays(weeks);
    let mut rows = Vec::new();
    for (t, &day) in days.iter().enumerate() {
        for (k, symbol) in symbols.iter().enumerate() {
            let drift = 1.0 + 0.01 * (k as f64 - 1.0);
            let open = 100.0 * drift.powi(t as i32) * if t % 3 == 0 { 0.99 } else { 1.0 };
            let score = ((k + t / 5) % symbols.len()) as f64;
            rows.push(obs(day, symbol, open, score));
        }
    }
    rows
}

pub fn config(top_n: usize, buy: f64, sell: f64) -> BacktestConfig {
    BacktestConfig {
        top_n,
        buy_cost_rate: buy,
        sell_cost_rate: sell,
        initial_nav: 1.0,
        trading_days_per_year: 252,
    }
}

pub fn free_config(top_n: usize) -> BacktestConfig {
    config(top_n, 0.0, 0.0)
}

/// In-memory provider that records every price request.
pub struct MockDataPort {
    pub symbols: Vec<String>,
    pub requests: RefCell<Vec<Vec<String>>>,
}

impl MockDataPort {
    pub fn new(symbols: &[&str]) -> Self {
        Self {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl DataPort for MockDataPort {
    fn name(&self) -> &str {
        "test"
    }

    fn get_universe(&self, num_stocks: usize) -> Result<Vec<String>, MomentumError> {
        Ok(self.symbols.iter().take(num_stocks).cloned().collect())
    }

    fn get_price_data(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomentumError> {
        self.requests.borrow_mut().push(symbols.to_vec());
        let mut rows = Vec::new();
        for symbol in symbols {
            let mut day = start_date;
            let mut price = 10.0;
            while day <= end_date {
                if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                    rows.push(PriceBar {
                        date: day,
                        symbol: symbol.clone(),
                        open: price,
                        close: price * 1.001,
                        in_universe: 1,
                    });
                    price *= 1.002;
                }
                day = day.checked_add_days(Days::new(1)).unwrap();
            }
        }
        Ok(rows)
    }
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A complete config whose output directories live under `root`.
pub fn pipeline_ini(root: &Path, provider: &str) -> String {
    let dir = |name: &str| root.join(name).display().to_string();
    format!(
        r#"
[project]
seed = 42

[data]
provider = {provider}
num_stocks = 6
start_date = 2023-01-02
end_date = 2023-06-30
fetch_chunk_size = 4
trading_days_per_year = 252
raw_dir = {raw}
prepared_dir = {prepared}

[strategy]
top_n = 3
mom_windows = 5,20
weights = 0.5,0.5

[backtest]
buy_cost = 0.0008
sell_cost = 0.0018
initial_nav = 1.0
result_dir = {results}

[report]
title = Test Momentum Report
report_dir = {reports}
"#,
        raw = dir("raw"),
        prepared = dir("prepared"),
        results = dir("results"),
        reports = dir("reports"),
    )
}
