//! Deterministic synthetic market data.
//!
//! Every value derives from a polynomial hash of `"{seed}|{symbol}"`, so the
//! same seed, symbols and date range always produce the same rows.

use crate::domain::error::MomentumError;
use crate::domain::observation::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::{Datelike, Days, NaiveDate, Weekday};

const HASH_BASE: u64 = 131;
const HASH_MODULUS: u64 = 2_147_483_647;
const UNIFORM_MODULUS: u64 = 10_000_019;
const MIN_PRICE: f64 = 0.5;

pub struct MockProvider {
    seed: i64,
}

impl MockProvider {
    pub fn new(seed: i64) -> Self {
        Self { seed }
    }

    fn base_seed(&self, symbol: &str) -> u64 {
        string_hash(&format!("{}|{}", self.seed, symbol))
    }
}

pub fn string_hash(text: &str) -> u64 {
    text.chars()
        .fold(0u64, |total, c| (total * HASH_BASE + u64::from(c)) % HASH_MODULUS)
}

/// Maps a seed into (0, 1).
pub fn uniform(seed: u64) -> f64 {
    ((seed % UNIFORM_MODULUS) + 1) as f64 / (UNIFORM_MODULUS + 1) as f64
}

/// Standard normal via Box-Muller.
pub fn normal(seed_a: u64, seed_b: u64) -> f64 {
    let u1 = uniform(seed_a).max(1e-9);
    let u2 = uniform(seed_b);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Monday to Friday between the two dates, inclusive.
pub fn business_days(start_date: NaiveDate, end_date: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut cursor = start_date;
    while cursor <= end_date {
        if !matches!(cursor.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(cursor);
        }
        match cursor.checked_add_days(Days::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    days
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

impl DataPort for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn get_universe(&self, num_stocks: usize) -> Result<Vec<String>, MomentumError> {
        Ok((0..num_stocks)
            .map(|idx| {
                let suffix = if idx % 2 == 0 { "SH" } else { "SZ" };
                format!("STK{:04}.{}", idx + 1, suffix)
            })
            .collect())
    }

    fn get_price_data(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomentumError> {
        let days = business_days(start_date, end_date);
        let mut rows = Vec::with_capacity(symbols.len() * days.len());

        for symbol in symbols {
            let base = self.base_seed(symbol);
            let drift = 0.00015 + 0.00025 * uniform(base + 17);
            let vol = 0.010 + 0.020 * uniform(base + 31);
            let mut prev_close = 40.0 + 20.0 * uniform(base + 59);

            for (i, &date) in days.iter().enumerate() {
                let i = i as u64;
                let noise = normal(base + 7 * i + 101, base + 11 * i + 203);
                let close = (prev_close * (drift + vol * noise * 0.6).exp()).max(MIN_PRICE);

                let gap = normal(base + 13 * i + 307, base + 17 * i + 401);
                let open = (prev_close * (0.25 * vol * gap).exp()).max(MIN_PRICE);

                rows.push(PriceBar {
                    date,
                    symbol: symbol.clone(),
                    open: round6(open),
                    close: round6(close),
                    in_universe: 1,
                });
                prev_close = close;
            }
        }

        rows.sort_by(|a, b| a.symbol.cmp(&b.symbol).then_with(|| a.date.cmp(&b.date)));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn universe_alternates_exchanges() {
        let universe = MockProvider::new(42).get_universe(4).unwrap();
        assert_eq!(
            universe,
            vec!["STK0001.SH", "STK0002.SZ", "STK0003.SH", "STK0004.SZ"]
        );
    }

    #[test]
    fn string_hash_is_polynomial() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("ab"), 97 * 131 + 98);
    }

    #[test]
    fn uniform_stays_in_unit_interval() {
        assert!(uniform(0) > 0.0);
        assert!(uniform(UNIFORM_MODULUS - 1) < 1.0);
        assert_eq!(uniform(UNIFORM_MODULUS), uniform(0));
    }

    #[test]
    fn business_days_skip_weekends() {
        // 2024-01-05 is a Friday.
        let days = business_days(d(2024, 1, 5), d(2024, 1, 9));
        assert_eq!(days, vec![d(2024, 1, 5), d(2024, 1, 8), d(2024, 1, 9)]);
        assert!(business_days(d(2024, 1, 9), d(2024, 1, 5)).is_empty());
    }

    #[test]
    fn prices_are_deterministic_per_seed() {
        let symbols = vec!["STK0001.SH".to_string(), "STK0002.SZ".to_string()];
        let a = MockProvider::new(42)
            .get_price_data(&symbols, d(2024, 1, 1), d(2024, 3, 1))
            .unwrap();
        let b = MockProvider::new(42)
            .get_price_data(&symbols, d(2024, 1, 1), d(2024, 3, 1))
            .unwrap();
        let c = MockProvider::new(7)
            .get_price_data(&symbols, d(2024, 1, 1), d(2024, 3, 1))
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rows_sorted_by_symbol_then_date_with_positive_prices() {
        let symbols = vec!["STK0002.SZ".to_string(), "STK0001.SH".to_string()];
        let rows = MockProvider::new(1)
            .get_price_data(&symbols, d(2024, 1, 1), d(2024, 1, 31))
            .unwrap();

        assert_eq!(rows.len(), 2 * 23);
        assert!(rows.windows(2).all(|w| (&w[0].symbol, w[0].date) < (&w[1].symbol, w[1].date)));
        assert!(rows.iter().all(|r| r.open >= MIN_PRICE && r.close >= MIN_PRICE));
        assert!(rows.iter().all(|r| r.in_universe == 1));
        assert!(rows
            .iter()
            .all(|r| (r.close * 1e6 - (r.close * 1e6).round()).abs() < 1e-6));
    }
}
