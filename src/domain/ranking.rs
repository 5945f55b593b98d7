//! Cross-sectional ranking and tradability filtering.

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::error::MomentumError;
use crate::domain::observation::ScoredObservation;

/// All observations of one trading day.
#[derive(Debug, Default)]
struct DayRows<'a> {
    rows: Vec<&'a ScoredObservation>,
    by_symbol: HashMap<&'a str, usize>,
}

/// Observations grouped by date with per-symbol lookup.
#[derive(Debug, Default)]
pub struct CrossSections<'a> {
    by_date: HashMap<NaiveDate, DayRows<'a>>,
}

impl<'a> CrossSections<'a> {
    /// Groups observations by date. Two rows for the same (date, symbol)
    /// are rejected rather than letting one overwrite the other.
    pub fn build(observations: &'a [ScoredObservation]) -> Result<Self, MomentumError> {
        let mut by_date: HashMap<NaiveDate, DayRows<'a>> = HashMap::new();

        for obs in observations {
            let day = by_date.entry(obs.date).or_default();
            if day.by_symbol.contains_key(obs.symbol.as_str()) {
                return Err(MomentumError::DuplicateObservation {
                    date: obs.date,
                    symbol: obs.symbol.clone(),
                });
            }
            day.by_symbol.insert(obs.symbol.as_str(), day.rows.len());
            day.rows.push(obs);
        }

        Ok(Self { by_date })
    }

    pub fn on(&self, date: NaiveDate) -> &[&'a ScoredObservation] {
        self.by_date
            .get(&date)
            .map(|day| day.rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn get(&self, date: NaiveDate, symbol: &str) -> Option<&'a ScoredObservation> {
        let day = self.by_date.get(&date)?;
        day.by_symbol.get(symbol).map(|&i| day.rows[i])
    }
}

/// Descending score, then ascending symbol. NaN scores rank last.
fn compare_rank(a: &ScoredObservation, b: &ScoredObservation) -> Ordering {
    let key = |score: f64| if score.is_nan() { f64::NEG_INFINITY } else { score };
    key(b.score)
        .total_cmp(&key(a.score))
        .then_with(|| a.symbol.cmp(&b.symbol))
}

/// Ranks one day's observations and returns at most `top_n` symbols.
pub fn rank_top_n<'a>(rows: &[&'a ScoredObservation], top_n: usize) -> Vec<&'a str> {
    let mut ranked: Vec<&'a ScoredObservation> = rows.to_vec();
    ranked.sort_by(|a, b| compare_rank(a, b));
    ranked
        .into_iter()
        .take(top_n)
        .map(|obs| obs.symbol.as_str())
        .collect()
}

/// A selected symbol with valid entry and exit opening prices.
#[derive(Debug, Clone, PartialEq)]
pub struct TradableLeg {
    pub symbol: String,
    pub open: f64,
    pub next_open: f64,
}

impl TradableLeg {
    pub fn period_return(&self) -> f64 {
        self.next_open / self.open - 1.0
    }
}

/// Keeps candidates with a positive open on both execution dates, in
/// candidate order. Dropped slots are not backfilled.
pub fn filter_tradable(
    candidates: &[&str],
    sections: &CrossSections<'_>,
    trade_date: NaiveDate,
    next_trade_date: NaiveDate,
) -> Vec<TradableLeg> {
    candidates
        .iter()
        .filter_map(|&symbol| {
            let open = sections.get(trade_date, symbol)?.tradable_open()?;
            let next_open = sections.get(next_trade_date, symbol)?.tradable_open()?;
            Some(TradableLeg {
                symbol: symbol.to_string(),
                open,
                next_open,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn obs(day: u32, symbol: &str, open: Option<f64>, score: f64) -> ScoredObservation {
        ScoredObservation {
            date: d(day),
            symbol: symbol.into(),
            open,
            close: open.unwrap_or(1.0),
            score,
            momentum: vec![],
        }
    }

    #[test]
    fn build_rejects_duplicate_symbol_date() {
        let rows = vec![obs(5, "A", Some(1.0), 0.1), obs(5, "A", Some(2.0), 0.2)];
        let err = CrossSections::build(&rows).unwrap_err();
        assert!(matches!(err, MomentumError::DuplicateObservation { symbol, .. } if symbol == "A"));
    }

    #[test]
    fn lookup_by_date_and_symbol() {
        let rows = vec![obs(5, "A", Some(1.0), 0.1), obs(8, "A", Some(2.0), 0.2)];
        let sections = CrossSections::build(&rows).unwrap();
        assert_eq!(sections.get(d(8), "A").unwrap().open, Some(2.0));
        assert!(sections.get(d(9), "A").is_none());
        assert!(sections.on(d(9)).is_empty());
    }

    #[test]
    fn rank_orders_by_descending_score() {
        let rows = vec![
            obs(5, "A", Some(1.0), 0.1),
            obs(5, "B", Some(1.0), 0.3),
            obs(5, "C", Some(1.0), 0.2),
        ];
        let refs: Vec<&ScoredObservation> = rows.iter().collect();
        assert_eq!(rank_top_n(&refs, 2), vec!["B", "C"]);
    }

    #[test]
    fn rank_breaks_ties_by_symbol_regardless_of_input_order() {
        let rows = vec![
            obs(5, "C", Some(1.0), 0.5),
            obs(5, "A", Some(1.0), 0.5),
            obs(5, "B", Some(1.0), 0.5),
        ];
        let refs: Vec<&ScoredObservation> = rows.iter().collect();
        assert_eq!(rank_top_n(&refs, 3), vec!["A", "B", "C"]);

        let reversed: Vec<&ScoredObservation> = rows.iter().rev().collect();
        assert_eq!(rank_top_n(&reversed, 3), vec!["A", "B", "C"]);
    }

    #[test]
    fn rank_returns_all_when_fewer_than_top_n() {
        let rows = vec![obs(5, "A", Some(1.0), 0.1)];
        let refs: Vec<&ScoredObservation> = rows.iter().collect();
        assert_eq!(rank_top_n(&refs, 10), vec!["A"]);
    }

    #[test]
    fn rank_puts_nan_scores_last() {
        let rows = vec![obs(5, "A", Some(1.0), f64::NAN), obs(5, "B", Some(1.0), -5.0)];
        let refs: Vec<&ScoredObservation> = rows.iter().collect();
        assert_eq!(rank_top_n(&refs, 2), vec!["B", "A"]);
    }

    #[test]
    fn filter_drops_missing_and_non_positive_opens() {
        let rows = vec![
            obs(8, "A", Some(10.0), 0.0),
            obs(15, "A", Some(11.0), 0.0),
            // B missing on exit date
            obs(8, "B", Some(10.0), 0.0),
            // C zero open on entry date
            obs(8, "C", Some(0.0), 0.0),
            obs(15, "C", Some(12.0), 0.0),
            // D absent open on exit date
            obs(8, "D", Some(10.0), 0.0),
            obs(15, "D", None, 0.0),
        ];
        let sections = CrossSections::build(&rows).unwrap();
        let legs = filter_tradable(&["A", "B", "C", "D"], &sections, d(8), d(15));

        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].symbol, "A");
        assert!((legs[0].period_return() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn filter_keeps_candidate_order() {
        let rows = vec![
            obs(8, "A", Some(1.0), 0.0),
            obs(15, "A", Some(1.0), 0.0),
            obs(8, "B", Some(1.0), 0.0),
            obs(15, "B", Some(1.0), 0.0),
        ];
        let sections = CrossSections::build(&rows).unwrap();
        let legs = filter_tradable(&["B", "A"], &sections, d(8), d(15));
        let symbols: Vec<&str> = legs.iter().map(|l| l.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["B", "A"]);
    }
}
