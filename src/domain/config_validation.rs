//! Configuration validation.
//!
//! Validates every pipeline config field before any stage touches data.

use crate::domain::error::MomentumError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const SUPPORTED_PROVIDERS: [&str; 3] = ["mock", "tushare", "joinquant"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    validate_data_config(config)?;
    validate_strategy_config(config)?;
    validate_backtest_config(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    validate_provider(config)?;
    parse_count(config, "data", "num_stocks", 300)?;
    parse_count(config, "data", "fetch_chunk_size", 50)?;
    let days = validate_positive_int(config, "data", "trading_days_per_year", 252)?;
    u32::try_from(days).map_err(|_| {
        MomentumError::config_invalid(
            "data",
            "trading_days_per_year",
            "trading_days_per_year is out of range",
        )
    })?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    parse_count(config, "strategy", "top_n", 10)?;
    validate_momentum_lists(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    validate_cost(config, "buy_cost", 0.0008)?;
    validate_cost(config, "sell_cost", 0.0018)?;
    validate_initial_nav(config)?;
    Ok(())
}

fn validate_provider(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    let provider = config
        .get_string("data", "provider")
        .unwrap_or_else(|| "mock".to_string())
        .to_lowercase();
    if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
        return Err(MomentumError::UnsupportedProvider { provider });
    }
    Ok(())
}

/// Reads an integer key. A present value that does not parse is
/// `ConfigInvalid`; an absent one yields `default`.
pub fn parse_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, MomentumError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
            MomentumError::config_invalid(section, key, format!("{} must be an integer", key))
        }),
    }
}

/// Reads a floating point key with the same rules as [`parse_int`].
pub fn parse_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, MomentumError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
            MomentumError::config_invalid(section, key, format!("{} must be a number", key))
        }),
    }
}

/// Reads a key that must be a positive integer and converts it to `usize`.
pub fn parse_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<usize, MomentumError> {
    let value = validate_positive_int(config, section, key, default)?;
    usize::try_from(value).map_err(|_| {
        MomentumError::config_invalid(section, key, format!("{} is out of range", key))
    })
}

fn validate_positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, MomentumError> {
    let value = parse_int(config, section, key, default)?;
    if value < 1 {
        return Err(MomentumError::config_invalid(
            section,
            key,
            format!("{} must be at least 1", key),
        ));
    }
    Ok(value)
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    if start_date >= end_date {
        return Err(MomentumError::config_invalid(
            "data",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<NaiveDate, MomentumError> {
    match config.get_string("data", field) {
        None => Err(MomentumError::ConfigMissing {
            section: "data".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            MomentumError::config_invalid(
                "data",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

/// Parses `[strategy] mom_windows` and `weights`, falling back to 60,120 and
/// 0.5,0.5 when absent.
pub fn parse_momentum_lists(
    config: &dyn ConfigPort,
) -> Result<(Vec<usize>, Vec<f64>), MomentumError> {
    let windows = match config.get_list("strategy", "mom_windows") {
        None => vec![60, 120],
        Some(items) => items
            .iter()
            .map(|item| item.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| {
                MomentumError::config_invalid(
                    "strategy",
                    "mom_windows",
                    "mom_windows must be a comma-separated list of positive integers",
                )
            })?,
    };
    let weights = match config.get_list("strategy", "weights") {
        None => vec![0.5, 0.5],
        Some(items) => items
            .iter()
            .map(|item| item.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| {
                MomentumError::config_invalid(
                    "strategy",
                    "weights",
                    "weights must be a comma-separated list of numbers",
                )
            })?,
    };
    Ok((windows, weights))
}

fn validate_momentum_lists(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    let (windows, weights) = parse_momentum_lists(config)?;
    crate::domain::signals::MomentumConfig::new(windows, weights)?;
    Ok(())
}

fn validate_cost(config: &dyn ConfigPort, key: &str, default: f64) -> Result<(), MomentumError> {
    let value = parse_double(config, "backtest", key, default)?;
    if value < 0.0 || !value.is_finite() {
        return Err(MomentumError::config_invalid(
            "backtest",
            key,
            format!("{} must be non-negative", key),
        ));
    }
    Ok(())
}

fn validate_initial_nav(config: &dyn ConfigPort) -> Result<(), MomentumError> {
    let value = parse_double(config, "backtest", "initial_nav", 1.0)?;
    if value <= 0.0 || !value.is_finite() {
        return Err(MomentumError::config_invalid(
            "backtest",
            "initial_nav",
            "initial_nav must be positive",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<(String, String), String>);

    impl MapConfig {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0.get(&(section.to_string(), key.to_string())).cloned()
        }
        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
        fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
        fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
            default
        }
    }

    fn valid() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("data", "start_date", "2020-01-01"),
            ("data", "end_date", "2020-12-31"),
        ]
    }

    fn with(extra: (&'static str, &'static str, &'static str)) -> MapConfig {
        let mut entries = valid();
        entries.push(extra);
        MapConfig::new(&entries)
    }

    #[test]
    fn defaults_with_dates_are_valid() {
        assert!(validate_config(&MapConfig::new(&valid())).is_ok());
    }

    #[test]
    fn missing_start_date() {
        let cfg = MapConfig::new(&[("data", "end_date", "2020-12-31")]);
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, MomentumError::ConfigMissing { key, .. } if key == "start_date"));
    }

    #[test]
    fn start_after_end_is_invalid() {
        let cfg = MapConfig::new(&[
            ("data", "start_date", "2021-01-01"),
            ("data", "end_date", "2020-12-31"),
        ]);
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, MomentumError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn bad_date_format() {
        let cfg = MapConfig::new(&[
            ("data", "start_date", "2020/01/01"),
            ("data", "end_date", "2020-12-31"),
        ]);
        assert!(matches!(
            validate_config(&cfg),
            Err(MomentumError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn unknown_provider() {
        let err = validate_config(&with(("data", "provider", "bloomberg"))).unwrap_err();
        assert!(matches!(err, MomentumError::UnsupportedProvider { provider } if provider == "bloomberg"));
    }

    #[test]
    fn provider_is_case_insensitive() {
        assert!(validate_config(&with(("data", "provider", "TuShare"))).is_ok());
    }

    #[test]
    fn zero_top_n() {
        let err = validate_config(&with(("strategy", "top_n", "0"))).unwrap_err();
        assert!(matches!(err, MomentumError::ConfigInvalid { key, .. } if key == "top_n"));
    }

    #[test]
    fn negative_sell_cost() {
        let err = validate_config(&with(("backtest", "sell_cost", "-0.001"))).unwrap_err();
        assert!(matches!(err, MomentumError::ConfigInvalid { key, .. } if key == "sell_cost"));
    }

    #[test]
    fn non_positive_initial_nav() {
        let err = validate_config(&with(("backtest", "initial_nav", "0"))).unwrap_err();
        assert!(matches!(err, MomentumError::ConfigInvalid { key, .. } if key == "initial_nav"));
    }

    fn invalid_key(extra: (&'static str, &'static str, &'static str)) -> String {
        match validate_config(&with(extra)) {
            Err(MomentumError::ConfigInvalid { key, .. }) => key,
            other => panic!("expected ConfigInvalid, got {:?}", other),
        }
    }

    #[test]
    fn unparseable_integers_are_rejected() {
        assert_eq!(invalid_key(("data", "num_stocks", "many")), "num_stocks");
        assert_eq!(invalid_key(("data", "fetch_chunk_size", "1.5")), "fetch_chunk_size");
        assert_eq!(
            invalid_key(("data", "trading_days_per_year", "252d")),
            "trading_days_per_year"
        );
        assert_eq!(invalid_key(("strategy", "top_n", "ten")), "top_n");
    }

    #[test]
    fn unparseable_numbers_are_rejected() {
        assert_eq!(invalid_key(("backtest", "buy_cost", "8bp")), "buy_cost");
        assert_eq!(invalid_key(("backtest", "sell_cost", "0,0018")), "sell_cost");
        assert_eq!(invalid_key(("backtest", "initial_nav", "one")), "initial_nav");
    }

    #[test]
    fn trading_days_beyond_u32_are_rejected() {
        assert_eq!(
            invalid_key(("data", "trading_days_per_year", "4294967296")),
            "trading_days_per_year"
        );
    }

    #[test]
    fn counts_parse_to_usize() {
        let cfg = with(("strategy", "top_n", " 7 "));
        assert_eq!(parse_count(&cfg, "strategy", "top_n", 10).unwrap(), 7);
        assert_eq!(parse_count(&cfg, "data", "num_stocks", 300).unwrap(), 300);
    }

    #[test]
    fn window_weight_mismatch() {
        let err = validate_config(&with(("strategy", "mom_windows", "20,60,120"))).unwrap_err();
        assert!(matches!(err, MomentumError::ConfigInvalid { key, .. } if key == "weights"));
    }

    #[test]
    fn non_numeric_window() {
        let err = validate_config(&with(("strategy", "mom_windows", "20,abc"))).unwrap_err();
        assert!(matches!(err, MomentumError::ConfigInvalid { key, .. } if key == "mom_windows"));
    }

    #[test]
    fn momentum_lists_accept_brackets() {
        let cfg = MapConfig::new(&[
            ("strategy", "mom_windows", "[20, 60]"),
            ("strategy", "weights", "[0.3, 0.7]"),
        ]);
        let (windows, weights) = parse_momentum_lists(&cfg).unwrap();
        assert_eq!(windows, vec![20, 60]);
        assert_eq!(weights, vec![0.3, 0.7]);
    }
}
