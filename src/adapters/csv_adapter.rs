//! CSV table store for the pipeline's stage files.

use crate::domain::error::MomentumError;
use crate::domain::observation::ScoredObservation;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SCORED_FIXED_COLUMNS: [&str; 5] = ["date", "symbol", "open", "close", "score"];

/// One row of `universe.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseRecord {
    pub symbol: String,
    pub in_universe: u8,
}

/// `{prefix}_chunk_{NNN}.csv`, 1-based and zero-padded to three digits.
pub fn chunk_file_name(prefix: &str, index: usize) -> String {
    format!("{}_chunk_{:03}.csv", prefix, index)
}

/// Chunk files for `prefix` in `dir`, ordered by file name. A missing
/// directory yields no chunks.
pub fn list_chunks(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, MomentumError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let start = format!("{}_chunk_", prefix);
    let mut chunks = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if name_str.starts_with(&start) && name_str.ends_with(".csv") {
            chunks.push(entry.path());
        }
    }
    chunks.sort();
    Ok(chunks)
}

fn ensure_parent(path: &Path) -> Result<(), MomentumError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Writes serde rows with a header, creating parent directories.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), MomentumError> {
    ensure_parent(path)?;
    let mut writer =
        csv::Writer::from_path(path).map_err(|e| MomentumError::table(path.display(), e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| MomentumError::table(path.display(), e))?;
    }
    writer
        .flush()
        .map_err(|e| MomentumError::table(path.display(), e))?;
    Ok(())
}

pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, MomentumError> {
    let mut reader =
        csv::Reader::from_path(path).map_err(|e| MomentumError::table(path.display(), e))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| MomentumError::table(path.display(), e))
}

/// Writes scored rows as `date,symbol,open,close,score` followed by one
/// `mom{w}` column per window.
pub fn write_scored(
    path: &Path,
    rows: &[ScoredObservation],
    windows: &[usize],
) -> Result<(), MomentumError> {
    ensure_parent(path)?;
    let mut writer =
        csv::Writer::from_path(path).map_err(|e| MomentumError::table(path.display(), e))?;

    let header: Vec<String> = SCORED_FIXED_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(windows.iter().map(|w| format!("mom{}", w)))
        .collect();
    writer
        .write_record(&header)
        .map_err(|e| MomentumError::table(path.display(), e))?;

    for row in rows {
        let mut record = vec![
            row.date.format("%Y-%m-%d").to_string(),
            row.symbol.clone(),
            row.open.map(|o| o.to_string()).unwrap_or_default(),
            row.close.to_string(),
            row.score.to_string(),
        ];
        record.extend(row.momentum.iter().map(|m| m.to_string()));
        writer
            .write_record(&record)
            .map_err(|e| MomentumError::table(path.display(), e))?;
    }
    writer
        .flush()
        .map_err(|e| MomentumError::table(path.display(), e))?;
    Ok(())
}

/// Reads scored rows by header name. Every `mom*` column is collected into
/// `momentum` in header order; an empty `open` cell reads as `None`.
pub fn read_scored(path: &Path) -> Result<Vec<ScoredObservation>, MomentumError> {
    let mut reader =
        csv::Reader::from_path(path).map_err(|e| MomentumError::table(path.display(), e))?;
    let headers = reader
        .headers()
        .map_err(|e| MomentumError::table(path.display(), e))?
        .clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| MomentumError::table(path.display(), format!("missing {} column", name)))
    };
    let date_idx = column("date")?;
    let symbol_idx = column("symbol")?;
    let open_idx = column("open")?;
    let close_idx = column("close")?;
    let score_idx = column("score")?;
    let mom_idx: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.starts_with("mom"))
        .map(|(i, _)| i)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| MomentumError::table(path.display(), e))?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();
        let number = |i: usize, name: &str| {
            field(i).parse::<f64>().map_err(|e| {
                MomentumError::table(path.display(), format!("invalid {} value: {}", name, e))
            })
        };

        let date = NaiveDate::parse_from_str(field(date_idx), "%Y-%m-%d").map_err(|e| {
            MomentumError::table(path.display(), format!("invalid date format: {}", e))
        })?;
        let open = match field(open_idx) {
            "" => None,
            _ => Some(number(open_idx, "open")?),
        };
        let momentum = mom_idx
            .iter()
            .map(|&i| number(i, "momentum"))
            .collect::<Result<Vec<_>, _>>()?;

        rows.push(ScoredObservation {
            date,
            symbol: field(symbol_idx).to_string(),
            open,
            close: number(close_idx, "close")?,
            score: number(score_idx, "score")?,
            momentum,
        });
    }
    Ok(rows)
}
