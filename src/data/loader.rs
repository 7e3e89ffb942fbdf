//! CSV Data Loader Module
//! Reads the population CSV with Polars and normalizes it into a [`Dataset`].

use crate::data::dataset::{Dataset, YEAR_COL};
use polars::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Headers left behind by re-exporting a table with its row index: blank,
/// `Unnamed: 0`, or the `column_<n>` placeholder the CSV reader gives blank headers.
static ARTIFACT_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(Unnamed.*|column_\d+)?$").expect("valid regex"));

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No 'Year' column found in the data")]
    MissingYearColumn,
    #[error("No population columns found besides 'Year'")]
    NoCategories,
    #[error("No rows with a valid year")]
    NoData,
}

/// Loads and normalizes the population table.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file from disk.
    pub fn load_csv(file_path: impl AsRef<Path>) -> Result<Dataset, LoaderError> {
        let path = file_path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), bytes = bytes.len(), "Reading population CSV");
        Self::load_csv_bytes(&bytes)
    }

    /// Load CSV content already in memory.
    pub fn load_csv_bytes(bytes: &[u8]) -> Result<Dataset, LoaderError> {
        // Every column comes in as text; coercion happens below so that bad
        // cells become missing instead of failing the whole column.
        let raw = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;

        Self::normalize(&raw)
    }

    /// Drop artifact columns, trim headers, coerce numbers, sort by year.
    pub fn normalize(raw: &DataFrame) -> Result<Dataset, LoaderError> {
        let mut year_source: Option<String> = None;
        let mut category_sources: Vec<(String, String)> = Vec::new();

        for name in raw.get_column_names() {
            let raw_name = name.to_string();
            let trimmed = raw_name.trim();
            if Self::is_artifact_column(trimmed) {
                debug!(column = %raw_name, "Dropping artifact column");
                continue;
            }
            if trimmed.eq_ignore_ascii_case(YEAR_COL) {
                if year_source.is_none() {
                    year_source = Some(raw_name.clone());
                } else {
                    warn!(column = %raw_name, "Ignoring additional year column");
                }
                continue;
            }
            if category_sources.iter().any(|(_, kept)| kept == trimmed) {
                warn!(column = %raw_name, "Dropping duplicate column, keeping first occurrence");
                continue;
            }
            category_sources.push((raw_name.clone(), trimmed.to_string()));
        }

        let year_source = year_source.ok_or(LoaderError::MissingYearColumn)?;
        if category_sources.is_empty() {
            return Err(LoaderError::NoCategories);
        }

        let raw_years = Self::text_cells(raw, &year_source)?;
        let mut seen = HashSet::new();
        let mut keep: Vec<usize> = Vec::with_capacity(raw_years.len());
        let mut years: Vec<i32> = Vec::with_capacity(raw_years.len());

        for (idx, cell) in raw_years.iter().enumerate() {
            let Some(year) = cell.as_deref().and_then(parse_year) else {
                warn!(row = idx, value = ?cell, "Dropping row without a valid year");
                continue;
            };
            if !seen.insert(year) {
                warn!(row = idx, year, "Dropping duplicate year, keeping first occurrence");
                continue;
            }
            keep.push(idx);
            years.push(year);
        }

        if years.is_empty() {
            return Err(LoaderError::NoData);
        }

        let mut columns = vec![Column::new(YEAR_COL.into(), years)];
        let mut categories = Vec::with_capacity(category_sources.len());

        for (source, name) in &category_sources {
            let cells = Self::text_cells(raw, source)?;
            let values: Vec<Option<f64>> = keep
                .iter()
                .map(|&i| cells[i].as_deref().and_then(parse_value))
                .collect();
            let missing = values.iter().filter(|v| v.is_none()).count();
            if missing > 0 {
                debug!(column = %name, missing, "Column has missing values");
            }
            columns.push(Column::new(name.as_str().into(), values));
            categories.push(name.clone());
        }

        let df = DataFrame::new(columns)?.sort(
            [YEAR_COL],
            SortMultipleOptions::default().with_maintain_order(true),
        )?;

        info!(
            rows = df.height(),
            categories = categories.len(),
            "Population table loaded"
        );

        Ok(Dataset::from_normalized(df, categories))
    }

    /// Whether a (trimmed) header names an index/unnamed artifact column.
    pub fn is_artifact_column(name: &str) -> bool {
        ARTIFACT_COLUMN.is_match(name.trim())
    }

    fn text_cells(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoaderError> {
        let col = df.column(name)?.cast(&DataType::String)?;
        Ok(col
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }
}

/// Parse a year cell. Accepts `2015` and `2015.0`; out-of-range values are rejected.
fn parse_year(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    cell.parse::<i32>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .filter(|v| (i32::MIN as f64..=i32::MAX as f64).contains(v))
            .map(|v| v as i32)
    })
}

/// Parse a numeric cell; anything unparseable (or `NaN`) is missing.
fn parse_value(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}
