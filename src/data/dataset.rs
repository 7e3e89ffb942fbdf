//! Dataset Module
//! Immutable, year-sorted population table and the filtered views derived from it.

use polars::prelude::*;

/// Name of the year column after normalization.
pub const YEAR_COL: &str = "Year";

/// Name of the distinguished total population column.
pub const TOTAL_COL: &str = "Total";

/// Normalized population table.
///
/// Holds a `Year` column (Int32, unique, ascending) followed by one Float64
/// column per population category. Nulls mark missing values. Built once by
/// [`crate::data::DataLoader`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    categories: Vec<String>,
}

impl Dataset {
    /// Wrap a normalized DataFrame. Callers guarantee the column layout.
    pub(crate) fn from_normalized(df: DataFrame, categories: Vec<String>) -> Self {
        Self { df, categories }
    }

    /// Underlying DataFrame (read-only).
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Category column names in source order (everything except `Year`).
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    /// Whether the `Total` column exists.
    pub fn has_total(&self) -> bool {
        self.has_category(TOTAL_COL)
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    /// Years in ascending order.
    pub fn years(&self) -> Vec<i32> {
        column_years(&self.df)
    }

    /// Values of one category aligned with [`Dataset::years`].
    pub fn values(&self, category: &str) -> Option<Vec<Option<f64>>> {
        column_values(&self.df, category)
    }

    /// Categories a user can pick as the single target.
    pub fn selectable_targets(&self) -> Vec<String> {
        self.categories.clone()
    }

    /// Categories offered for comparison (everything except `Total`).
    pub fn compare_options(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|c| c.as_str() != TOTAL_COL)
            .cloned()
            .collect()
    }

    /// `Total` when present, otherwise the first category.
    pub fn default_target(&self) -> Option<String> {
        if self.has_total() {
            Some(TOTAL_COL.to_string())
        } else {
            self.categories.first().cloned()
        }
    }

    /// `[target]` when it is a comparison option, otherwise the first option.
    pub fn default_compare_selection(&self, target: &str) -> Vec<String> {
        let options = self.compare_options();
        if options.iter().any(|o| o == target) {
            vec![target.to_string()]
        } else {
            options.into_iter().take(1).collect()
        }
    }
}

/// Rows of a [`Dataset`] whose year lies in `start_year..=end_year`.
#[derive(Debug, Clone)]
pub struct FilteredView {
    pub start_year: i32,
    pub end_year: i32,
    df: DataFrame,
}

impl FilteredView {
    pub(crate) fn new(start_year: i32, end_year: i32, df: DataFrame) -> Self {
        Self {
            start_year,
            end_year,
            df,
        }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn years(&self) -> Vec<i32> {
        column_years(&self.df)
    }

    pub fn values(&self, category: &str) -> Option<Vec<Option<f64>>> {
        column_values(&self.df, category)
    }

    /// Value of `category` in the row whose year is exactly `year`.
    ///
    /// Outer `None`: no such row. Inner `None`: the row exists but the cell is missing.
    pub fn value_at(&self, year: i32, category: &str) -> Option<Option<f64>> {
        let values = self.values(category)?;
        let idx = self.years().iter().position(|&y| y == year)?;
        values.get(idx).copied()
    }
}

fn column_years(df: &DataFrame) -> Vec<i32> {
    df.column(YEAR_COL)
        .ok()
        .and_then(|col| col.i32().ok().map(|ca| ca.into_iter().flatten().collect()))
        .unwrap_or_default()
}

fn column_values(df: &DataFrame, category: &str) -> Option<Vec<Option<f64>>> {
    if category == YEAR_COL {
        return None;
    }
    let col = df.column(category).ok()?;
    let ca = col.f64().ok()?;
    Some(
        ca.into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect(),
    )
}
