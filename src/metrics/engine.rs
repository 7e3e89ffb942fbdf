//! Metrics Engine Module
//! Pure computations over the population table: year bounds, range filtering,
//! endpoint change metrics and percent-of-total series.

use crate::data::{Dataset, FilteredView, TOTAL_COL, YEAR_COL};
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

/// Earliest year suggested as the default range start.
pub const DEFAULT_START_YEAR: i32 = 2017;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Dates don't work. Start year must be <= end year.")]
    InvalidRange { start_year: i32, end_year: i32 },
    #[error("No data available for the selected year range.")]
    EmptyRange { start_year: i32, end_year: i32 },
    #[error("Selected year(s) not found in the data.")]
    YearNotFound { year: i32 },
    #[error("Cannot compute percentages: 'Total' column is missing.")]
    MissingTotal,
    #[error("Percentage chart not shown for 'Total'.")]
    TargetIsTotal,
    #[error("Unknown population category: '{0}'")]
    UnknownCategory(String),
    #[error("Failed to filter data: {0}")]
    Filter(String),
}

impl MetricsError {
    /// Informational conditions that disable a chart rather than signal a failure.
    pub fn is_informational(&self) -> bool {
        matches!(self, MetricsError::TargetIsTotal | MetricsError::MissingTotal)
    }
}

/// Endpoint values of one category and the percent change between them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeMetrics {
    pub target: String,
    pub start_year: i32,
    pub end_year: i32,
    pub initial: Option<i64>,
    pub final_value: Option<i64>,
    pub percent_change: Option<f64>,
}

/// One line on a chart: `(year, value)` points, `None` where the value is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    pub category: String,
    pub points: Vec<(i32, Option<f64>)>,
}

/// Query handle over an immutable [`Dataset`].
#[derive(Debug, Clone, Copy)]
pub struct MetricsEngine<'a> {
    dataset: &'a Dataset,
}

impl<'a> MetricsEngine<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Smallest and largest year in the table.
    pub fn year_bounds(&self) -> (i32, i32) {
        let years = self.dataset.years();
        let min = years.first().copied().unwrap_or_default();
        let max = years.last().copied().unwrap_or_default();
        (min, max)
    }

    /// Suggested initial slider positions: `(max(min_year, 2017), max_year)`.
    pub fn default_range(&self, preferred_start: i32) -> (i32, i32) {
        let (min, max) = self.year_bounds();
        (min.max(preferred_start), max)
    }

    /// Reject ranges whose start lies after their end. No clamping, no swap.
    pub fn validate_range(start_year: i32, end_year: i32) -> Result<(), MetricsError> {
        if start_year > end_year {
            return Err(MetricsError::InvalidRange {
                start_year,
                end_year,
            });
        }
        Ok(())
    }

    /// Validate the range and return the rows with `start_year <= Year <= end_year`.
    pub fn validate_and_filter(
        &self,
        start_year: i32,
        end_year: i32,
    ) -> Result<FilteredView, MetricsError> {
        Self::validate_range(start_year, end_year)?;

        let filtered = self
            .dataset
            .dataframe()
            .clone()
            .lazy()
            .filter(
                col(YEAR_COL)
                    .gt_eq(lit(start_year))
                    .and(col(YEAR_COL).lt_eq(lit(end_year))),
            )
            .collect()
            .map_err(|e| MetricsError::Filter(e.to_string()))?;

        if filtered.height() == 0 {
            debug!(start_year, end_year, "Year range selects no rows");
            return Err(MetricsError::EmptyRange {
                start_year,
                end_year,
            });
        }

        Ok(FilteredView::new(start_year, end_year, filtered))
    }

    /// Values at exactly `start_year` and `end_year`, truncated to integers,
    /// and the rounded percent change between them.
    ///
    /// An initial value of zero reports `0.0` percent change.
    pub fn change_metrics(
        &self,
        view: &FilteredView,
        target: &str,
    ) -> Result<ChangeMetrics, MetricsError> {
        self.require_category(target)?;

        let initial = view
            .value_at(view.start_year, target)
            .ok_or(MetricsError::YearNotFound {
                year: view.start_year,
            })?;
        let final_value = view
            .value_at(view.end_year, target)
            .ok_or(MetricsError::YearNotFound {
                year: view.end_year,
            })?;

        let initial = initial.map(|v| v.trunc() as i64);
        let final_value = final_value.map(|v| v.trunc() as i64);

        Ok(ChangeMetrics {
            target: target.to_string(),
            start_year: view.start_year,
            end_year: view.end_year,
            initial,
            final_value,
            percent_change: percent_change(initial, final_value),
        })
    }

    /// Absolute values of one category across the view.
    pub fn category_series(
        &self,
        view: &FilteredView,
        category: &str,
    ) -> Result<CategorySeries, MetricsError> {
        self.require_category(category)?;
        let values = view
            .values(category)
            .ok_or_else(|| MetricsError::UnknownCategory(category.to_string()))?;

        Ok(CategorySeries {
            category: category.to_string(),
            points: view.years().into_iter().zip(values).collect(),
        })
    }

    /// Absolute values for every selected category.
    pub fn category_series_multi(
        &self,
        view: &FilteredView,
        categories: &[String],
    ) -> Result<Vec<CategorySeries>, MetricsError> {
        categories
            .iter()
            .map(|c| self.category_series(view, c))
            .collect()
    }

    /// `category / Total * 100` for every row of the view.
    pub fn percent_of_total(
        &self,
        view: &FilteredView,
        category: &str,
    ) -> Result<CategorySeries, MetricsError> {
        if !self.dataset.has_total() {
            return Err(MetricsError::MissingTotal);
        }
        if category == TOTAL_COL {
            return Err(MetricsError::TargetIsTotal);
        }
        self.percent_series(view, category)
    }

    /// Percent-of-total series for every selected category.
    pub fn percent_of_total_multi(
        &self,
        view: &FilteredView,
        categories: &[String],
    ) -> Result<Vec<CategorySeries>, MetricsError> {
        if !self.dataset.has_total() {
            return Err(MetricsError::MissingTotal);
        }
        categories
            .iter()
            .map(|c| self.percent_series(view, c))
            .collect()
    }

    fn percent_series(
        &self,
        view: &FilteredView,
        category: &str,
    ) -> Result<CategorySeries, MetricsError> {
        let values = self.category_series(view, category)?;
        let totals = view.values(TOTAL_COL).ok_or(MetricsError::MissingTotal)?;

        let points = values
            .points
            .into_iter()
            .zip(totals)
            .map(|((year, value), total)| (year, percent_of(value, total)))
            .collect();

        Ok(CategorySeries {
            category: category.to_string(),
            points,
        })
    }

    fn require_category(&self, category: &str) -> Result<(), MetricsError> {
        if self.dataset.has_category(category) {
            Ok(())
        } else {
            Err(MetricsError::UnknownCategory(category.to_string()))
        }
    }
}

/// Round to two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// `round((final - initial) / initial * 100, 2)`, or `0.0` when `initial == 0`.
pub fn percent_change(initial: Option<i64>, final_value: Option<i64>) -> Option<f64> {
    let (initial, final_value) = (initial?, final_value?);
    if initial == 0 {
        return Some(0.0);
    }
    let initial = initial as f64;
    Some(round2((final_value as f64 - initial) / initial * 100.0))
}

/// `value / total * 100`; missing when either side is missing or the total is zero.
pub fn percent_of(value: Option<f64>, total: Option<f64>) -> Option<f64> {
    match (value, total) {
        (Some(v), Some(t)) if t != 0.0 => Some(v / t * 100.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;

    fn census() -> Dataset {
        let csv = "\
Year,Total,Black,Asian
2015,39144818,2200000,5600000
2016,39250017,2190000,
2017,39358497,0,5800000
2020,39368078,2184000,6100000
";
        DataLoader::load_csv_bytes(csv.as_bytes()).unwrap()
    }

    fn no_total() -> Dataset {
        DataLoader::load_csv_bytes(b"Year,Black,Asian\n2019,10,20\n2020,11,22\n").unwrap()
    }

    #[test]
    fn test_year_bounds_and_defaults() {
        let ds = census();
        let engine = MetricsEngine::new(&ds);
        assert_eq!(engine.year_bounds(), (2015, 2020));
        assert_eq!(engine.default_range(DEFAULT_START_YEAR), (2017, 2020));
        assert_eq!(engine.default_range(2000), (2015, 2020));
    }

    #[test]
    fn test_validate_and_filter() {
        let ds = census();
        let engine = MetricsEngine::new(&ds);

        let view = engine.validate_and_filter(2016, 2020).unwrap();
        assert_eq!(view.years(), vec![2016, 2017, 2020]);

        assert_eq!(
            engine.validate_and_filter(2020, 2015).unwrap_err(),
            MetricsError::InvalidRange {
                start_year: 2020,
                end_year: 2015
            }
        );
        assert_eq!(
            engine.validate_and_filter(2018, 2019).unwrap_err(),
            MetricsError::EmptyRange {
                start_year: 2018,
                end_year: 2019
            }
        );
    }

    #[test]
    fn test_change_metrics_example() {
        let ds = census();
        let engine = MetricsEngine::new(&ds);
        let view = engine.validate_and_filter(2015, 2020).unwrap();

        let m = engine.change_metrics(&view, "Black").unwrap();
        assert_eq!(m.initial, Some(2200000));
        assert_eq!(m.final_value, Some(2184000));
        assert_eq!(m.percent_change, Some(-0.73));
    }

    #[test]
    fn test_change_metrics_single_year() {
        let ds = census();
        let engine = MetricsEngine::new(&ds);
        let view = engine.validate_and_filter(2020, 2020).unwrap();
        assert_eq!(view.row_count(), 1);

        let m = engine.change_metrics(&view, "Total").unwrap();
        assert_eq!(m.initial, m.final_value);
        assert_eq!(m.percent_change, Some(0.0));
    }

    #[test]
    fn test_change_metrics_zero_initial_reports_zero() {
        let ds = census();
        let engine = MetricsEngine::new(&ds);
        let view = engine.validate_and_filter(2017, 2020).unwrap();

        let m = engine.change_metrics(&view, "Black").unwrap();
        assert_eq!(m.initial, Some(0));
        assert_eq!(m.percent_change, Some(0.0));
    }

    #[test]
    fn test_change_metrics_missing_values_propagate() {
        let ds = census();
        let engine = MetricsEngine::new(&ds);
        let view = engine.validate_and_filter(2016, 2020).unwrap();

        let m = engine.change_metrics(&view, "Asian").unwrap();
        assert_eq!(m.initial, None);
        assert_eq!(m.final_value, Some(6100000));
        assert_eq!(m.percent_change, None);
    }

    #[test]
    fn test_change_metrics_year_not_found() {
        let ds = census();
        let engine = MetricsEngine::new(&ds);

        let gap = engine.validate_and_filter(2015, 2019).unwrap();
        assert_eq!(
            engine.change_metrics(&gap, "Total").unwrap_err(),
            MetricsError::YearNotFound { year: 2019 }
        );

        let below = engine.validate_and_filter(1800, 2020).unwrap();
        assert_eq!(
            engine.change_metrics(&below, "Total").unwrap_err(),
            MetricsError::YearNotFound { year: 1800 }
        );
    }

    #[test]
    fn test_percent_of_total() {
        let ds = census();
        let engine = MetricsEngine::new(&ds);
        let view = engine.validate_and_filter(2015, 2020).unwrap();

        let series = engine.percent_of_total(&view, "Black").unwrap();
        assert_eq!(series.points.len(), 4);
        let (year, pct) = series.points[3];
        assert_eq!(year, 2020);
        assert!((pct.unwrap() - 5.5476).abs() < 1e-3);
        assert_eq!(round2(pct.unwrap()), 5.55);

        let asian = engine.percent_of_total(&view, "Asian").unwrap();
        assert_eq!(asian.points[1], (2016, None));

        assert_eq!(
            engine.percent_of_total(&view, "Total").unwrap_err(),
            MetricsError::TargetIsTotal
        );
        assert_eq!(
            engine.percent_of_total(&view, "Latino").unwrap_err(),
            MetricsError::UnknownCategory("Latino".to_string())
        );
    }

    #[test]
    fn test_percent_of_total_multi() {
        let ds = census();
        let engine = MetricsEngine::new(&ds);
        let view = engine.validate_and_filter(2015, 2017).unwrap();
        let cats = vec!["Black".to_string(), "Asian".to_string()];

        let series = engine.percent_of_total_multi(&view, &cats).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].category, "Black");
        for s in &series {
            for (_, pct) in &s.points {
                if let Some(p) = pct {
                    assert!((0.0..=100.0).contains(p));
                }
            }
        }
    }

    #[test]
    fn test_missing_total_disables_percentages_only() {
        let ds = no_total();
        let engine = MetricsEngine::new(&ds);
        let view = engine.validate_and_filter(2019, 2020).unwrap();
        let cats = vec!["Black".to_string(), "Asian".to_string()];

        assert_eq!(
            engine.percent_of_total(&view, "Black").unwrap_err(),
            MetricsError::MissingTotal
        );
        assert_eq!(
            engine.percent_of_total_multi(&view, &cats).unwrap_err(),
            MetricsError::MissingTotal
        );

        let absolute = engine.category_series_multi(&view, &cats).unwrap();
        assert_eq!(absolute[1].points, vec![(2019, Some(20.0)), (2020, Some(22.0))]);
    }

    #[test]
    fn test_engine_is_idempotent() {
        let ds = census();
        let engine = MetricsEngine::new(&ds);
        let a = engine.validate_and_filter(2015, 2020).unwrap();
        let b = engine.validate_and_filter(2015, 2020).unwrap();
        assert_eq!(
            engine.change_metrics(&a, "Black").unwrap(),
            engine.change_metrics(&b, "Black").unwrap()
        );
        assert_eq!(
            engine.percent_of_total(&a, "Black").unwrap(),
            engine.percent_of_total(&b, "Black").unwrap()
        );
    }

    #[test]
    fn test_percent_helpers() {
        assert_eq!(percent_change(Some(100), Some(150)), Some(50.0));
        assert_eq!(percent_change(Some(0), Some(150)), Some(0.0));
        assert_eq!(percent_change(None, Some(150)), None);
        assert_eq!(percent_change(Some(32), Some(3)), Some(-90.62));
        assert_eq!(percent_change(Some(32), Some(31)), Some(-3.12));
        assert_eq!(percent_of(Some(5.0), Some(0.0)), None);
        assert_eq!(percent_of(None, Some(10.0)), None);
        assert_eq!(percent_of(Some(5.0), Some(10.0)), Some(50.0));
    }
}
