//! Analysis Module
//! Bundles one full request (query parameters) and everything derived from it,
//! so the presentation layer renders a single value per interaction.

use crate::data::{Dataset, FilteredView};
use crate::metrics::engine::{CategorySeries, ChangeMetrics, MetricsEngine, MetricsError};
use tracing::debug;

/// Complete set of user choices for one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub start_year: i32,
    pub end_year: i32,
    pub target: String,
    pub compare_targets: Vec<String>,
}

impl QueryParams {
    /// Initial selections: recency-biased range, `Total` (or first category)
    /// as target, and the matching default comparison.
    pub fn defaults_for(dataset: &Dataset, preferred_start: i32) -> Self {
        let (start_year, end_year) = MetricsEngine::new(dataset).default_range(preferred_start);
        let target = dataset.default_target().unwrap_or_default();
        let compare_targets = dataset.default_compare_selection(&target);
        Self {
            start_year,
            end_year,
            target,
            compare_targets,
        }
    }
}

/// Comparison tab content. Absolute values never depend on `Total`.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub absolute: Result<Vec<CategorySeries>, MetricsError>,
    pub percent: Result<Vec<CategorySeries>, MetricsError>,
}

/// Everything derived from one [`QueryParams`].
#[derive(Debug, Clone)]
pub struct Analysis {
    pub params: QueryParams,
    pub view: FilteredView,
    pub change: Result<ChangeMetrics, MetricsError>,
    pub target_series: CategorySeries,
    pub target_percent: Result<CategorySeries, MetricsError>,
    /// `None` when no comparison category is selected.
    pub comparison: Option<Comparison>,
}

impl<'a> MetricsEngine<'a> {
    /// Run every computation for one request.
    ///
    /// Range and target problems fail the whole request; per-chart problems
    /// (missing year, missing `Total`) are carried inside the [`Analysis`].
    pub fn analyze(&self, params: &QueryParams) -> Result<Analysis, MetricsError> {
        let view = self.validate_and_filter(params.start_year, params.end_year)?;
        let target_series = self.category_series(&view, &params.target)?;
        let change = self.change_metrics(&view, &params.target);
        let target_percent = self.percent_of_total(&view, &params.target);

        let comparison = if params.compare_targets.is_empty() {
            None
        } else {
            Some(Comparison {
                absolute: self.category_series_multi(&view, &params.compare_targets),
                percent: self.percent_of_total_multi(&view, &params.compare_targets),
            })
        };

        debug!(
            start_year = params.start_year,
            end_year = params.end_year,
            target = %params.target,
            rows = view.row_count(),
            "Analysis computed"
        );

        Ok(Analysis {
            params: params.clone(),
            view,
            change,
            target_series,
            target_percent,
            comparison,
        })
    }
}
