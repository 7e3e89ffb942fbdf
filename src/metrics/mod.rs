//! Metrics module - derived values for a year range and population selection

mod analysis;
mod engine;

pub use analysis::{Analysis, Comparison, QueryParams};
pub use engine::{
    percent_change, percent_of, round2, CategorySeries, ChangeMetrics, MetricsEngine,
    MetricsError, DEFAULT_START_YEAR,
};
