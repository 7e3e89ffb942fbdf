//! California Population Dashboard
//!
//! Loads an annual population-by-race CSV once, then answers per-interaction
//! queries (year range, target population, comparison set) with endpoint
//! metrics and absolute / percent-of-total series for charting.

pub mod charts;
pub mod config;
pub mod data;
pub mod format;
pub mod gui;
pub mod metrics;

pub use config::DashboardConfig;
pub use data::{DataLoader, Dataset, FilteredView, LoaderError};
pub use metrics::{Analysis, MetricsEngine, MetricsError, QueryParams};
