//! Data module - CSV loading and the normalized population table

mod dataset;
mod loader;

pub use dataset::{Dataset, FilteredView, TOTAL_COL, YEAR_COL};
pub use loader::{DataLoader, LoaderError};
