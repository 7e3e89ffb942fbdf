//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;

pub use app::PopulationApp;
pub use chart_viewer::{ChartViewer, ChartViewerAction, ViewerTab};
pub use control_panel::{ControlPanel, ControlPanelAction, FormState};
