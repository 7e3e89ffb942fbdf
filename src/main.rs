//! California Population Dashboard - desktop entry point.

use anyhow::Context;
use ca_population_dashboard::config::CONFIG_ENV_VAR;
use ca_population_dashboard::gui::PopulationApp;
use ca_population_dashboard::{DashboardConfig, DataLoader};
use eframe::egui;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DashboardConfig::resolve(
        std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from),
        std::env::args().nth(1),
    )?;

    // Loaded once; read-only for the rest of the process
    let dataset = DataLoader::load_csv(&config.csv_path)
        .with_context(|| format!("loading {}", config.csv_path.display()))?;

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("California Population by Race"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "California Population by Race",
        options,
        Box::new(move |cc| Ok(Box::new(PopulationApp::new(cc, dataset, config)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard window failed: {}", e))
}
