//! Population Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::{LineChart, StaticChartRenderer};
use crate::config::DashboardConfig;
use crate::data::Dataset;
use crate::gui::{ChartViewer, ChartViewerAction, ControlPanel, ControlPanelAction, FormState};
use crate::metrics::{Analysis, MetricsEngine, MetricsError, QueryParams};
use egui::SidePanel;
use tracing::{info, warn};

/// Main application window.
pub struct PopulationApp {
    dataset: Dataset,
    config: DashboardConfig,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    /// Parameters of the last submitted form.
    submitted: QueryParams,
    analysis: Option<Result<Analysis, MetricsError>>,
}

impl PopulationApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        dataset: Dataset,
        config: DashboardConfig,
    ) -> Self {
        let engine = MetricsEngine::new(&dataset);
        let defaults = QueryParams::defaults_for(&dataset, config.default_start_year);

        let form = FormState {
            start_year: defaults.start_year,
            end_year: defaults.end_year,
            target: defaults.target.clone(),
        };
        let csv_name = config
            .csv_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| config.csv_path.display().to_string());

        let control_panel = ControlPanel::new(
            form,
            engine.year_bounds(),
            dataset.selectable_targets(),
            csv_name,
            dataset.row_count(),
        );
        let mut chart_viewer = ChartViewer::new(dataset.compare_options());
        chart_viewer.set_compare_selection(&defaults.compare_targets);

        let mut app = Self {
            dataset,
            config,
            control_panel,
            chart_viewer,
            submitted: defaults.clone(),
            analysis: None,
        };
        app.run_analysis(defaults);
        app
    }

    /// Submit the form. A new target resets the comparison to its default.
    fn handle_analyze(&mut self) {
        let form = self.control_panel.form.clone();

        let compare_targets = if form.target != self.submitted.target {
            let defaults = self.dataset.default_compare_selection(&form.target);
            self.chart_viewer.set_compare_selection(&defaults);
            defaults
        } else {
            self.chart_viewer.selected_compare_targets()
        };

        self.run_analysis(QueryParams {
            start_year: form.start_year,
            end_year: form.end_year,
            target: form.target,
            compare_targets,
        });
    }

    /// Re-run the last submitted request with the new comparison selection.
    fn handle_compare_changed(&mut self) {
        let mut params = self.submitted.clone();
        params.compare_targets = self.chart_viewer.selected_compare_targets();
        self.run_analysis(params);
    }

    fn run_analysis(&mut self, params: QueryParams) {
        let result = MetricsEngine::new(&self.dataset).analyze(&params);

        match &result {
            Ok(analysis) => {
                info!(
                    start_year = params.start_year,
                    end_year = params.end_year,
                    target = %params.target,
                    compare = params.compare_targets.len(),
                    rows = analysis.view.row_count(),
                    "Analysis updated"
                );
                self.control_panel.set_status(&format!(
                    "{} rows in range",
                    analysis.view.row_count()
                ));
            }
            Err(err) => {
                warn!(error = %err, "Analysis rejected");
                self.control_panel.set_status(&format!("Error: {}", err));
            }
        }

        self.control_panel.export_enabled = result.is_ok();
        self.submitted = params;
        self.analysis = Some(result);
    }

    /// Render every available chart to PNG in a user-chosen folder.
    fn handle_export_png(&mut self) {
        let Some(Ok(analysis)) = &self.analysis else {
            self.control_panel.set_status("Nothing to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        let charts = LineChart::all_for(analysis);
        match StaticChartRenderer::export_charts_as_png(
            &charts,
            &dir,
            self.config.export_width,
            self.config.export_height,
        ) {
            Ok(paths) => {
                self.control_panel
                    .set_status(&format!("Exported {} charts", paths.len()));
                if let Err(e) = open::that(&dir) {
                    warn!(error = %e, dir = %dir.display(), "Could not open export folder");
                }
            }
            Err(e) => {
                warn!(error = %e, "Chart export failed");
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for PopulationApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::Analyze => self.handle_analyze(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            let action = self
                .chart_viewer
                .show(ui, &self.dataset, self.analysis.as_ref());
            if action == ChartViewerAction::CompareChanged {
                self.handle_compare_changed();
            }
        });
    }
}
