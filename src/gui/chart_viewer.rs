//! Chart Viewer Widget
//! Central panel: full data table, "Population change" and "Compare" tabs.

use crate::charts::{ChartPlotter, LineChart};
use crate::data::Dataset;
use crate::format;
use crate::metrics::{Analysis, ChangeMetrics, MetricsError};
use egui::{Color32, RichText, ScrollArea};

const CHART_HEIGHT: f32 = 280.0;

const INFO_COLOR: Color32 = Color32::from_rgb(23, 162, 184);
const WARNING_COLOR: Color32 = Color32::from_rgb(255, 193, 7);
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerTab {
    #[default]
    Change,
    Compare,
}

/// Actions triggered by the chart viewer
#[derive(Debug, Clone, PartialEq)]
pub enum ChartViewerAction {
    None,
    CompareChanged,
}

/// Renders an [`Analysis`]; owns only widget state.
pub struct ChartViewer {
    pub tab: ViewerTab,
    pub compare_options: Vec<String>,
    pub compare_selected: Vec<bool>,
}

impl ChartViewer {
    pub fn new(compare_options: Vec<String>) -> Self {
        let compare_selected = vec![false; compare_options.len()];
        Self {
            tab: ViewerTab::default(),
            compare_options,
            compare_selected,
        }
    }

    /// Replace the comparison selection.
    pub fn set_compare_selection(&mut self, selected: &[String]) {
        self.compare_selected = self
            .compare_options
            .iter()
            .map(|o| selected.contains(o))
            .collect();
    }

    /// Selected comparison categories in option order.
    pub fn selected_compare_targets(&self) -> Vec<String> {
        self.compare_options
            .iter()
            .zip(self.compare_selected.iter())
            .filter(|(_, &selected)| selected)
            .map(|(option, _)| option.clone())
            .collect()
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        dataset: &Dataset,
        analysis: Option<&Result<Analysis, MetricsError>>,
    ) -> ChartViewerAction {
        let mut action = ChartViewerAction::None;

        ui.heading("California Population by Race (Annual – CDPH)");
        ui.add_space(8.0);

        egui::CollapsingHeader::new("See full data table")
            .default_open(false)
            .show(ui, |ui| Self::draw_data_table(ui, dataset));

        ui.add_space(10.0);

        let analysis = match analysis {
            Some(Ok(analysis)) => analysis,
            Some(Err(err)) => {
                Self::draw_notice(ui, err);
                return action;
            }
            None => return action,
        };

        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.tab, ViewerTab::Change, "Population change");
            ui.selectable_value(&mut self.tab, ViewerTab::Compare, "Compare");
        });
        ui.separator();

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match self.tab {
                ViewerTab::Change => Self::draw_change_tab(ui, analysis),
                ViewerTab::Compare => {
                    if self.draw_compare_tab(ui, analysis) {
                        action = ChartViewerAction::CompareChanged;
                    }
                }
            });

        action
    }

    fn draw_change_tab(ui: &mut egui::Ui, analysis: &Analysis) {
        let params = &analysis.params;
        ui.label(
            RichText::new(format!(
                "Population change from {} to {}",
                params.start_year, params.end_year
            ))
            .size(18.0)
            .strong(),
        );
        ui.add_space(8.0);

        ui.columns(2, |cols| {
            match &analysis.change {
                Ok(metrics) => Self::draw_metrics(&mut cols[0], metrics),
                Err(err) => Self::draw_notice(&mut cols[0], err),
            }
            ChartPlotter::draw_line_chart(
                &mut cols[1],
                &LineChart::population(analysis),
                CHART_HEIGHT,
            );
        });

        ui.add_space(12.0);

        match LineChart::target_percent(analysis) {
            Some(chart) => ChartPlotter::draw_line_chart(ui, &chart, CHART_HEIGHT),
            None => {
                if let Err(err) = &analysis.target_percent {
                    Self::draw_notice(ui, err);
                }
            }
        }
    }

    /// Returns true when the comparison selection changed.
    fn draw_compare_tab(&mut self, ui: &mut egui::Ui, analysis: &Analysis) -> bool {
        let mut changed = false;

        ui.label(
            RichText::new("Compare with other populations")
                .size(18.0)
                .strong(),
        );
        ui.add_space(5.0);
        ui.label("Choose populations");
        ui.horizontal_wrapped(|ui| {
            for (option, selected) in self
                .compare_options
                .iter()
                .zip(self.compare_selected.iter_mut())
            {
                if ui.checkbox(selected, option).changed() {
                    changed = true;
                }
            }
        });
        ui.add_space(10.0);

        // Charts reflect the selection of the last computed analysis.
        let Some(comparison) = &analysis.comparison else {
            ui.label(
                RichText::new("Select at least one series to compare.").color(INFO_COLOR),
            );
            return changed;
        };

        match LineChart::comparison(analysis) {
            Some(chart) => ChartPlotter::draw_line_chart(ui, &chart, CHART_HEIGHT),
            None => {
                if let Err(err) = &comparison.absolute {
                    Self::draw_notice(ui, err);
                }
            }
        }

        ui.add_space(12.0);

        match LineChart::comparison_percent(analysis) {
            Some(chart) => ChartPlotter::draw_line_chart(ui, &chart, CHART_HEIGHT),
            None => {
                if let Err(err) = &comparison.percent {
                    let color = if matches!(err, MetricsError::MissingTotal) {
                        WARNING_COLOR
                    } else {
                        ERROR_COLOR
                    };
                    ui.label(RichText::new(err.to_string()).color(color));
                }
            }
        }

        changed
    }

    fn draw_metrics(ui: &mut egui::Ui, metrics: &ChangeMetrics) {
        Self::draw_metric(
            ui,
            &format!("{} – {}", metrics.target, metrics.start_year),
            &format::thousands_or_missing(metrics.initial),
            None,
        );
        ui.add_space(10.0);
        Self::draw_metric(
            ui,
            &format!("{} – {}", metrics.target, metrics.end_year),
            &format::thousands_or_missing(metrics.final_value),
            Some(metrics.percent_change),
        );
    }

    fn draw_metric(ui: &mut egui::Ui, label: &str, value: &str, delta: Option<Option<f64>>) {
        ui.label(RichText::new(label).size(13.0).color(Color32::GRAY));
        ui.label(RichText::new(value).size(30.0));
        if let Some(delta) = delta {
            let (arrow, color) = match delta {
                Some(d) if d > 0.0 => ("↑", Color32::from_rgb(40, 167, 69)),
                Some(d) if d < 0.0 => ("↓", ERROR_COLOR),
                _ => ("", Color32::GRAY),
            };
            ui.label(
                RichText::new(format!("{} {}", arrow, format::percent_delta(delta)).trim())
                    .size(13.0)
                    .color(color),
            );
        }
    }

    fn draw_notice(ui: &mut egui::Ui, err: &MetricsError) {
        let color = if err.is_informational() {
            INFO_COLOR
        } else {
            ERROR_COLOR
        };
        egui::Frame::none()
            .stroke(egui::Stroke::new(1.0, color))
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(err.to_string()).color(color));
            });
    }

    fn draw_data_table(ui: &mut egui::Ui, dataset: &Dataset) {
        let years = dataset.years();
        let columns: Vec<(&String, Vec<Option<f64>>)> = dataset
            .categories()
            .iter()
            .map(|c| (c, dataset.values(c).unwrap_or_default()))
            .collect();

        ScrollArea::both()
            .id_salt("data_table")
            .max_height(260.0)
            .show(ui, |ui| {
                egui::Grid::new("data_table_grid")
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Year").strong());
                        for (name, _) in &columns {
                            ui.label(RichText::new(name.as_str()).strong());
                        }
                        ui.end_row();

                        for (row, year) in years.iter().enumerate() {
                            ui.label(year.to_string());
                            for (_, values) in &columns {
                                let cell = values.get(row).copied().flatten();
                                ui.label(format::table_cell(cell));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_selection_round_trip_keeps_option_order() {
        let mut viewer = ChartViewer::new(vec![
            "White".to_string(),
            "Black".to_string(),
            "Asian".to_string(),
        ]);
        assert!(viewer.selected_compare_targets().is_empty());

        viewer.set_compare_selection(&["Asian".to_string(), "White".to_string()]);
        assert_eq!(
            viewer.selected_compare_targets(),
            vec!["White".to_string(), "Asian".to_string()]
        );

        viewer.set_compare_selection(&["Latino".to_string()]);
        assert!(viewer.selected_compare_targets().is_empty());
    }
}
