//! Control Panel Widget
//! Left side panel with the analysis form: year range and population.

use egui::{Color32, ComboBox, RichText};

/// Form values, applied only when "Analyze" is pressed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    pub start_year: i32,
    pub end_year: i32,
    pub target: String,
}

/// Left side control panel.
pub struct ControlPanel {
    pub form: FormState,
    pub year_bounds: (i32, i32),
    pub targets: Vec<String>,
    pub csv_name: String,
    pub row_count: usize,
    pub status: String,
    pub export_enabled: bool,
}

impl ControlPanel {
    pub fn new(
        form: FormState,
        year_bounds: (i32, i32),
        targets: Vec<String>,
        csv_name: String,
        row_count: usize,
    ) -> Self {
        Self {
            form,
            year_bounds,
            targets,
            csv_name,
            row_count,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;
        let (min_year, max_year) = self.year_bounds;

        // ===== Data Source Section =====
        ui.add_space(5.0);
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&self.csv_name).size(12.0));
                ui.label(
                    RichText::new(format!(
                        "{} rows, {} to {}",
                        self.row_count, min_year, max_year
                    ))
                    .size(11.0)
                    .color(Color32::GRAY),
                );
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Year Range Section =====
        ui.label(RichText::new("📅 Year Range").size(14.0).strong());
        ui.add_space(5.0);

        ui.label("Choose a starting year");
        ui.add(
            egui::Slider::new(&mut self.form.start_year, min_year..=max_year)
                .text("Start Year")
                .step_by(1.0),
        );
        ui.add_space(5.0);
        ui.label("Choose an end year");
        ui.add(
            egui::Slider::new(&mut self.form.end_year, min_year..=max_year)
                .text("End Year")
                .step_by(1.0),
        );

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Population Section =====
        ui.label(RichText::new("👥 Population").size(14.0).strong());
        ui.add_space(5.0);

        ui.label("Choose a population");
        ComboBox::from_id_salt("target")
            .width(200.0)
            .selected_text(&self.form.target)
            .show_ui(ui, |ui| {
                for target in &self.targets {
                    ui.selectable_value(&mut self.form.target, target.clone(), target);
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("▶ Analyze").size(16.0))
                .fill(Color32::from_rgb(255, 75, 75))
                .min_size(egui::vec2(200.0, 35.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::Analyze;
            }

            ui.add_space(8.0);

            ui.add_enabled_ui(self.export_enabled, |ui| {
                let export = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(export).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    Analyze,
    ExportPng,
}
