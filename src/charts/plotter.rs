//! Chart Plotter Module
//! Draws interactive year-vs-value line charts using egui_plot.

use crate::charts::{segments, LineChart};
use egui::{Color32, RichText};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

/// Draws [`LineChart`]s into an egui `Ui`.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn color32(rgb: [u8; 3]) -> Color32 {
        Color32::from_rgb(rgb[0], rgb[1], rgb[2])
    }

    /// Draw a titled line chart with point markers.
    /// Missing values split a line into separate segments.
    pub fn draw_line_chart(ui: &mut egui::Ui, chart: &LineChart, height: f32) {
        ui.label(RichText::new(&chart.title).size(14.0).strong());

        let mut plot = Plot::new(&chart.id)
            .height(height)
            .x_axis_label("Year")
            .y_axis_label(chart.y_label.clone())
            .allow_scroll(false)
            .allow_zoom(!chart.percent_axis)
            .allow_drag(!chart.percent_axis)
            .clamp_grid(true)
            // Whole years only
            .x_axis_formatter(|mark, _range| {
                if mark.value.fract() == 0.0 {
                    format!("{:.0}", mark.value)
                } else {
                    String::new()
                }
            });

        if chart.percent_axis {
            plot = plot.include_y(0.0).include_y(100.0);
        } else {
            plot = plot.include_y(0.0);
        }
        if chart.show_legend {
            plot = plot.legend(Legend::default());
        }
        if let Some((min, max)) = chart.year_range() {
            plot = plot.include_x(min as f64 - 0.5).include_x(max as f64 + 0.5);
        }

        plot.show(ui, |plot_ui| {
            for (idx, series) in chart.series.iter().enumerate() {
                let color = Self::color32(chart.series_color(idx));

                for run in segments(series) {
                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(run.iter().copied()))
                            .color(color)
                            .width(2.0)
                            .name(&series.category),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(run.iter().copied()))
                            .radius(3.5)
                            .color(color)
                            .name(&series.category),
                    );
                }
            }
        });
    }
}
