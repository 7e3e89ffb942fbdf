//! Static Chart Renderer
//! Writes line charts to PNG files with plotters.
//!
//! Layout matches the on-screen charts: title on top, year on the x-axis,
//! markers on every present value, gaps where values are missing, and a
//! fixed 0-100 vertical axis for percent charts.

use crate::charts::{segments, LineChart};
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Chart '{0}' has no data points")]
    NoData(String),
    #[error("Drawing failed: {0}")]
    Draw(String),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Year and value ranges for the chart axes.
    ///
    /// A single year is widened by one on each side; percent charts always
    /// span 0-100; absolute charts start at zero with 10% headroom.
    pub fn axis_ranges(chart: &LineChart) -> Option<((i32, i32), (f64, f64))> {
        let (min_year, max_year) = chart.year_range()?;
        let years = if min_year == max_year {
            (min_year - 1, max_year + 1)
        } else {
            (min_year, max_year)
        };

        let values = if chart.percent_axis {
            (0.0, 100.0)
        } else {
            let max = chart.max_value().unwrap_or(0.0);
            (0.0, if max > 0.0 { max * 1.1 } else { 1.0 })
        };

        Some((years, values))
    }

    /// Render one chart to a PNG file.
    pub fn render_png(
        chart: &LineChart,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let ((x0, x1), (y0, y1)) =
            Self::axis_ranges(chart).ok_or_else(|| RenderError::NoData(chart.id.clone()))?;

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(draw_err)?;

        let year_labels = ((x1 - x0 + 1) as usize).min(12);
        ctx.configure_mesh()
            .x_desc("Year")
            .y_desc(chart.y_label.as_str())
            .x_labels(year_labels)
            .x_label_formatter(&|y| y.to_string())
            .y_label_formatter(&|v| format!("{:.0}", v))
            .draw()
            .map_err(draw_err)?;

        for (idx, series) in chart.series.iter().enumerate() {
            let [r, g, b] = chart.series_color(idx);
            let color = RGBColor(r, g, b);

            for (run_idx, run) in segments(series).into_iter().enumerate() {
                let points: Vec<(i32, f64)> = run.iter().map(|p| (p[0] as i32, p[1])).collect();

                let drawn = ctx
                    .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
                    .map_err(draw_err)?;
                // One legend entry per category
                if run_idx == 0 {
                    drawn.label(series.category.clone()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
                }

                ctx.draw_series(
                    points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
                )
                .map_err(draw_err)?;
            }
        }

        if chart.show_legend {
            ctx.configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(draw_err)?;
        }

        root.present().map_err(draw_err)?;
        Ok(())
    }

    /// Render every chart into `dir`, one `<chart id>.png` each.
    pub fn export_charts_as_png(
        charts: &[LineChart],
        dir: &Path,
        width: u32,
        height: u32,
    ) -> Result<Vec<PathBuf>, RenderError> {
        fs::create_dir_all(dir)?;

        let mut png_paths = Vec::with_capacity(charts.len());
        for chart in charts {
            let file_path = dir.join(format!("{}.png", chart.file_stem()));
            Self::render_png(chart, &file_path, width, height)?;
            png_paths.push(file_path);
        }

        info!(count = png_paths.len(), dir = %dir.display(), "Charts exported");
        Ok(png_paths)
    }
}
