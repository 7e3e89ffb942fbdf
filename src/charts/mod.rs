//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer};

use crate::metrics::{Analysis, CategorySeries};

/// Line color palette, cycled per series.
pub const PALETTE: [[u8; 3]; 10] = [
    [31, 119, 180],  // Blue
    [255, 127, 14],  // Orange
    [44, 160, 44],   // Green
    [214, 39, 40],   // Red
    [148, 103, 189], // Purple
    [140, 86, 75],   // Brown
    [227, 119, 194], // Pink
    [127, 127, 127], // Gray
    [188, 189, 34],  // Olive
    [23, 190, 207],  // Cyan
];

/// Accent for the single-target percent chart (slate blue).
pub const PERCENT_ACCENT: [u8; 3] = [106, 90, 205];

/// A year-vs-value line chart ready to draw on screen or to a PNG.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    /// Stable identifier, used for widget ids and exported file names.
    pub id: String,
    pub title: String,
    pub y_label: String,
    pub series: Vec<CategorySeries>,
    /// Fix the vertical axis to `[0, 100]`.
    pub percent_axis: bool,
    pub show_legend: bool,
    pub accent: Option<[u8; 3]>,
}

impl LineChart {
    /// Absolute values of the target over time.
    pub fn population(analysis: &Analysis) -> Self {
        let target = &analysis.params.target;
        Self {
            id: format!("population_{}", target),
            title: format!("{} population over time (CA)", target),
            y_label: "Population".to_string(),
            series: vec![analysis.target_series.clone()],
            percent_axis: false,
            show_legend: false,
            accent: None,
        }
    }

    /// Target as a share of `Total`, when available.
    pub fn target_percent(analysis: &Analysis) -> Option<Self> {
        let series = analysis.target_percent.as_ref().ok()?;
        let target = &analysis.params.target;
        Some(Self {
            id: format!("percent_{}", target),
            title: format!("{} as % of Total (CA)", target),
            y_label: "Percent of total (%)".to_string(),
            series: vec![series.clone()],
            percent_axis: true,
            show_legend: false,
            accent: Some(PERCENT_ACCENT),
        })
    }

    /// Absolute values of every compared population.
    pub fn comparison(analysis: &Analysis) -> Option<Self> {
        let series = analysis.comparison.as_ref()?.absolute.as_ref().ok()?;
        Some(Self {
            id: "compare_population".to_string(),
            title: "Selected populations (CA)".to_string(),
            y_label: "Population".to_string(),
            series: series.clone(),
            percent_axis: false,
            show_legend: true,
            accent: None,
        })
    }

    /// Compared populations as shares of `Total`, when available.
    pub fn comparison_percent(analysis: &Analysis) -> Option<Self> {
        let series = analysis.comparison.as_ref()?.percent.as_ref().ok()?;
        Some(Self {
            id: "compare_percent".to_string(),
            title: "Selected populations as % of Total (CA)".to_string(),
            y_label: "Percent of total (%)".to_string(),
            series: series.clone(),
            percent_axis: true,
            show_legend: true,
            accent: None,
        })
    }

    /// Every chart the analysis can show, in display order.
    pub fn all_for(analysis: &Analysis) -> Vec<Self> {
        let mut charts = vec![Self::population(analysis)];
        charts.extend(Self::target_percent(analysis));
        charts.extend(Self::comparison(analysis));
        charts.extend(Self::comparison_percent(analysis));
        charts
    }

    /// Color of the series at `index`.
    pub fn series_color(&self, index: usize) -> [u8; 3] {
        match self.accent {
            Some(color) if self.series.len() == 1 => color,
            _ => PALETTE[index % PALETTE.len()],
        }
    }

    /// Smallest and largest year across all series.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let years: Vec<i32> = self
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|(y, _)| *y))
            .collect();
        Some((*years.iter().min()?, *years.iter().max()?))
    }

    /// Largest present value across all series.
    pub fn max_value(&self) -> Option<f64> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().filter_map(|(_, v)| *v))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    }

    /// File-system safe version of the chart id.
    pub fn file_stem(&self) -> String {
        self.id
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

/// Split a series into runs of consecutive present values so missing years
/// show as gaps instead of being bridged.
pub fn segments(series: &CategorySeries) -> Vec<Vec<[f64; 2]>> {
    let mut runs: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();

    for (year, value) in &series.points {
        match value {
            Some(v) if v.is_finite() => current.push([*year as f64, *v]),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;
    use crate::metrics::{MetricsEngine, QueryParams};

    fn series(points: Vec<(i32, Option<f64>)>) -> CategorySeries {
        CategorySeries {
            category: "Black".to_string(),
            points,
        }
    }

    #[test]
    fn test_segments_break_on_missing() {
        let s = series(vec![
            (2015, Some(1.0)),
            (2016, None),
            (2017, Some(3.0)),
            (2018, Some(4.0)),
            (2019, None),
        ]);
        assert_eq!(
            segments(&s),
            vec![vec![[2015.0, 1.0]], vec![[2017.0, 3.0], [2018.0, 4.0]]]
        );
        assert!(segments(&series(vec![(2015, None)])).is_empty());
    }

    #[test]
    fn test_charts_for_analysis() {
        let csv = "Year,Total,White,Black\n2019,100,60,10\n2020,110,62,11\n";
        let ds = DataLoader::load_csv_bytes(csv.as_bytes()).unwrap();
        let params = QueryParams {
            start_year: 2019,
            end_year: 2020,
            target: "Black".to_string(),
            compare_targets: vec!["White".to_string(), "Black".to_string()],
        };
        let analysis = MetricsEngine::new(&ds).analyze(&params).unwrap();

        let charts = LineChart::all_for(&analysis);
        let ids: Vec<&str> = charts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["population_Black", "percent_Black", "compare_population", "compare_percent"]
        );
        assert_eq!(charts[1].series_color(0), PERCENT_ACCENT);
        assert_eq!(charts[3].series_color(1), PALETTE[1]);
        assert_eq!(charts[0].year_range(), Some((2019, 2020)));
        assert_eq!(charts[0].max_value(), Some(11.0));
    }

    #[test]
    fn test_file_stem_is_safe() {
        let s = series(vec![]);
        let chart = LineChart {
            id: "population_Two or More/Other".to_string(),
            title: String::new(),
            y_label: String::new(),
            series: vec![s],
            percent_axis: false,
            show_legend: false,
            accent: None,
        };
        assert_eq!(chart.file_stem(), "population_Two_or_More_Other");
    }
}
