//! End-to-end checks: CSV on disk -> normalized table -> analysis -> charts.

use ca_population_dashboard::charts::LineChart;
use ca_population_dashboard::metrics::{round2, DEFAULT_START_YEAR};
use ca_population_dashboard::{DataLoader, MetricsEngine, MetricsError, QueryParams};
use std::io::Write;
use tempfile::NamedTempFile;

/// Re-exported table: leading index column, padded headers, unsorted years,
/// a gap year (2019) and one unparseable cell.
const CDPH_EXPORT: &str = "\
,Year,Total , White,Black,Asian ,Hispanic
4,2020,39368078,14365145,2184000,6085947,15579652
0,2015,39144818,15012451,2200000,5608120,15184545
1,2016,39250017,14925680,2196570,5694220,15317850
2,2017,39358497,14826043,2194029,5780650,15430360
3,2018,39461588,14726850,2190420,5867450,n/a
";

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_and_analyze_cdph_export() {
    let file = write_csv(CDPH_EXPORT);
    let dataset = DataLoader::load_csv(file.path()).unwrap();

    assert_eq!(dataset.years(), vec![2015, 2016, 2017, 2018, 2020]);
    assert_eq!(
        dataset.categories(),
        &["Total", "White", "Black", "Asian", "Hispanic"].map(String::from)
    );

    let engine = MetricsEngine::new(&dataset);
    assert_eq!(engine.year_bounds(), (2015, 2020));

    let params = QueryParams {
        start_year: 2015,
        end_year: 2020,
        target: "Black".to_string(),
        compare_targets: vec!["Black".to_string(), "Hispanic".to_string()],
    };
    let analysis = engine.analyze(&params).unwrap();

    let change = analysis.change.as_ref().unwrap();
    assert_eq!(change.initial, Some(2200000));
    assert_eq!(change.final_value, Some(2184000));
    assert_eq!(change.percent_change, Some(-0.73));

    let pct = analysis.target_percent.as_ref().unwrap();
    let (year, value) = *pct.points.last().unwrap();
    assert_eq!(year, 2020);
    assert_eq!(round2(value.unwrap()), 5.55);

    let comparison = analysis.comparison.as_ref().unwrap();
    let hispanic = &comparison.percent.as_ref().unwrap()[1];
    assert_eq!(hispanic.points[3], (2018, None));

    let charts = LineChart::all_for(&analysis);
    assert_eq!(charts.len(), 4);
    assert!(charts.iter().filter(|c| c.percent_axis).count() == 2);
}

#[test]
fn test_gap_year_reports_year_not_found() {
    let file = write_csv(CDPH_EXPORT);
    let dataset = DataLoader::load_csv(file.path()).unwrap();
    let engine = MetricsEngine::new(&dataset);

    let mut params = QueryParams::defaults_for(&dataset, DEFAULT_START_YEAR);
    params.end_year = 2019;

    let analysis = engine.analyze(&params).unwrap();
    assert_eq!(
        analysis.change.unwrap_err(),
        MetricsError::YearNotFound { year: 2019 }
    );
    // The charts still cover the rows that do exist
    assert_eq!(analysis.view.years(), vec![2017, 2018]);
}

#[test]
fn test_without_total_only_percentages_are_unavailable() {
    let file = write_csv("Year,White,Black\n2019,100,10\n2020,110,12\n");
    let dataset = DataLoader::load_csv(file.path()).unwrap();
    let engine = MetricsEngine::new(&dataset);

    let params = QueryParams::defaults_for(&dataset, DEFAULT_START_YEAR);
    assert_eq!(params.target, "White");
    assert_eq!(params.compare_targets, vec!["White".to_string()]);

    let analysis = engine.analyze(&params).unwrap();
    assert_eq!(analysis.target_percent.unwrap_err(), MetricsError::MissingTotal);

    let comparison = analysis.comparison.unwrap();
    assert_eq!(comparison.percent.unwrap_err(), MetricsError::MissingTotal);
    assert_eq!(
        comparison.absolute.unwrap()[0].points,
        vec![(2019, Some(100.0)), (2020, Some(110.0))]
    );
}

#[test]
fn test_reversed_range_is_rejected_without_swapping() {
    let file = write_csv(CDPH_EXPORT);
    let dataset = DataLoader::load_csv(file.path()).unwrap();
    let engine = MetricsEngine::new(&dataset);

    let err = engine.validate_and_filter(2020, 2015).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Dates don't work. Start year must be <= end year."
    );
}
