use std::path::Path;

use chrono::Datelike;
use mortality_analysis::chart::AxisValue;
use mortality_analysis::commands::Pipeline;
use mortality_analysis::config::DateRangePreset;
use mortality_analysis::utils::dates::DateRange;
use mortality_analysis::{MemoryChartSink, TableStore};

use crate::utils::{date, flat_population, synthetic_deaths, synthetic_tables, test_config};

/// Pipeline over a store holding two years of synthetic data for Paris
fn seeded_pipeline(root: &Path) -> Pipeline<MemoryChartSink> {
    let config = test_config(root);
    let store = TableStore::open(&config.paths.store_dir).unwrap();

    let (deaths, temperatures) = synthetic_tables(&config.study_period);
    store.write("deces-synthetic", &deaths).unwrap();
    store.write("meteo", &temperatures).unwrap();
    let mut population = flat_population(2019, 10_000);
    population.extend(flat_population(2020, 10_000));
    store.write("pyramid", &population).unwrap();

    Pipeline::new(config, store, MemoryChartSink::default())
}

fn values(series: &mortality_analysis::Series) -> Vec<f64> {
    series.y.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

#[test]
fn test_all_charts_are_published() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = seeded_pipeline(dir.path());

    let paths = pipeline.all_charts().unwrap();
    let names: Vec<&str> = pipeline.sink.charts.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "mortality_by_age",
            "deaths_by_date",
            "population_by_age",
            "deaths_by_age",
            "standardized_mortality",
            "standardized_yearly_deaths",
            "temperature_factors_by_age",
            "mortality_by_temperature_est",
            "mortality_real_vs_est",
            "forecast_deaths_2020_2025",
            "forecast_population_2020_2025",
        ]
    );
    assert_eq!(paths.len(), names.len());
}

#[test]
fn test_preset_charts() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = seeded_pipeline(dir.path());
    let january: u64 = DateRange::new(date(2019, 1, 1), date(2019, 1, 31))
        .unwrap()
        .dates()
        .map(|d| synthetic_deaths(d) as u64)
        .sum();

    pipeline.mortality_by_age(&["winter-2019".to_string()]).unwrap();
    let chart = pipeline.sink.get("mortality_by_age_winter-2019").unwrap();
    assert_eq!(chart.series.len(), 1);
    let rates = values(&chart.series[0]);
    assert_eq!(rates.len(), 101);
    assert!((rates[80] - january as f64 / 10_000.0).abs() < 1e-12);
    assert_eq!(rates[79], 0.0);

    pipeline.deaths_by_date(&[]).unwrap();
    let chart = pipeline.sink.get("deaths_by_date").unwrap();
    assert_eq!(chart.series.len(), 2);
    assert_eq!(chart.series[0].x[0], AxisValue::Number(0.0));
    assert_eq!(chart.series[0].len(), 31);
    assert_eq!(
        chart.series[1].y[0],
        Some(synthetic_deaths(date(2020, 1, 1)) as f64)
    );
}

#[test]
fn test_presets_of_different_length_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = seeded_pipeline(dir.path());
    pipeline.config.date_presets.push(DateRangePreset {
        key: "short".to_string(),
        name: "Short".to_string(),
        year: 2019,
        range: DateRange::new(date(2019, 3, 1), date(2019, 3, 10)).unwrap(),
    });

    assert!(pipeline.deaths_by_age(&[]).is_err());
    assert!(pipeline.deaths_by_age(&["winter-2019".to_string(), "short".to_string()]).is_err());
    assert!(pipeline.deaths_by_age(&["unknown".to_string()]).is_err());
    assert!(pipeline.sink.charts.is_empty());
}

#[test]
fn test_standardized_index_is_one_over_summer() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = seeded_pipeline(dir.path());

    pipeline.standardized_mortality(None).unwrap();
    let chart = pipeline.sink.get("standardized_mortality").unwrap();
    let series = &chart.series[0];
    assert_eq!(series.len(), 731);

    let summer: Vec<f64> = series
        .x
        .iter()
        .zip(&series.y)
        .filter_map(|(x, y)| match x {
            AxisValue::Date(d) if d.year() == 2020 && (6..=8).contains(&d.month()) => *y,
            _ => None,
        })
        .collect();
    let mean = summer.iter().sum::<f64>() / summer.len() as f64;
    assert!((mean - 1.0).abs() < 1e-9);
}

#[test]
fn test_temperature_chart_names_carry_lag_and_ages() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = seeded_pipeline(dir.path());

    let paths = pipeline
        .estimate_temperature(3, Some("60-100".parse().unwrap()))
        .unwrap();
    assert_eq!(paths.len(), 2);
    assert!(pipeline.sink.get("mortality_by_temperature_est_delta3_ages_60_100").is_some());

    let comparison = pipeline.sink.get("mortality_real_vs_est_delta3_ages_60_100").unwrap();
    assert_eq!(comparison.series.len(), 2);
    assert_eq!(comparison.series[0].len(), comparison.series[1].len());

    pipeline.temperature_factors().unwrap();
    let factors = pipeline.sink.get("temperature_factors_by_age").unwrap();
    assert_eq!(factors.series.len(), 1);
    assert_eq!(factors.series[0].label, "80");
}

#[test]
fn test_cumulative_difference_and_forecast() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = seeded_pipeline(dir.path());
    let total = |year: i32| -> i64 {
        DateRange::years(year, year)
            .unwrap()
            .dates()
            .map(|d| synthetic_deaths(d) as i64)
            .sum()
    };

    pipeline.cumulative_difference(2019, 2020).unwrap();
    let chart = pipeline.sink.get("cumulative_difference_2019_2020").unwrap();
    let running = values(&chart.series[0]);
    assert_eq!(running.len(), 101);
    assert_eq!(running[100], (total(2020) - total(2019)) as f64);

    pipeline.forecast(2020, 2030, 2019, 2020).unwrap();
    let population = values(&pipeline.sink.get("forecast_population_2020_2030").unwrap().series[0]);
    assert_eq!(population.len(), 11);
    assert_eq!(population[0], 101.0 * 10_000.0);
    assert!(population.windows(2).all(|w| w[1] <= w[0]));

    let deaths = values(&pipeline.sink.get("forecast_deaths_2020_2030").unwrap().series[0]);
    let rate = (total(2019) as f64 + total(2020) as f64) / 2.0 / 10_000.0;
    assert!((deaths[0] - rate * 10_000.0).abs() < 1e-6);
}

#[test]
fn test_json_sink_writes_chart_files() {
    let dir = tempfile::tempdir().unwrap();
    let seeded = seeded_pipeline(dir.path());
    let mut pipeline = Pipeline::from_config(seeded.config).unwrap();

    let path = pipeline.standardized_yearly().unwrap();
    assert_eq!(path, dir.path().join("results").join("standardized_yearly_deaths.json"));

    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(json["name"], "standardized_yearly_deaths");
    assert_eq!(json["series"].as_array().unwrap().len(), 2);
}
