//! Shared fixtures for the integration tests

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use mortality_analysis::config::DateRangePreset;
use mortality_analysis::utils::dates::DateRange;
use mortality_analysis::{AnalysisConfig, DeathRecord, PopulationRow, Sex, TemperatureRecord};

#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A fixed-width death file line with the fields at their byte offsets
#[must_use]
pub fn death_line(sex: &str, birth: &str, death: &str, location: &str) -> String {
    let mut line = vec![b' '; 200];
    line[80..80 + sex.len()].copy_from_slice(sex.as_bytes());
    line[81..81 + birth.len()].copy_from_slice(birth.as_bytes());
    line[154..154 + death.len()].copy_from_slice(death.as_bytes());
    line[162..162 + location.len()].copy_from_slice(location.as_bytes());
    String::from_utf8(line).unwrap()
}

/// Population rows of one year
#[must_use]
pub fn population(year: i32, counts: &[(u8, u64)]) -> Vec<PopulationRow> {
    counts
        .iter()
        .map(|&(age, count)| PopulationRow { year, age, count })
        .collect()
}

/// Same count at every age
#[must_use]
pub fn flat_population(year: i32, count: u64) -> Vec<PopulationRow> {
    (0..=100).map(|age| PopulationRow { year, age, count }).collect()
}

/// Configuration rooted in a temporary directory, studying 2019-2020
#[must_use]
pub fn test_config(root: &Path) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.paths.data_dir = root.join("data");
    config.paths.store_dir = root.join("store");
    config.paths.results_dir = root.join("results");
    config.study_period = DateRange::years(2019, 2020).unwrap();
    config.date_presets = vec![
        DateRangePreset {
            key: "winter-2019".to_string(),
            name: "Winter 2019".to_string(),
            year: 2019,
            range: DateRange::new(date(2019, 1, 1), date(2019, 1, 31)).unwrap(),
        },
        DateRangePreset {
            key: "winter-2020".to_string(),
            name: "Winter 2020".to_string(),
            year: 2020,
            range: DateRange::new(date(2020, 1, 1), date(2020, 1, 31)).unwrap(),
        },
    ];
    config.forecast.history_first_year = 2019;
    config.forecast.history_last_year = 2020;
    config.forecast.start_year = 2020;
    config.forecast.end_year = 2025;
    config.temperature_chart_ages = vec![80];
    config
}

/// Synthetic temperature of a date: cycles through 5..=34 °C
#[must_use]
pub fn synthetic_temperature(day: NaiveDate) -> f64 {
    5.0 + f64::from(day.ordinal() % 30)
}

/// Deaths of a date, a parabola in its temperature
#[must_use]
pub fn synthetic_deaths(day: NaiveDate) -> usize {
    let t = synthetic_temperature(day);
    10 + ((t - 20.0) * (t - 20.0) / 10.0).round() as usize
}

/// Deaths and temperatures of department 75 over a date range
#[must_use]
pub fn synthetic_tables(range: &DateRange) -> (Vec<DeathRecord>, Vec<TemperatureRecord>) {
    let mut deaths = Vec::new();
    let mut temperatures = Vec::new();
    for day in range.dates() {
        let birth = date(day.year() - 80, 1, 1);
        for _ in 0..synthetic_deaths(day) {
            deaths.push(DeathRecord::new(Sex::Female, birth, day, "75056"));
        }
        temperatures.push(TemperatureRecord {
            date: day,
            department: "75".to_string(),
            temperature: synthetic_temperature(day),
        });
    }
    (deaths, temperatures)
}
