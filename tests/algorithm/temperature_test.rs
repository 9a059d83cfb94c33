use std::collections::BTreeMap;

use chrono::NaiveDate;
use mortality_analysis::algorithm::{
    DailySeries, FitError, bucket_by_temperature, estimated_mortality_by_date, fit_quadratic,
    mortality_temperature_pairs, temperature_by_date, temperature_factors_by_age,
    weighted_temperature_by_date,
};
use mortality_analysis::config::SeasonalWindow;
use mortality_analysis::utils::dates::DateRange;

use crate::utils::{date, synthetic_temperature};

fn parabola(t: f64) -> f64 {
    0.002 * t * t - 0.06 * t + 1.5
}

/// Two departments whose mean is the synthetic temperature
fn department_temperatures(range: &DateRange) -> BTreeMap<(NaiveDate, String), f64> {
    let mut temps = BTreeMap::new();
    for day in range.dates() {
        let t = synthetic_temperature(day);
        temps.insert((day, "13".to_string()), t + 2.0);
        temps.insert((day, "59".to_string()), t - 2.0);
    }
    temps
}

#[test]
fn test_fit_recovers_parabola_through_lagged_pairs() {
    let range = DateRange::years(2019, 2019).unwrap();
    let temps = temperature_by_date(&department_temperatures(&range));

    // Mortality follows the temperature of two days earlier
    let mortality: DailySeries = range
        .dates()
        .skip(2)
        .map(|day| (day, parabola(temps[&(day - chrono::Days::new(2))])))
        .collect();

    let pairs = mortality_temperature_pairs(&mortality, &temps, 2);
    // The first `lag` mortality dates have no pair
    assert_eq!(pairs.len(), mortality.len() - 2);

    let fit = fit_quadratic(&pairs).unwrap();
    assert!((fit.a - 0.002).abs() < 1e-9);
    assert!((fit.b + 0.06).abs() < 1e-7);
    assert!((fit.c - 1.5).abs() < 1e-6);
    assert!(fit.r_squared > 0.999_999);
    assert_eq!(fit.buckets, 30);

    let buckets = bucket_by_temperature(&pairs);
    assert!((buckets[&20] - parabola(20.0)).abs() < 1e-9);
}

#[test]
fn test_estimate_replays_fit_on_weighted_temperatures() {
    let range = DateRange::new(date(2020, 1, 1), date(2020, 3, 31)).unwrap();
    let by_department = department_temperatures(&range);
    let temps = temperature_by_date(&by_department);
    let mortality: DailySeries = range.dates().map(|day| (day, parabola(temps[&day]))).collect();
    let fit = fit_quadratic(&mortality_temperature_pairs(&mortality, &temps, 0)).unwrap();

    // All the weight on department 13
    let weights = BTreeMap::from([("13".to_string(), 500), ("59".to_string(), 0)]);
    let weighted = weighted_temperature_by_date(&by_department, &weights);
    let day = date(2020, 2, 10);
    assert!((weighted[&day] - (synthetic_temperature(day) + 2.0)).abs() < 1e-12);

    let estimate = estimated_mortality_by_date(&mortality, &weighted, &fit, 0);
    assert_eq!(estimate.len(), mortality.len());
    assert!((estimate[&day] - parabola(synthetic_temperature(day) + 2.0)).abs() < 1e-6);

    // The first dates of a lagged estimate reuse the first temperature
    let lagged = estimated_mortality_by_date(&mortality, &weighted, &fit, 5);
    let first = date(2020, 1, 1);
    assert_eq!(lagged[&date(2020, 1, 3)], lagged[&first]);
}

#[test]
fn test_fit_needs_three_buckets() {
    let pairs = [(10.1, 1.0), (10.2, 1.1), (11.0, 1.2)];
    assert_eq!(fit_quadratic(&pairs), Err(FitError::NotEnoughBuckets(2)));
}

#[test]
fn test_temperature_factors_against_summer_baseline() {
    let period = DateRange::years(2019, 2019).unwrap();
    let window = SeasonalWindow::default();
    let mut deaths = BTreeMap::new();
    let mut temps = BTreeMap::new();
    for day in period.dates() {
        let cold = day == date(2019, 1, 15);
        // One death a day, three on the cold day
        deaths.insert((day, "75".to_string(), 80u8), if cold { 3 } else { 1 });
        temps.insert((day, "75".to_string()), if cold { -5.0 } else { 15.0 });
    }

    let factors = temperature_factors_by_age(&deaths, &temps, &period, &window);
    assert!((factors[&(80, -5)] - 3.0).abs() < 1e-12);
    assert!((factors[&(80, 15)] - 1.0).abs() < 1e-12);
}
