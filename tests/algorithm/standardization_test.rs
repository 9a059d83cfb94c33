use std::collections::BTreeMap;

use mortality_analysis::algorithm::{
    constant_population_deaths, cumulative_difference, mortality_rate_by_age,
    reweight_deaths, seasonal_index, standardized_mortality_by_date,
};
use mortality_analysis::config::SeasonalWindow;
use mortality_analysis::{DeathRecord, Sex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::utils::{date, population};

fn deaths_at(day: chrono::NaiveDate, birth: chrono::NaiveDate, n: usize) -> Vec<DeathRecord> {
    (0..n)
        .map(|_| DeathRecord::new(Sex::Male, birth, day, "75056"))
        .collect()
}

#[test]
fn test_two_age_standardization() {
    let pop_2019 = BTreeMap::from([(0, 100), (1, 90)]);
    let pop_2020 = BTreeMap::from([(0, 50), (1, 90)]);
    let deaths = BTreeMap::from([(0, 5), (1, 9)]);

    let rates = mortality_rate_by_age(&deaths, &pop_2019);
    assert!((rates[&0] - 0.05).abs() < 1e-12);
    assert!((rates[&1] - 0.10).abs() < 1e-12);

    let day = date(2019, 3, 1);
    let by_date_age = BTreeMap::from([((day, 0), 5), ((day, 1), 9)]);
    let reweighted = reweight_deaths(&by_date_age, &pop_2019, &pop_2020);
    assert!((reweighted[&(day, 0)] - 2.5).abs() < 1e-12);
    assert!((reweighted[&(day, 1)] - 9.0).abs() < 1e-12);
}

#[test]
fn test_standardized_series_from_records() {
    let day = date(2019, 3, 1);
    let mut deaths = deaths_at(day, date(2019, 1, 1), 5);
    deaths.extend(deaths_at(day, date(2018, 1, 1), 9));
    // Overseas deaths never count
    deaths.extend(deaths_at(day, date(2018, 1, 1), 4).into_iter().map(|mut r| {
        r.is_metropolitan = false;
        r
    }));

    let mut rows = population(2019, &[(0, 100), (1, 90)]);
    rows.extend(population(2020, &[(0, 50), (1, 90)]));

    let series = standardized_mortality_by_date(&deaths, &rows, 2019, 2020, None).unwrap();
    assert_eq!(series.len(), 731);
    assert!((series[&day] - 11.5).abs() < 1e-9);
    assert_eq!(series[&date(2020, 3, 1)], 0.0);

    let infants = standardized_mortality_by_date(&deaths, &rows, 2019, 2020, Some("0-0".parse().unwrap()))
        .unwrap();
    assert!((infants[&day] - 2.5).abs() < 1e-9);
}

#[test]
fn test_reference_year_equal_to_current_keeps_raw_counts() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut deaths = Vec::new();
    let mut expected: BTreeMap<chrono::NaiveDate, f64> = BTreeMap::new();
    for day in 1..=28 {
        let death_date = date(2019, 2, day);
        for age in [3, 40, 85] {
            let n = rng.random_range(0..20);
            deaths.extend(deaths_at(death_date, date(2018 - age, 1, 1), n));
            if n > 0 {
                *expected.entry(death_date).or_insert(0.0) += n as f64;
            }
        }
    }
    let rows = population(2019, &[(4, 1000), (41, 5000), (86, 800)]);

    let series = standardized_mortality_by_date(&deaths, &rows, 2019, 2019, None).unwrap();
    assert_eq!(series.len(), 365);
    for (day, value) in &series {
        let raw = expected.get(day).copied().unwrap_or(0.0);
        assert!((value - raw).abs() < 1e-9, "{day}: {value} != {raw}");
    }
}

#[test]
fn test_days_without_deaths_weigh_on_the_summer_mean() {
    let birth = date(1978, 8, 1);
    let mut deaths = deaths_at(date(2019, 1, 10), birth, 5);
    deaths.extend(deaths_at(date(2019, 6, 1), birth, 3));
    let rows = population(2019, &[(40, 100)]);

    let series = standardized_mortality_by_date(&deaths, &rows, 2019, 2019, None).unwrap();
    assert_eq!(series.len(), 365);
    assert_eq!(series[&date(2019, 7, 15)], 0.0);
    assert_eq!(series[&date(2019, 6, 1)], 3.0);

    // June to August holds 92 days, only one of them with deaths
    let index = seasonal_index(&series, &SeasonalWindow::default()).unwrap();
    let summer_mean = 3.0 / 92.0;
    assert!((index[&date(2019, 6, 1)] - 92.0).abs() < 1e-9);
    assert!((index[&date(2019, 1, 10)] - 5.0 / summer_mean).abs() < 1e-9);
    assert_eq!(index[&date(2019, 12, 31)], 0.0);
}

#[test]
fn test_missing_population_gives_zero() {
    let day = date(2019, 3, 1);
    let deaths = deaths_at(day, date(1950, 1, 1), 12);
    let rows = population(2019, &[(0, 100)]);

    let rates = mortality_rate_by_age(&BTreeMap::from([(69, 12)]), &BTreeMap::from([(0, 100)]));
    assert_eq!(rates[&69], 0.0);

    let series = standardized_mortality_by_date(&deaths, &rows, 2019, 2019, None).unwrap();
    assert_eq!(series[&day], 0.0);
}

#[test]
fn test_constant_population_deaths() {
    let deaths = BTreeMap::from([((2019, 0), 5), ((2019, 1), 9), ((2020, 1), 18)]);
    let pop = BTreeMap::from([
        ((2019, 0), 100),
        ((2019, 1), 90),
        ((2020, 0), 50),
        ((2020, 1), 90),
    ]);
    let totals = constant_population_deaths(&deaths, &pop, 2020);
    assert!((totals[&2019] - 11.5).abs() < 1e-9);
    assert!((totals[&2020] - 18.0).abs() < 1e-9);
}

#[test]
fn test_cumulative_difference_matches_running_sum() {
    let mut rng = StdRng::seed_from_u64(2020);
    let mut year1 = BTreeMap::new();
    let mut year2 = BTreeMap::new();
    for age in 0..=100u8 {
        if rng.random_bool(0.8) {
            year1.insert(age, rng.random_range(0..5000u64));
        }
        if rng.random_bool(0.8) {
            year2.insert(age, rng.random_range(0..5000u64));
        }
    }

    let result = cumulative_difference(&year1, &year2);
    assert_eq!(result.len(), 101);
    for (age, value) in result.iter().enumerate() {
        let mut expected = 0_i64;
        for a in 0..=age as u8 {
            expected += *year2.get(&a).unwrap_or(&0) as i64 - *year1.get(&a).unwrap_or(&0) as i64;
        }
        assert_eq!(*value, expected, "age {age}");
    }
}
