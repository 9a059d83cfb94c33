//! Mortality against temperature
//!
//! Joins the seasonal mortality index with daily temperatures, optionally
//! lagged by a number of days, and derives the series needed to fit and
//! replay a mortality-by-temperature curve.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rustc_hash::FxHashMap;

use super::regression::QuadraticFit;
use super::standardization::{DailySeries, safe_div};
use crate::config::SeasonalWindow;
use crate::utils::dates::{DateRange, add_days};

/// Mean temperature across departments, per date
#[must_use]
pub fn temperature_by_date(by_date_department: &BTreeMap<(NaiveDate, String), f64>) -> DailySeries {
    let mut sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for ((date, _), temperature) in by_date_department {
        let entry = sums.entry(*date).or_insert((0.0, 0));
        entry.0 += temperature;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(date, (sum, n))| (date, sum / n as f64))
        .collect()
}

/// `(temperature, mortality)` pairs with temperature taken `lag` days earlier
///
/// Only dates at least `lag` days after the first mortality date take part.
/// Dates whose lagged temperature is missing are skipped.
#[must_use]
pub fn mortality_temperature_pairs(
    mortality: &DailySeries,
    temperatures: &DailySeries,
    lag: u32,
) -> Vec<(f64, f64)> {
    let Some(first) = mortality.keys().min() else {
        return Vec::new();
    };
    let lag = i64::from(lag);
    let earliest = add_days(*first, lag);

    mortality
        .iter()
        .filter(|(date, _)| **date >= earliest)
        .filter_map(|(date, value)| {
            temperatures
                .get(&add_days(*date, -lag))
                .map(|temperature| (*temperature, *value))
        })
        .collect()
}

/// Mean mortality per integer-rounded temperature
#[must_use]
pub fn bucket_by_temperature(pairs: &[(f64, f64)]) -> BTreeMap<i32, f64> {
    let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for (temperature, mortality) in pairs {
        let entry = sums.entry(temperature.round() as i32).or_insert((0.0, 0));
        entry.0 += mortality;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(bucket, (sum, n))| (bucket, sum / n as f64))
        .collect()
}

/// Department temperatures averaged with death-count weights, per date
///
/// `weights` maps a department to its total historical death count. Dates
/// where no department carries weight are left out.
#[must_use]
pub fn weighted_temperature_by_date(
    by_date_department: &BTreeMap<(NaiveDate, String), f64>,
    weights: &BTreeMap<String, u64>,
) -> DailySeries {
    let mut sums: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for ((date, department), temperature) in by_date_department {
        let weight = weights.get(department).copied().unwrap_or(0) as f64;
        let entry = sums.entry(*date).or_insert((0.0, 0.0));
        entry.0 += temperature * weight;
        entry.1 += weight;
    }
    sums.into_iter()
        .filter(|(_, (_, total))| *total > 0.0)
        .map(|(date, (sum, total))| (date, sum / total))
        .collect()
}

/// Mortality predicted by a fitted curve, per mortality date
///
/// The temperature used for date `d` is the weighted temperature of
/// `max(first date, d - lag)`. Dates without that temperature are skipped.
#[must_use]
pub fn estimated_mortality_by_date(
    mortality: &DailySeries,
    weighted_temperatures: &DailySeries,
    fit: &QuadraticFit,
    lag: u32,
) -> DailySeries {
    let Some(first) = mortality.keys().min().copied() else {
        return DailySeries::new();
    };
    mortality
        .keys()
        .filter_map(|date| {
            let source = add_days(*date, -i64::from(lag)).max(first);
            weighted_temperatures
                .get(&source)
                .map(|temperature| (*date, fit.evaluate(*temperature)))
        })
        .collect()
}

/// Excess-death factor per (age, rounded temperature)
///
/// Each (date, department, age) observation with a temperature contributes
/// its deaths and its summer baseline: the mean daily deaths of that year,
/// department and age over the seasonal window. The factor is
/// `Σ deaths / max(Σ baseline, 1)`.
#[must_use]
pub fn temperature_factors_by_age(
    deaths: &BTreeMap<(NaiveDate, String, u8), u64>,
    temperatures: &BTreeMap<(NaiveDate, String), f64>,
    period: &DateRange,
    window: &SeasonalWindow,
) -> BTreeMap<(u8, i32), f64> {
    let summer_days = summer_day_counts(period, window);

    let mut observed: FxHashMap<(NaiveDate, &str, u8), u64> = FxHashMap::default();
    let mut baseline_sums: FxHashMap<(i32, &str, u8), u64> = FxHashMap::default();
    let mut ages_by_department: BTreeMap<&str, Vec<u8>> = BTreeMap::new();
    for ((date, department, age), count) in deaths {
        if !period.contains(date) {
            continue;
        }
        observed.insert((*date, department.as_str(), *age), *count);
        let ages = ages_by_department.entry(department.as_str()).or_default();
        if !ages.contains(age) {
            ages.push(*age);
        }
        if window.contains(date.month()) {
            *baseline_sums.entry((date.year(), department.as_str(), *age)).or_insert(0) += count;
        }
    }
    let baseline = |year: i32, department: &str, age: u8| {
        let days = summer_days.get(&year).copied().unwrap_or(0);
        let total = baseline_sums.get(&(year, department, age)).copied().unwrap_or(0);
        safe_div(total as f64, days as f64)
    };

    let mut sums: BTreeMap<(u8, i32), (f64, f64)> = BTreeMap::new();
    for ((date, department), temperature) in temperatures {
        if !period.contains(date) {
            continue;
        }
        let Some(ages) = ages_by_department.get(department.as_str()) else {
            continue;
        };
        let bucket = temperature.round() as i32;
        for age in ages {
            let count = observed
                .get(&(*date, department.as_str(), *age))
                .copied()
                .unwrap_or(0);
            let entry = sums.entry((*age, bucket)).or_insert((0.0, 0.0));
            entry.0 += count as f64;
            entry.1 += baseline(date.year(), department, *age);
        }
    }

    sums.into_iter()
        .map(|(key, (observed, expected))| (key, observed / expected.max(1.0)))
        .collect()
}

/// Number of days of each year of the period that fall in the seasonal window
fn summer_day_counts(period: &DateRange, window: &SeasonalWindow) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for date in period.dates().filter(|d| window.contains(d.month())) {
        *counts.entry(date.year()).or_insert(0) += 1;
    }
    counts
}
