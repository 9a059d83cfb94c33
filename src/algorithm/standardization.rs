//! Age standardization of mortality
//!
//! Daily deaths of every year are reweighted to the age structure of a
//! reference year, so that years with older or younger populations can be
//! compared directly. The seasonal index then divides each day by the mean of
//! its year's summer, which is the period least affected by epidemics.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use itertools::Itertools;

use crate::aggregate::{self, DeathFilter};
use crate::config::SeasonalWindow;
use crate::error::{Error, Result};
use crate::models::{DeathRecord, MAX_AGE, PopulationRow};
use crate::utils::dates::{DateRange, SpanFilter};

/// One value per calendar date
pub type DailySeries = BTreeMap<NaiveDate, f64>;

/// `num / den`, or 0 when the denominator is 0
#[must_use]
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

/// Deaths divided by population, per age
///
/// Ages with deaths but no population get a rate of exactly 0.
#[must_use]
pub fn mortality_rate_by_age(
    deaths_by_age: &BTreeMap<u8, u64>,
    population_by_age: &BTreeMap<u8, u64>,
) -> BTreeMap<u8, f64> {
    deaths_by_age
        .iter()
        .map(|(age, deaths)| {
            let population = population_by_age.get(age).copied().unwrap_or(0);
            (*age, safe_div(*deaths as f64, population as f64))
        })
        .collect()
}

/// Reweight `(date, age)` death counts of one year to a reference population
///
/// `raw * reference(age) / population(age)`, 0 when the year's population of
/// that age is 0 or missing.
#[must_use]
pub fn reweight_deaths(
    deaths_by_date_age: &BTreeMap<(NaiveDate, u8), u64>,
    population: &BTreeMap<u8, u64>,
    reference: &BTreeMap<u8, u64>,
) -> BTreeMap<(NaiveDate, u8), f64> {
    deaths_by_date_age
        .iter()
        .map(|(&(date, age), &raw)| {
            let current = population.get(&age).copied().unwrap_or(0) as f64;
            let target = reference.get(&age).copied().unwrap_or(0) as f64;
            ((date, age), safe_div(raw as f64 * target, current))
        })
        .collect()
}

/// Standardized deaths per date for `first_year..=last_year`
///
/// The reference population is the one of `last_year`. Only metropolitan
/// deaths count; `ages` restricts the ages summed.
pub fn standardized_mortality_by_date(
    deaths: &[DeathRecord],
    population: &[PopulationRow],
    first_year: i32,
    last_year: i32,
    ages: Option<SpanFilter>,
) -> Result<DailySeries> {
    let range = DateRange::years(first_year, last_year)?;
    let filter = DeathFilter::metropolitan().within(range).with_ages(ages);
    let by_date_age = aggregate::deaths_by_date_age(deaths, &filter);
    let reference = aggregate::population_by_age(population, last_year);
    if reference.is_empty() {
        log::warn!("No population for reference year {last_year}, standardized values will be 0");
    }

    // Days without deaths are 0, not missing
    let mut standardized: DailySeries = range.dates().map(|date| (date, 0.0)).collect();
    for (year, rows) in &by_date_age.into_iter().chunk_by(|((date, _), _)| date.year()) {
        let year_population = aggregate::population_by_age(population, year);
        let year_deaths: BTreeMap<(NaiveDate, u8), u64> = rows.collect();
        for ((date, _), value) in reweight_deaths(&year_deaths, &year_population, &reference) {
            *standardized.entry(date).or_insert(0.0) += value;
        }
    }
    Ok(standardized)
}

/// Divide each date by the mean of its year's seasonal reference window
pub fn seasonal_index(series: &DailySeries, window: &SeasonalWindow) -> Result<DailySeries> {
    let mut references: BTreeMap<i32, f64> = BTreeMap::new();
    for year in series.keys().map(|d| d.year()).dedup() {
        let values: Vec<f64> = series
            .iter()
            .filter(|(date, _)| date.year() == year && window.contains(date.month()))
            .map(|(_, value)| *value)
            .collect();
        if values.is_empty() {
            return Err(Error::EmptyReferenceWindow { year });
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        if mean == 0.0 {
            return Err(Error::DivisionByZero(format!(
                "summer reference mortality of {year} is 0"
            )));
        }
        references.insert(year, mean);
    }

    Ok(series
        .iter()
        .map(|(date, value)| (*date, value / references[&date.year()]))
        .collect())
}

/// Yearly deaths re-expressed at the reference year's population
///
/// For each year with deaths: `Σ_age rate(year, age) · population(reference, age)`.
#[must_use]
pub fn constant_population_deaths(
    deaths_by_year_age: &BTreeMap<(i32, u8), u64>,
    population_by_year_age: &BTreeMap<(i32, u8), u64>,
    reference_year: i32,
) -> BTreeMap<i32, f64> {
    let mut totals = BTreeMap::new();
    for (&(year, age), &deaths) in deaths_by_year_age {
        let population = population_by_year_age.get(&(year, age)).copied().unwrap_or(0);
        let reference = population_by_year_age
            .get(&(reference_year, age))
            .copied()
            .unwrap_or(0);
        let rate = safe_div(deaths as f64, population as f64);
        *totals.entry(year).or_insert(0.0) += rate * reference as f64;
    }
    totals
}

/// Running sum over ages `0..=MAX_AGE` of `year2[age] - year1[age]`
#[must_use]
pub fn cumulative_difference(year1: &BTreeMap<u8, u64>, year2: &BTreeMap<u8, u64>) -> Vec<i64> {
    let count = |map: &BTreeMap<u8, u64>, age: u8| {
        i64::try_from(map.get(&age).copied().unwrap_or(0)).unwrap_or(i64::MAX)
    };
    (0..=MAX_AGE)
        .scan(0_i64, |acc, age| {
            *acc += count(year2, age) - count(year1, age);
            Some(*acc)
        })
        .collect()
}
