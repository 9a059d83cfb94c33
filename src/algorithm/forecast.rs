//! Closed-cohort death forecast
//!
//! Starting from one year's population by age, each projected year applies
//! fixed per-age mortality rates, removes the deaths and ages every cohort by
//! one year. There are no births and no migration, so the projected
//! population only shrinks.

use std::collections::BTreeMap;

use super::standardization::safe_div;
use crate::error::{Error, Result};
use crate::models::MAX_AGE;

/// Number of age bands, `0..=MAX_AGE`
pub const AGE_BANDS: usize = MAX_AGE as usize + 1;

/// State and outcome of one projected year
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastYear {
    pub year: i32,
    /// Population by age at the start of the year
    pub population: Vec<f64>,
    /// Deaths by age during the year
    pub deaths: Vec<f64>,
}

impl ForecastYear {
    #[must_use]
    pub fn total_population(&self) -> f64 {
        self.population.iter().sum()
    }

    #[must_use]
    pub fn total_deaths(&self) -> f64 {
        self.deaths.iter().sum()
    }
}

/// Per-age mean of yearly `deaths / population` over `first_year..=last_year`
///
/// A year without data for an age contributes a rate of 0.
pub fn average_mortality_rates(
    deaths_by_year_age: &BTreeMap<(i32, u8), u64>,
    population_by_year_age: &BTreeMap<(i32, u8), u64>,
    first_year: i32,
    last_year: i32,
) -> Result<Vec<f64>> {
    if last_year < first_year {
        return Err(Error::EmptyInput(format!(
            "rate window {first_year}-{last_year} holds no year"
        )));
    }
    let years = f64::from(last_year - first_year + 1);

    let mut rates = vec![0.0; AGE_BANDS];
    for (age, rate) in (0..=MAX_AGE).zip(rates.iter_mut()) {
        let sum: f64 = (first_year..=last_year)
            .map(|year| {
                let deaths = deaths_by_year_age.get(&(year, age)).copied().unwrap_or(0);
                let population = population_by_year_age.get(&(year, age)).copied().unwrap_or(0);
                safe_div(deaths as f64, population as f64)
            })
            .sum();
        *rate = sum / years;
    }
    Ok(rates)
}

/// Population vector from a `age -> count` map
#[must_use]
pub fn population_vector(population_by_age: &BTreeMap<u8, u64>) -> Vec<f64> {
    let mut population = vec![0.0; AGE_BANDS];
    for (age, count) in population_by_age {
        if let Some(slot) = population.get_mut(usize::from(*age)) {
            *slot += *count as f64;
        }
    }
    population
}

/// Project deaths for every year of `start_year..=end_year`
pub fn project_cohorts(
    initial: &[f64],
    rates: &[f64],
    start_year: i32,
    end_year: i32,
) -> Result<Vec<ForecastYear>> {
    if initial.len() != AGE_BANDS || rates.len() != AGE_BANDS {
        return Err(Error::EmptyInput(format!(
            "expected {AGE_BANDS} age bands, got {} populations and {} rates",
            initial.len(),
            rates.len()
        )));
    }
    if let Some((age, rate)) = rates
        .iter()
        .enumerate()
        .find(|(_, r)| !r.is_finite() || **r < 0.0)
    {
        return Err(Error::InvalidRate { age, rate: *rate });
    }
    if end_year < start_year {
        return Err(Error::Config(format!(
            "forecast ends ({end_year}) before it starts ({start_year})"
        )));
    }

    let mut population: Vec<f64> = initial.iter().map(|p| p.max(0.0)).collect();
    let mut years = Vec::with_capacity((end_year - start_year + 1) as usize);
    for year in start_year..=end_year {
        let deaths: Vec<f64> = population
            .iter()
            .zip(rates)
            .map(|(pop, rate)| (pop * rate).min(*pop))
            .collect();
        years.push(ForecastYear {
            year,
            population: population.clone(),
            deaths: deaths.clone(),
        });

        for (pop, dead) in population.iter_mut().zip(&deaths) {
            *pop = (*pop - dead).max(0.0);
        }
        age_cohorts(&mut population);
    }
    Ok(years)
}

/// Move every cohort up one band; the top band keeps its survivors
fn age_cohorts(population: &mut [f64]) {
    let last = population.len() - 1;
    let top = population[last] + population[last - 1];
    population.copy_within(0..last - 1, 1);
    population[0] = 0.0;
    population[last] = top;
}
