//! Computation engines
//!
//! Age standardization, the mortality/temperature correlation with its
//! quadratic fit, and the closed-cohort forecast. All of them work on the
//! ordered maps produced by [`crate::aggregate`].

pub mod forecast;
pub mod regression;
pub mod standardization;
pub mod temperature;

pub use forecast::{AGE_BANDS, ForecastYear, average_mortality_rates, population_vector, project_cohorts};
pub use regression::{FitError, QuadraticFit, fit_quadratic};
pub use standardization::{
    DailySeries, constant_population_deaths, cumulative_difference, mortality_rate_by_age,
    reweight_deaths, safe_div, seasonal_index, standardized_mortality_by_date,
};
pub use temperature::{
    bucket_by_temperature, estimated_mortality_by_date, mortality_temperature_pairs,
    temperature_by_date, temperature_factors_by_age, weighted_temperature_by_date,
};
