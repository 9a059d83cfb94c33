//! Age-standardized mortality charts

use std::path::PathBuf;

use anyhow::Context;
use chrono::Datelike;

use super::Pipeline;
use crate::aggregate::{self, DeathFilter};
use crate::algorithm::{constant_population_deaths, seasonal_index, standardized_mortality_by_date};
use crate::chart::{Chart, ChartName, ChartSink, Series};
use crate::utils::dates::SpanFilter;

impl<S: ChartSink> Pipeline<S> {
    /// Daily standardized mortality as a multiple of each year's summer level
    pub fn standardized_mortality(&mut self, ages: Option<SpanFilter>) -> anyhow::Result<PathBuf> {
        let deaths = self.store.deaths()?;
        let population = self.store.population()?;
        let period = self.config.study_period;

        let standardized = standardized_mortality_by_date(
            &deaths,
            &population,
            period.start.year(),
            period.end.year(),
            ages,
        )?;
        let index = seasonal_index(&standardized, &self.config.seasonal_window)
            .context("Failed to compute the seasonal mortality index")?;

        let chart = Chart::new(
            ChartName::new("standardized_mortality").ages(ages).to_string(),
            format!(
                "Standardized mortality (population of {}), relative to summer",
                period.end.year()
            ),
        )
        .axes("date", "mortality index")
        .with_series(Series::line("standardized", index));
        self.publish(&chart)
    }

    /// Yearly deaths at constant population next to the raw yearly deaths
    pub fn standardized_yearly(&mut self) -> anyhow::Result<PathBuf> {
        let deaths = self.store.deaths()?;
        let population = self.store.population()?;
        let period = self.config.study_period;
        let reference_year = period.end.year();

        let by_year_age =
            aggregate::deaths_by_year_age(&deaths, &DeathFilter::metropolitan().within(period));
        let constant = constant_population_deaths(
            &by_year_age,
            &aggregate::population_by_year_age(&population),
            reference_year,
        );
        let raw = by_year_age
            .iter()
            .fold(std::collections::BTreeMap::new(), |mut totals, (&(year, _), &n)| {
                *totals.entry(year).or_insert(0.0) += n as f64;
                totals
            });

        let chart = Chart::new("standardized_yearly_deaths", "Yearly deaths")
            .axes("year", "deaths")
            .with_series(Series::line("observed", raw))
            .with_series(Series::line(
                format!("at {reference_year} population"),
                constant,
            ));
        self.publish(&chart)
    }
}
