//! `forecast`: project deaths of the current population

use std::path::PathBuf;

use anyhow::{Context, ensure};

use super::Pipeline;
use crate::aggregate::{self, DeathFilter};
use crate::algorithm::{average_mortality_rates, population_vector, project_cohorts};
use crate::chart::{Chart, ChartName, ChartSink, Series};
use crate::utils::dates::{DateRange, SpanFilter};
use crate::utils::logging::console::print_forecast_summary;

/// History years of a `--history a-b` span
pub fn history_years(span: SpanFilter) -> anyhow::Result<(i32, i32)> {
    let year = |value: u32| {
        i32::try_from(value).with_context(|| format!("History year {value} is out of range"))
    };
    Ok((year(span.min)?, year(span.max)?))
}

impl<S: ChartSink> Pipeline<S> {
    /// Project yearly deaths from `start`'s population with rates averaged
    /// over `history_first..=history_last`
    pub fn forecast(
        &mut self,
        start: i32,
        end: i32,
        history_first: i32,
        history_last: i32,
    ) -> anyhow::Result<Vec<PathBuf>> {
        let deaths = self.store.deaths()?;
        let population = self.store.population()?;

        let history = DateRange::years(history_first, history_last)?;
        let by_year_age =
            aggregate::deaths_by_year_age(&deaths, &DeathFilter::metropolitan().within(history));
        let rates = average_mortality_rates(
            &by_year_age,
            &aggregate::population_by_year_age(&population),
            history_first,
            history_last,
        )
        .context("Failed to average mortality rates")?;

        let initial = aggregate::population_by_age(&population, start);
        ensure!(!initial.is_empty(), "No population imported for {start}");
        let years = project_cohorts(&population_vector(&initial), &rates, start, end)
            .context("Failed to project cohorts")?;
        print_forecast_summary(&years);

        let name = |base: &str| ChartName::new(base).suffix(format!("{start}_{end}")).to_string();
        let deaths_chart = Chart::new(
            name("forecast_deaths"),
            format!("Projected deaths (rates of {history_first}-{history_last})"),
        )
        .axes("year", "deaths")
        .with_series(Series::line(
            "projected",
            years.iter().map(|y| (y.year, y.total_deaths())),
        ));
        let population_chart = Chart::new(name("forecast_population"), "Projected population without births")
            .axes("year", "population")
            .with_series(Series::line(
                "projected",
                years.iter().map(|y| (y.year, y.total_population())),
            ));

        Ok(vec![self.publish(&deaths_chart)?, self.publish(&population_chart)?])
    }
}
