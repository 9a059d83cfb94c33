//! Mortality against temperature charts

use std::path::PathBuf;

use anyhow::Context;
use chrono::Datelike;
use itertools::Itertools;

use super::Pipeline;
use crate::aggregate::{self, DeathFilter};
use crate::algorithm::{
    bucket_by_temperature, estimated_mortality_by_date, fit_quadratic, mortality_temperature_pairs,
    seasonal_index, standardized_mortality_by_date, temperature_by_date, temperature_factors_by_age,
    weighted_temperature_by_date,
};
use crate::chart::{Chart, ChartName, ChartSink, Series};
use crate::utils::dates::SpanFilter;
use crate::utils::logging::console::print_fit_report;

/// Points drawn along a fitted curve
const CURVE_POINTS: usize = 100;

impl<S: ChartSink> Pipeline<S> {
    /// Excess-death factor by temperature for the configured ages
    pub fn temperature_factors(&mut self) -> anyhow::Result<PathBuf> {
        let period = self.config.study_period;
        let deaths = self.store.deaths()?;
        let by_date_department_age =
            aggregate::deaths_by_date_department_age(&deaths, &DeathFilter::metropolitan().within(period));
        drop(deaths);
        let temperatures = aggregate::temperatures_by_date_department(&self.store.temperatures()?);

        let factors = temperature_factors_by_age(
            &by_date_department_age,
            &temperatures,
            &period,
            &self.config.seasonal_window,
        );
        let buckets: Vec<i32> = factors.keys().map(|(_, t)| *t).sorted().dedup().collect();

        let mut chart = Chart::new(
            "temperature_factors_by_age",
            "Mortality factor by age and temperature",
        )
        .axes("temperature (°C)", "deaths / summer baseline");
        for age in &self.config.temperature_chart_ages {
            chart = chart.with_series(Series::line_with_gaps(
                age.to_string(),
                buckets.iter().map(|t| (*t, factors.get(&(*age, *t)).copied())),
            ));
        }
        self.publish(&chart)
    }

    /// Fit mortality against (lagged) temperature and replay the fit
    ///
    /// Publishes the scatter with its fitted curve, then the observed index
    /// against the index estimated from death-weighted temperatures.
    pub fn estimate_temperature(&mut self, lag: u32, ages: Option<SpanFilter>) -> anyhow::Result<Vec<PathBuf>> {
        let period = self.config.study_period;
        let deaths = self.store.deaths()?;
        let population = self.store.population()?;
        let temperatures = aggregate::temperatures_by_date_department(&self.store.temperatures()?);

        let standardized = standardized_mortality_by_date(
            &deaths,
            &population,
            period.start.year(),
            period.end.year(),
            ages,
        )?;
        let index = seasonal_index(&standardized, &self.config.seasonal_window)
            .context("Failed to compute the seasonal mortality index")?;

        let pairs = mortality_temperature_pairs(&index, &temperature_by_date(&temperatures), lag);
        let fit = fit_quadratic(&pairs).context("Failed to fit mortality against temperature")?;
        print_fit_report(&fit, lag);

        let (low, high) = pairs
            .iter()
            .map(|(t, _)| *t)
            .minmax()
            .into_option()
            .context("No temperature paired with mortality")?;
        let step = (high - low) / (CURVE_POINTS - 1) as f64;
        let curve = (0..CURVE_POINTS).map(|i| {
            let t = low + step * i as f64;
            (t, fit.evaluate(t))
        });

        let scatter_chart = Chart::new(
            ChartName::new("mortality_by_temperature_est").lag(lag).ages(ages).to_string(),
            "Mortality by temperature",
        )
        .axes("temperature (°C)", "mortality index")
        .with_series(Series::scatter("observed", pairs.iter().copied()))
        .with_series(Series::line("bucket mean", bucket_by_temperature(&pairs)))
        .with_series(Series::line("fit", curve));

        let weights = aggregate::deaths_by_department(&deaths, &DeathFilter::all());
        let weighted = weighted_temperature_by_date(&temperatures, &weights);
        let estimate = estimated_mortality_by_date(&index, &weighted, &fit, lag);

        let comparison_chart = Chart::new(
            ChartName::new("mortality_real_vs_est").lag(lag).ages(ages).to_string(),
            "Observed vs estimated mortality",
        )
        .axes("date", "mortality index")
        .with_series(Series::line("observed", index))
        .with_series(Series::line("estimated", estimate));

        Ok(vec![self.publish(&scatter_chart)?, self.publish(&comparison_chart)?])
    }
}
