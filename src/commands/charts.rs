//! Side-by-side charts of the configured date presets
//!
//! Presets drawn together must span the same number of days so that their
//! series line up.

use std::path::PathBuf;

use anyhow::Context;

use super::Pipeline;
use crate::aggregate::{self, DeathFilter};
use crate::algorithm::{cumulative_difference, mortality_rate_by_age};
use crate::chart::{Chart, ChartName, ChartSink, Series};
use crate::config::{DateRangePreset, ensure_same_duration};
use crate::models::MAX_AGE;
use crate::utils::dates::DateRange;

impl<S: ChartSink> Pipeline<S> {
    fn selected_presets(&self, keys: &[String]) -> anyhow::Result<Vec<DateRangePreset>> {
        let presets = self.config.presets(keys)?;
        ensure_same_duration(&presets)?;
        Ok(presets.into_iter().cloned().collect())
    }

    /// Metropolitan mortality rate by age for each preset
    pub fn mortality_by_age(&mut self, keys: &[String]) -> anyhow::Result<PathBuf> {
        let presets = self.selected_presets(keys)?;
        let deaths = self.store.deaths()?;
        let population = self.store.population()?;

        let mut chart = Chart::new(preset_chart_name("mortality_by_age", keys), "Mortality rate by age")
            .axes("age", "deaths / population");
        for preset in &presets {
            let filter = DeathFilter::metropolitan().within(preset.range);
            let rates = mortality_rate_by_age(
                &aggregate::deaths_by_age(&deaths, &filter),
                &aggregate::population_by_age(&population, preset.year),
            );
            chart = chart.with_series(Series::line(
                preset.name.clone(),
                (0..=MAX_AGE).map(|age| (age, rates.get(&age).copied().unwrap_or(0.0))),
            ));
        }
        self.publish(&chart)
    }

    /// Deaths per day for each preset, indexed by day offset
    pub fn deaths_by_date(&mut self, keys: &[String]) -> anyhow::Result<PathBuf> {
        let presets = self.selected_presets(keys)?;
        let deaths = self.store.deaths()?;

        let mut chart = Chart::new(preset_chart_name("deaths_by_date", keys), "Deaths by date")
            .axes("day", "deaths");
        for preset in &presets {
            let by_date = aggregate::deaths_by_date(&deaths, &DeathFilter::all().within(preset.range));
            chart = chart.with_series(Series::line(
                preset.name.clone(),
                (0..).zip(preset.range.dates()).map(|(day, date)| {
                    (day, by_date.get(&date).copied().unwrap_or(0) as f64)
                }),
            ));
        }
        self.publish(&chart)
    }

    /// Population by age of each preset's year
    pub fn population_by_age(&mut self, keys: &[String]) -> anyhow::Result<PathBuf> {
        let presets = self.selected_presets(keys)?;
        let population = self.store.population()?;

        let mut chart = Chart::new(preset_chart_name("population_by_age", keys), "Population by age")
            .axes("age", "population");
        for preset in &presets {
            let by_age = aggregate::population_by_age(&population, preset.year);
            chart = chart.with_series(Series::line(
                preset.year.to_string(),
                (0..=MAX_AGE).map(|age| (age, by_age.get(&age).copied().unwrap_or(0) as f64)),
            ));
        }
        self.publish(&chart)
    }

    /// Deaths by age for each preset
    pub fn deaths_by_age(&mut self, keys: &[String]) -> anyhow::Result<PathBuf> {
        let presets = self.selected_presets(keys)?;
        let deaths = self.store.deaths()?;

        let mut chart = Chart::new(preset_chart_name("deaths_by_age", keys), "Deaths by age")
            .axes("age", "deaths");
        for preset in &presets {
            let by_age = aggregate::deaths_by_age(&deaths, &DeathFilter::all().within(preset.range));
            chart = chart.with_series(Series::line(
                preset.name.clone(),
                (0..=MAX_AGE).map(|age| (age, by_age.get(&age).copied().unwrap_or(0) as f64)),
            ));
        }
        self.publish(&chart)
    }

    /// Running sum over age of the change in deaths between two years
    pub fn cumulative_difference(&mut self, from: i32, to: i32) -> anyhow::Result<PathBuf> {
        let deaths = self.store.deaths()?;
        let year = |y: i32| -> anyhow::Result<_> {
            let range = DateRange::years(y, y).with_context(|| format!("Invalid year {y}"))?;
            Ok(aggregate::deaths_by_age(&deaths, &DeathFilter::all().within(range)))
        };
        let difference = cumulative_difference(&year(from)?, &year(to)?);

        let chart = Chart::new(
            ChartName::new("cumulative_difference").suffix(format!("{from}_{to}")).to_string(),
            format!("Cumulative difference in deaths by age, {to} vs {from}"),
        )
        .axes("age", "deaths")
        .with_series(Series::line(
            format!("{to} - {from}"),
            (0..=MAX_AGE).zip(difference).map(|(age, d)| (age, d as f64)),
        ));
        self.publish(&chart)
    }
}

/// Preset keys become a suffix only when chosen explicitly
fn preset_chart_name(base: &str, keys: &[String]) -> String {
    keys.iter()
        .fold(ChartName::new(base), |name, key| name.suffix(key.clone()))
        .to_string()
}
