//! Command implementations behind the `mortality` binary
//!
//! Every chart command follows the same shape: read tables from the store,
//! aggregate, compute, then publish a [`Chart`](crate::chart::Chart) to the
//! pipeline's sink.

pub mod charts;
pub mod download;
pub mod forecast;
pub mod import;
pub mod standardized;
pub mod temperature;

use std::path::PathBuf;

use anyhow::Context;

use crate::chart::{Chart, ChartSink, JsonChartSink};
use crate::config::AnalysisConfig;
use crate::store::TableStore;

pub use import::ImportTarget;

/// Configuration, store and chart destination shared by all commands
pub struct Pipeline<S: ChartSink> {
    pub config: AnalysisConfig,
    pub store: TableStore,
    pub sink: S,
}

impl Pipeline<JsonChartSink> {
    /// Pipeline writing JSON charts into the configured results directory
    pub fn from_config(config: AnalysisConfig) -> anyhow::Result<Self> {
        let store = TableStore::open(&config.paths.store_dir).with_context(|| {
            format!("Failed to open store {}", config.paths.store_dir.display())
        })?;
        let sink = JsonChartSink::new(&config.paths.results_dir);
        Ok(Self { config, store, sink })
    }
}

impl<S: ChartSink> Pipeline<S> {
    pub fn new(config: AnalysisConfig, store: TableStore, sink: S) -> Self {
        Self { config, store, sink }
    }

    fn publish(&mut self, chart: &Chart) -> anyhow::Result<PathBuf> {
        self.sink
            .publish(chart)
            .with_context(|| format!("Failed to publish chart {}", chart.name))
    }

    /// Every chart, with default parameters
    pub fn all_charts(&mut self) -> anyhow::Result<Vec<PathBuf>> {
        let forecast = self.config.forecast;
        let mut paths = vec![
            self.mortality_by_age(&[])?,
            self.deaths_by_date(&[])?,
            self.population_by_age(&[])?,
            self.deaths_by_age(&[])?,
            self.standardized_mortality(None)?,
            self.standardized_yearly()?,
            self.temperature_factors()?,
        ];
        paths.extend(self.estimate_temperature(0, None)?);
        paths.extend(self.forecast(
            forecast.start_year,
            forecast.end_year,
            forecast.history_first_year,
            forecast.history_last_year,
        )?);
        Ok(paths)
    }
}
