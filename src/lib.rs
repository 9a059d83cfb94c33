//! Mortality analysis of French death records
//!
//! Downloads the national death files, INSEE age pyramids and weather
//! observations, imports them into a Parquet store and derives
//! age-standardized mortality, its relation to temperature and a cohort
//! forecast. Results are published as chart documents.

pub mod aggregate;
pub mod algorithm;
pub mod chart;
pub mod commands;
pub mod config;
pub mod download;
pub mod error;
pub mod import;
pub mod models;
pub mod store;
pub mod utils;

pub use chart::{Chart, ChartSink, JsonChartSink, MemoryChartSink, Series};
pub use config::AnalysisConfig;
pub use error::{Error, Result};
pub use models::{DeathRecord, PopulationRow, Sex, TemperatureRecord};
pub use store::{Table, TableStore};
