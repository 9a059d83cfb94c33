//! Weather observations reader
//!
//! The SYNOP export holds one row per station and observation time. Readings
//! are averaged per (date, department), keeping only dates inside the study
//! period.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::config::TemperatureSource;
use crate::error::util::safe_open_file;
use crate::error::{Error, Result};
use crate::models::TemperatureRecord;
use crate::utils::dates::DateRange;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Counters of the rows that did not make it into the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemperatureImportStats {
    pub rows: usize,
    pub outside_period: usize,
    pub bad_date: usize,
    pub bad_temperature: usize,
}

/// Read and average temperature observations
pub fn read_temperature_csv<R: Read>(
    reader: R,
    source: &TemperatureSource,
    period: &DateRange,
) -> Result<(Vec<TemperatureRecord>, TemperatureImportStats)> {
    let delimiter = u8::try_from(source.delimiter).map_err(|_| {
        Error::Config(format!("delimiter `{}` is not a single byte", source.delimiter))
    })?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| Error::Config(format!("column `{name}` not found in temperature file")))
    };
    let date_idx = column(&source.date_column)?;
    let temperature_idx = column(&source.temperature_column)?;
    let department_idx = column(&source.department_column)?;

    let mut stats = TemperatureImportStats::default();
    let mut readings: FxHashMap<(NaiveDate, String), SmallVec<[f64; 8]>> = FxHashMap::default();

    for record in csv_reader.records() {
        let record = record?;
        stats.rows += 1;

        let raw_date = record.get(date_idx).unwrap_or_default();
        let Some(date) = raw_date
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            stats.bad_date += 1;
            continue;
        };
        if !period.contains(&date) {
            stats.outside_period += 1;
            continue;
        }
        let Some(temperature) = record
            .get(temperature_idx)
            .and_then(|t| t.trim().parse::<f64>().ok())
            .filter(|t| t.is_finite())
        else {
            stats.bad_temperature += 1;
            continue;
        };
        let department = record.get(department_idx).unwrap_or_default().trim().to_string();

        readings.entry((date, department)).or_default().push(temperature);
    }

    let records = readings
        .into_iter()
        .map(|((date, department), values)| TemperatureRecord {
            date,
            department,
            temperature: values.iter().sum::<f64>() / values.len() as f64,
        })
        .sorted_by(|a, b| (a.date, &a.department).cmp(&(b.date, &b.department)))
        .collect();

    Ok((records, stats))
}

/// Import the temperature file from disk
pub fn import_temperature_file(
    path: &Path,
    source: &TemperatureSource,
    period: &DateRange,
) -> Result<(Vec<TemperatureRecord>, TemperatureImportStats)> {
    log_operation_start("Importing temperatures", path);
    let file = safe_open_file(path, "temperature import")?;
    let (records, stats) = read_temperature_csv(file, source, period)?;
    log_operation_complete("averaged", path, records.len(), None);
    Ok((records, stats))
}
