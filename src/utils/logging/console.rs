//! Console output utilities
//!
//! Reports printed to stdout at the end of a phase, independently of the log
//! level.

use itertools::Itertools;

use crate::algorithm::{ForecastYear, QuadraticFit};
use crate::import::{ParseSummary, TemperatureImportStats};

/// Print the outcome of parsing one death file
pub fn print_parse_summary(summary: &ParseSummary) {
    println!(
        "{}: {} errors out of {} lines ({:.3}%)",
        summary.source,
        summary.error_count(),
        summary.total_lines,
        summary.error_percentage()
    );
    for (kind, count) in summary.errors_by_kind.iter().sorted_by_key(|(kind, _)| **kind) {
        println!("  - {kind}: {count}");
    }
    for sample in &summary.samples {
        println!("  line {}: {}", sample.line_number, sample.kind);
    }
}

/// Print the rows skipped while reading the weather file
pub fn print_temperature_stats(stats: &TemperatureImportStats, averaged: usize) {
    println!(
        "Temperatures: {} rows read, {} (date, department) averages kept",
        stats.rows, averaged
    );
    println!(
        "  skipped: {} outside the study period, {} bad dates, {} bad temperatures",
        stats.outside_period, stats.bad_date, stats.bad_temperature
    );
}

/// Print the coefficients and quality of a fitted curve
pub fn print_fit_report(fit: &QuadraticFit, lag: u32) {
    println!("Mortality by temperature (lag {lag} days):");
    println!("  m = {:.6e}·t² + {:.6e}·t + {:.6}", fit.a, fit.b, fit.c);
    println!(
        "  R² = {:.4} over {} days in {} temperature buckets",
        fit.r_squared, fit.observations, fit.buckets
    );
}

/// Print yearly totals of a forecast
pub fn print_forecast_summary(years: &[ForecastYear]) {
    println!("{:>6} {:>14} {:>12}", "Year", "Population", "Deaths");
    for year in years {
        println!(
            "{:>6} {:>14.0} {:>12.0}",
            year.year,
            year.total_population(),
            year.total_deaths()
        );
    }
}
