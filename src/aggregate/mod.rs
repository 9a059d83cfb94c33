//! Grouped counts over stored rows
//!
//! Every function is pure: rows in, an ordered map out. Keys missing from a
//! map mean "no rows", never zero rows explicitly stored.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rustc_hash::FxHashMap;

use crate::models::{DeathRecord, PopulationRow, TemperatureRecord};
use crate::utils::dates::{DateRange, SpanFilter};

/// Which death records take part in an aggregation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeathFilter {
    /// Inclusive range of death dates
    pub range: Option<DateRange>,
    /// Inclusive age range
    pub ages: Option<SpanFilter>,
    pub metropolitan_only: bool,
}

impl DeathFilter {
    /// Every record
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Metropolitan deaths only
    #[must_use]
    pub fn metropolitan() -> Self {
        Self {
            metropolitan_only: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn within(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    #[must_use]
    pub fn with_ages(mut self, ages: Option<SpanFilter>) -> Self {
        self.ages = ages;
        self
    }

    #[must_use]
    pub fn matches(&self, record: &DeathRecord) -> bool {
        (!self.metropolitan_only || record.is_metropolitan)
            && self.range.is_none_or(|r| r.contains(&record.death_date))
            && self.ages.is_none_or(|a| a.contains(u32::from(record.age)))
    }
}

fn count_by<K: Ord>(
    records: &[DeathRecord],
    filter: &DeathFilter,
    key: impl Fn(&DeathRecord) -> K,
) -> BTreeMap<K, u64> {
    let mut counts = BTreeMap::new();
    for record in records.iter().filter(|r| filter.matches(r)) {
        *counts.entry(key(record)).or_insert(0) += 1;
    }
    counts
}

/// Deaths per death date
#[must_use]
pub fn deaths_by_date(records: &[DeathRecord], filter: &DeathFilter) -> BTreeMap<NaiveDate, u64> {
    count_by(records, filter, |r| r.death_date)
}

/// Deaths per age at death
#[must_use]
pub fn deaths_by_age(records: &[DeathRecord], filter: &DeathFilter) -> BTreeMap<u8, u64> {
    count_by(records, filter, |r| r.age)
}

/// Deaths per (death date, age)
#[must_use]
pub fn deaths_by_date_age(
    records: &[DeathRecord],
    filter: &DeathFilter,
) -> BTreeMap<(NaiveDate, u8), u64> {
    count_by(records, filter, |r| (r.death_date, r.age))
}

/// Deaths per (year of death, age)
#[must_use]
pub fn deaths_by_year_age(records: &[DeathRecord], filter: &DeathFilter) -> BTreeMap<(i32, u8), u64> {
    count_by(records, filter, |r| (r.death_date.year(), r.age))
}

/// Deaths per department
#[must_use]
pub fn deaths_by_department(records: &[DeathRecord], filter: &DeathFilter) -> BTreeMap<String, u64> {
    count_by(records, filter, |r| r.department.clone())
}

/// Deaths per (death date, department, age)
#[must_use]
pub fn deaths_by_date_department_age(
    records: &[DeathRecord],
    filter: &DeathFilter,
) -> BTreeMap<(NaiveDate, String, u8), u64> {
    count_by(records, filter, |r| (r.death_date, r.department.clone(), r.age))
}

/// Population per age for one year; rows of the same age are summed
#[must_use]
pub fn population_by_age(rows: &[PopulationRow], year: i32) -> BTreeMap<u8, u64> {
    let mut counts = BTreeMap::new();
    for row in rows.iter().filter(|r| r.year == year) {
        *counts.entry(row.age).or_insert(0) += row.count;
    }
    counts
}

/// Population per (year, age)
#[must_use]
pub fn population_by_year_age(rows: &[PopulationRow]) -> BTreeMap<(i32, u8), u64> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry((row.year, row.age)).or_insert(0) += row.count;
    }
    counts
}

/// Mean temperature per (date, department)
#[must_use]
pub fn temperatures_by_date_department(
    records: &[TemperatureRecord],
) -> BTreeMap<(NaiveDate, String), f64> {
    let mut sums: FxHashMap<(NaiveDate, &str), (f64, usize)> = FxHashMap::default();
    for record in records {
        let entry = sums.entry((record.date, record.department.as_str())).or_insert((0.0, 0));
        entry.0 += record.temperature;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|((date, department), (sum, n))| ((date, department.to_string()), sum / n as f64))
        .collect()
}
