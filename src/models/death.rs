//! Death record model
//!
//! A single death event parsed from the national death files. Records are
//! immutable once imported and are reloaded wholesale on every import.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Highest stored age; older ages are top-coded into this band
pub const MAX_AGE: u8 = 100;

/// Location codes at or above this value are overseas territories
pub const METROPOLITAN_LOCATION_LIMIT: u32 = 96000;

/// Value used for location codes that are not plain integers
pub const UNPARSABLE_LOCATION: u32 = 99999;

/// Average number of days in a year, leap years included
const DAYS_PER_YEAR: f64 = 365.25;

/// Sex as coded in the death files ("1" male, "2" female)
///
/// Stored as `"M"` / `"F"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Decode the one-character sex field
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'1' => Some(Self::Male),
            b'2' => Some(Self::Female),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

impl From<Sex> for String {
    fn from(sex: Sex) -> Self {
        sex.as_str().to_string()
    }
}

impl TryFrom<String> for Sex {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "M" => Ok(Self::Male),
            "F" => Ok(Self::Female),
            other => Err(format!("unknown sex `{other}`")),
        }
    }
}

/// One row of the `deaths` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathRecord {
    pub sex: Sex,
    pub birth_date: NaiveDate,
    pub death_date: NaiveDate,
    /// Five-character INSEE code of the place of death
    pub death_location: String,
    /// First two characters of the location code
    pub department: String,
    /// Age at death in completed years, clamped to `0..=MAX_AGE`
    pub age: u8,
    pub is_metropolitan: bool,
}

impl DeathRecord {
    /// Build a record, deriving age, department and the metropolitan flag
    #[must_use]
    pub fn new(sex: Sex, birth_date: NaiveDate, death_date: NaiveDate, death_location: &str) -> Self {
        Self {
            sex,
            birth_date,
            death_date,
            department: death_location.chars().take(2).collect(),
            age: age_at_death(birth_date, death_date),
            is_metropolitan: is_metropolitan_location(death_location),
            death_location: death_location.to_string(),
        }
    }
}

/// Completed years between birth and death, clamped to `0..=MAX_AGE`
#[must_use]
pub fn age_at_death(birth_date: NaiveDate, death_date: NaiveDate) -> u8 {
    let days = (death_date - birth_date).num_days();
    let years = (days as f64 / DAYS_PER_YEAR).floor();
    years.clamp(0.0, f64::from(MAX_AGE)) as u8
}

/// Whether a location code belongs to metropolitan France
///
/// Codes that do not parse as integers (Corsica's `2A`/`2B` included) count
/// as `UNPARSABLE_LOCATION`.
#[must_use]
pub fn is_metropolitan_location(location: &str) -> bool {
    location
        .trim()
        .parse::<u32>()
        .unwrap_or(UNPARSABLE_LOCATION)
        < METROPOLITAN_LOCATION_LIMIT
}
