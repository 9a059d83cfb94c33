//! Daily temperature by department

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the `temperature` table
///
/// Station readings of the same day and department are averaged into a
/// single row at import time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRecord {
    pub date: NaiveDate,
    pub department: String,
    /// Degrees Celsius
    pub temperature: f64,
}
