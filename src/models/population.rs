//! Population by age and year

use serde::{Deserialize, Serialize};

/// One row of the `population` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRow {
    pub year: i32,
    /// Age in `0..=MAX_AGE`; the top band holds every older age
    pub age: u8,
    pub count: u64,
}
