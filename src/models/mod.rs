//! Domain models for the mortality analysis pipeline
//!
//! One model per stored table, plus the spreadsheet cell type used while
//! importing age pyramids.

pub mod cell;
pub mod death;
pub mod population;
pub mod temperature;

pub use cell::CellValue;
pub use death::{DeathRecord, MAX_AGE, METROPOLITAN_LOCATION_LIMIT, Sex};
pub use population::PopulationRow;
pub use temperature::TemperatureRecord;
