//! Parsers for the government source files
//!
//! Each parser turns one source file into rows of a store table. Per-line
//! problems in the death files are counted rather than fatal; everything else
//! propagates as an [`Error`](crate::error::Error).

pub mod deaths;
pub mod pyramid;
pub mod temperature;

pub use deaths::{ParseErrorKind, ParseSummary, import_death_file, parse_death_file, parse_death_line};
pub use pyramid::{Sheet, import_pyramid, read_pyramid};
pub use temperature::{TemperatureImportStats, import_temperature_file, read_temperature_csv};
