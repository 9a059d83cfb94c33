//! Shared helpers: calendar ranges, logging and progress reporting

pub mod dates;
pub mod logging;
