//! Error handling for the mortality analysis pipeline.

pub mod util;

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

use crate::algorithm::regression::FitError;

/// Specialized error type for the import, storage and computation layers
#[derive(Debug, Error)]
pub enum Error {
    /// Error opening, reading or writing a file
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Error without an associated path
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),
    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
    /// Error converting between rows and record batches
    #[error("Record conversion error: {0}")]
    SerdeArrow(#[from] serde_arrow::Error),
    /// Error reading delimited text
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Error reading or writing JSON documents
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Error downloading a source file
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),
    /// A spreadsheet cell could not be interpreted
    #[error("Sheet error at row {row}, column {col}: {message}")]
    Sheet {
        row: usize,
        col: usize,
        message: String,
    },
    /// A year was looked up in a sheet header and not found
    #[error("Year {year} not found in sheet header row {row}")]
    MissingYear { year: i32, row: usize },
    /// A computation received no input where at least one value is needed
    #[error("Empty input: {0}")]
    EmptyInput(String),
    /// The summer reference window of a year holds no values
    #[error("No values in the reference window of year {year}")]
    EmptyReferenceWindow { year: i32 },
    /// A denominator was zero where the quotient is required
    #[error("Division by zero: {0}")]
    DivisionByZero(String),
    /// A mortality rate outside `[0, ∞)` reached the forecast
    #[error("Invalid mortality rate {rate} at age {age}")]
    InvalidRate { age: usize, rate: f64 },
    /// Curve fitting failed
    #[error("Fit error: {0}")]
    Fit(#[from] FitError),
}

impl Error {
    /// Wrap an IO error with the path that produced it
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
