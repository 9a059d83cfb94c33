//! Parquet table store
//!
//! Each table is a directory of Parquet files, one file per imported source:
//!
//! ```text
//! <store_dir>/deaths/deces-2019.parquet
//! <store_dir>/population/pyramide-2019.parquet
//! <store_dir>/temperature/meteo.parquet
//! ```
//!
//! An import phase clears its table directory before writing, so re-running
//! an import replaces the table instead of appending to it.

pub mod schema;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::util::{clear_directory, ensure_directory, safe_open_file};
use crate::error::{Error, Result};
use crate::models::{DeathRecord, PopulationRow, TemperatureRecord};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

pub use schema::{StoredRow, Table};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Rows written per record batch
const WRITE_CHUNK_SIZE: usize = 65536;

/// Handle on a store directory
#[derive(Debug, Clone)]
pub struct TableStore {
    root: PathBuf,
}

impl TableStore {
    /// Open a store, creating its directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_directory(&root)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn table_dir(&self, table: Table) -> PathBuf {
        self.root.join(table.name())
    }

    /// Delete every part of a table
    pub fn clear(&self, table: Table) -> Result<usize> {
        let dir = self.table_dir(table);
        let removed = clear_directory(&dir)?;
        log::debug!("Cleared {removed} files from {}", dir.display());
        Ok(removed)
    }

    /// Write rows as one part of their table
    ///
    /// `part` names the file, typically after the source it was imported
    /// from. An existing part of the same name is replaced.
    pub fn write<T: StoredRow>(&self, part: &str, rows: &[T]) -> Result<PathBuf> {
        let start = Instant::now();
        let dir = self.table_dir(T::TABLE);
        ensure_directory(&dir)?;
        let path = dir.join(format!("{}.parquet", part_name(part)));

        let file = File::create(&path).map_err(|e| Error::io(&path, e))?;
        let mut writer = ArrowWriter::try_new(file, T::schema_ref(), None)?;
        for chunk in rows.chunks(WRITE_CHUNK_SIZE) {
            writer.write(&T::to_record_batch(chunk)?)?;
        }
        writer.close()?;

        log_operation_complete("wrote", &path, rows.len(), Some(start.elapsed()));
        Ok(path)
    }

    /// Read every part of a table, in file name order
    pub fn read<T: StoredRow>(&self) -> Result<Vec<T>> {
        let start = Instant::now();
        let dir = self.table_dir(T::TABLE);
        log_operation_start("Reading table", &dir);

        let parts = self.parts(T::TABLE)?;
        if parts.is_empty() {
            log_warning("Table is empty, run the import first", Some(&dir));
        }

        let mut rows = Vec::new();
        for path in &parts {
            for batch in read_parquet(path)? {
                rows.extend(T::from_record_batch(&batch)?);
            }
        }

        log_operation_complete("read", &dir, rows.len(), Some(start.elapsed()));
        Ok(rows)
    }

    /// Parquet files of a table, sorted by name
    pub fn parts(&self, table: Table) -> Result<Vec<PathBuf>> {
        let dir = self.table_dir(table);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir).map_err(|e| Error::io(&dir, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::io(&dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == "parquet") {
                paths.push(path);
            }
        }
        Ok(paths.into_iter().sorted().collect())
    }

    pub fn deaths(&self) -> Result<Vec<DeathRecord>> {
        self.read()
    }

    pub fn population(&self) -> Result<Vec<PopulationRow>> {
        self.read()
    }

    pub fn temperatures(&self) -> Result<Vec<TemperatureRecord>> {
        self.read()
    }
}

/// Read a single Parquet file into record batches
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>> {
    let file = safe_open_file(path, "table read")?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build()?;
    Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// File stem for a part: the source name without its extension
fn part_name(part: &str) -> String {
    let stem = Path::new(part)
        .file_stem()
        .map_or_else(|| part.to_string(), |s| s.to_string_lossy().into_owned());
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
