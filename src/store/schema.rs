//! Arrow schemas of the stored tables
//!
//! Every stored row type declares its schema explicitly so dates always land
//! in `Date32` columns, whatever serde tracing would infer.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::models::{DeathRecord, PopulationRow, TemperatureRecord};

/// The tables of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Deaths,
    Population,
    Temperature,
}

impl Table {
    /// Directory name of the table inside the store
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deaths => "deaths",
            Self::Population => "population",
            Self::Temperature => "temperature",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A row type that can be written to and read back from a table
pub trait StoredRow: Serialize + DeserializeOwned + Sized {
    /// Table the rows belong to
    const TABLE: Table;

    /// Column definitions, in storage order
    fn schema() -> Schema;

    fn schema_ref() -> Arc<Schema> {
        Arc::new(Self::schema())
    }

    /// Convert rows into a single record batch
    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        let fields: Vec<FieldRef> = Self::schema().fields().iter().map(Arc::clone).collect();
        Ok(serde_arrow::to_record_batch(&fields, &rows)?)
    }

    /// Convert a record batch back into rows
    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        Ok(serde_arrow::from_record_batch::<Vec<Self>>(batch)?)
    }
}

impl StoredRow for DeathRecord {
    const TABLE: Table = Table::Deaths;

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("sex", DataType::Utf8, false),
            Field::new("birth_date", DataType::Date32, false),
            Field::new("death_date", DataType::Date32, false),
            Field::new("death_location", DataType::Utf8, false),
            Field::new("department", DataType::Utf8, false),
            Field::new("age", DataType::UInt8, false),
            Field::new("is_metropolitan", DataType::Boolean, false),
        ])
    }
}

impl StoredRow for PopulationRow {
    const TABLE: Table = Table::Population;

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("year", DataType::Int32, false),
            Field::new("age", DataType::UInt8, false),
            Field::new("count", DataType::UInt64, false),
        ])
    }
}

impl StoredRow for TemperatureRecord {
    const TABLE: Table = Table::Temperature;

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("date", DataType::Date32, false),
            Field::new("department", DataType::Utf8, false),
            Field::new("temperature", DataType::Float64, false),
        ])
    }
}
