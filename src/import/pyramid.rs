//! Age pyramid sheet reader
//!
//! INSEE publishes population by age as workbooks. A sheet is exported to
//! delimited text, read into a grid of [`CellValue`]s and then interpreted
//! with one of the two [`PyramidLayout`]s.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::config::{PyramidLayout, RowSpan};
use crate::error::util::safe_open_file;
use crate::error::{Error, Result};
use crate::models::{CellValue, PopulationRow};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Columns scanned when looking for a year in the header row
const MAX_YEAR_SCAN_COLUMNS: usize = 200;

/// A rectangular grid of cells; missing cells read as empty
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: Vec<Vec<CellValue>>,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl Sheet {
    #[must_use]
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Read a delimited export of a sheet
    pub fn from_reader<R: Read>(reader: R, delimiter: char) -> Result<Self> {
        let delimiter = u8::try_from(delimiter)
            .map_err(|_| Error::Config(format!("delimiter `{delimiter}` is not a single byte")))?;
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(CellValue::from_field).collect());
        }
        Ok(Self { rows })
    }

    /// Read a delimited export from disk
    pub fn from_path(path: &Path, delimiter: char) -> Result<Self> {
        let file = safe_open_file(path, "age pyramid import")?;
        Self::from_reader(file, delimiter)
    }

    /// Cell at zero-based `(row, col)`
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Extract population rows from a sheet
///
/// Counts of the same `(year, age)` are summed, which merges men and women
/// and folds every age above the top band into it.
pub fn read_pyramid(sheet: &Sheet, layout: &PyramidLayout) -> Result<Vec<PopulationRow>> {
    let mut counts: BTreeMap<(i32, u8), u64> = BTreeMap::new();

    match layout {
        PyramidLayout::MultiYear {
            year_row,
            men_rows,
            women_rows,
            age_col,
            first_year,
            last_year,
        } => {
            let year_row = year_row.saturating_sub(1);
            let age_col = age_col.saturating_sub(1);
            for year in *first_year..=*last_year {
                let col = find_year_column(sheet, year_row, year)?;
                for span in [men_rows, women_rows] {
                    accumulate(sheet, *span, age_col, col, year, &mut counts)?;
                }
            }
        }
        PyramidLayout::SingleYear {
            year,
            rows,
            age_col,
            count_col,
        } => {
            accumulate(
                sheet,
                *rows,
                age_col.saturating_sub(1),
                count_col.saturating_sub(1),
                *year,
                &mut counts,
            )?;
        }
    }

    Ok(counts
        .into_iter()
        .map(|((year, age), count)| PopulationRow { year, age, count })
        .collect())
}

/// Import a pyramid export from disk
pub fn import_pyramid(path: &Path, delimiter: char, layout: &PyramidLayout) -> Result<Vec<PopulationRow>> {
    log_operation_start("Importing age pyramid", path);
    let sheet = Sheet::from_path(path, delimiter)?;
    let rows = read_pyramid(&sheet, layout)?;
    log_operation_complete("read", path, rows.len(), None);
    Ok(rows)
}

fn find_year_column(sheet: &Sheet, row: usize, year: i32) -> Result<usize> {
    (0..=MAX_YEAR_SCAN_COLUMNS)
        .find(|col| sheet.cell(row, *col).parse_year() == Some(year))
        .ok_or(Error::MissingYear { year, row: row + 1 })
}

fn accumulate(
    sheet: &Sheet,
    span: RowSpan,
    age_col: usize,
    count_col: usize,
    year: i32,
    counts: &mut BTreeMap<(i32, u8), u64>,
) -> Result<()> {
    for row in span.indices() {
        let age = sheet.cell(row, age_col).parse_age().ok_or_else(|| Error::Sheet {
            row: row + 1,
            col: age_col + 1,
            message: format!("expected an age, found {:?}", sheet.cell(row, age_col)),
        })?;
        *counts.entry((year, age)).or_insert(0) += sheet.cell(row, count_col).parse_count();
    }
    Ok(())
}
