//! Fixed-width death file parser
//!
//! Layout of the INSEE "fichier des personnes décédées" lines (0-based byte
//! offsets, end exclusive):
//!
//! | field          | bytes     |
//! |----------------|-----------|
//! | sex            | 80        |
//! | birth date     | 81..89    |
//! | death date     | 154..162  |
//! | death location | 162..167  |
//!
//! Dates are `YYYYMMDD`. An unknown birth month or day is written `00` and
//! defaults to June 15th.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::error::util::safe_read;
use crate::models::{DeathRecord, Sex};
use crate::utils::logging::{create_spinner, finish_progress_bar, log_operation_complete, log_operation_start};

const SEX_OFFSET: usize = 80;
const BIRTH_DATE: (usize, usize) = (81, 89);
const DEATH_DATE: (usize, usize) = (154, 162);
const DEATH_LOCATION: (usize, usize) = (162, 167);
const MIN_LINE_LEN: usize = DEATH_LOCATION.1;

/// Month and day substituted for an unknown birth month or day
const BIRTH_DATE_DEFAULTS: (u32, u32) = (6, 15);

/// How many failing lines are kept as examples in a summary
const MAX_ERROR_SAMPLES: usize = 10;

/// Why a death file line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParseErrorKind {
    /// Line shorter than the last field
    LineTooShort,
    /// A text field is not valid UTF-8
    InvalidEncoding,
    /// Sex code other than `1` or `2`
    BadSex,
    /// Year `0000`
    BadYear,
    /// Month `00` where no default applies
    BadMonth,
    /// Day `00` where no default applies
    BadDay,
    /// Non-digit characters or a date that does not exist
    InvalidDate,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::LineTooShort => "line too short",
            Self::InvalidEncoding => "invalid encoding",
            Self::BadSex => "bad sex value",
            Self::BadYear => "bad year value",
            Self::BadMonth => "bad month value",
            Self::BadDay => "bad day value",
            Self::InvalidDate => "invalid date",
        };
        f.write_str(label)
    }
}

/// A rejected line kept for the summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorSample {
    /// 1-based line number
    pub line_number: usize,
    pub kind: ParseErrorKind,
}

/// Outcome of parsing one death file
#[derive(Debug, Clone, Default)]
pub struct ParseSummary {
    /// Source file name
    pub source: String,
    pub total_lines: usize,
    pub accepted: usize,
    pub errors_by_kind: FxHashMap<ParseErrorKind, usize>,
    /// The first rejected lines, in file order
    pub samples: Vec<ParseErrorSample>,
}

impl ParseSummary {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Count one parsed line
    pub fn record(&mut self, line_number: usize, outcome: std::result::Result<(), ParseErrorKind>) {
        self.total_lines += 1;
        match outcome {
            Ok(()) => self.accepted += 1,
            Err(kind) => {
                *self.errors_by_kind.entry(kind).or_insert(0) += 1;
                if self.samples.len() < MAX_ERROR_SAMPLES {
                    self.samples.push(ParseErrorSample { line_number, kind });
                }
            }
        }
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors_by_kind.values().sum()
    }

    /// Share of rejected lines, in percent
    #[must_use]
    pub fn error_percentage(&self) -> f64 {
        if self.total_lines == 0 {
            return 0.0;
        }
        100.0 * self.error_count() as f64 / self.total_lines as f64
    }
}

/// Parse one fixed-width line
pub fn parse_death_line(line: &[u8]) -> std::result::Result<DeathRecord, ParseErrorKind> {
    if line.len() < MIN_LINE_LEN {
        return Err(ParseErrorKind::LineTooShort);
    }
    let birth_date = parse_date(field(line, BIRTH_DATE), Some(BIRTH_DATE_DEFAULTS))?;
    let death_date = parse_date(field(line, DEATH_DATE), None)?;
    let location = std::str::from_utf8(field(line, DEATH_LOCATION))
        .map_err(|_| ParseErrorKind::InvalidEncoding)?;
    let sex = Sex::from_code(line[SEX_OFFSET]).ok_or(ParseErrorKind::BadSex)?;

    Ok(DeathRecord::new(sex, birth_date, death_date, location))
}

fn field(line: &[u8], (start, end): (usize, usize)) -> &[u8] {
    &line[start..end]
}

/// Parse a `YYYYMMDD` field, substituting defaults for `00` month or day
fn parse_date(raw: &[u8], defaults: Option<(u32, u32)>) -> std::result::Result<NaiveDate, ParseErrorKind> {
    let text = std::str::from_utf8(raw).map_err(|_| ParseErrorKind::InvalidEncoding)?;
    if text.len() != 8 {
        return Err(ParseErrorKind::InvalidDate);
    }
    let (year, rest) = text.split_at(4);
    let (month, day) = rest.split_at(2);

    if year == "0000" {
        return Err(ParseErrorKind::BadYear);
    }
    let month = match (month, defaults) {
        ("00", Some((default_month, _))) => default_month,
        ("00", None) => return Err(ParseErrorKind::BadMonth),
        (m, _) => parse_digits(m)?,
    };
    let day = match (day, defaults) {
        ("00", Some((_, default_day))) => default_day,
        ("00", None) => return Err(ParseErrorKind::BadDay),
        (d, _) => parse_digits(d)?,
    };
    let year = parse_digits(year)? as i32;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(ParseErrorKind::InvalidDate)
}

fn parse_digits(text: &str) -> std::result::Result<u32, ParseErrorKind> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidDate);
    }
    text.parse().map_err(|_| ParseErrorKind::InvalidDate)
}

/// Parse a whole death file held in memory
///
/// Bad lines are dropped and counted in the returned summary.
#[must_use]
pub fn parse_death_file(content: &[u8], source: &str) -> (Vec<DeathRecord>, ParseSummary) {
    let mut summary = ParseSummary::new(source);
    let mut records = Vec::new();

    let mut lines = content.split(|b| *b == b'\n').peekable();
    let mut line_number = 0;
    while let Some(line) = lines.next() {
        // the piece after a trailing newline is not a line
        if line.is_empty() && lines.peek().is_none() {
            break;
        }
        line_number += 1;
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        match parse_death_line(line) {
            Ok(record) => {
                records.push(record);
                summary.record(line_number, Ok(()));
            }
            Err(kind) => summary.record(line_number, Err(kind)),
        }
    }

    (records, summary)
}

/// Read and parse a death file from disk
pub fn import_death_file(path: &Path) -> Result<(Vec<DeathRecord>, ParseSummary)> {
    let start = Instant::now();
    log_operation_start("Importing death file", path);
    let source = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    let spinner = create_spinner(Some(&source));
    let content = safe_read(path, "death records import")?;
    let (records, summary) = parse_death_file(&content, &source);
    spinner.set_position(summary.total_lines as u64);
    finish_progress_bar(&spinner, Some(&format!("{source}: {} records", records.len())));

    log_operation_complete("parsed", path, records.len(), Some(start.elapsed()));
    Ok((records, summary))
}
