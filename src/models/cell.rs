//! Spreadsheet cell values
//!
//! Age pyramid sheets mix numbers, labels such as `"100 et plus"` and blank
//! cells. Every cell is read into a [`CellValue`] and coerced by one of the
//! functions below.

use super::death::MAX_AGE;

/// The content of one spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Interpret a raw delimited field
    #[must_use]
    pub fn from_field(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Number(value),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    /// Coerce the cell to an age in `0..=MAX_AGE`
    ///
    /// Text keeps only its digits, so `"100 et plus"` reads as 100.
    /// Returns `None` for empty cells and text without digits.
    #[must_use]
    pub fn parse_age(&self) -> Option<u8> {
        let age = match self {
            Self::Number(value) => value.trunc(),
            Self::Text(text) => digits_only(text)? as f64,
            Self::Empty => return None,
        };
        Some(age.clamp(0.0, f64::from(MAX_AGE)) as u8)
    }

    /// Coerce the cell to a head count; anything unreadable counts as 0
    #[must_use]
    pub fn parse_count(&self) -> u64 {
        match self {
            Self::Number(value) if *value > 0.0 => value.trunc() as u64,
            Self::Text(text) => digits_only(text).unwrap_or(0),
            _ => 0,
        }
    }

    /// Coerce the cell to a year; only plain numbers and digit strings match
    #[must_use]
    pub fn parse_year(&self) -> Option<i32> {
        match self {
            Self::Number(value) if value.fract() == 0.0 => Some(*value as i32),
            Self::Text(text) if text.chars().all(|c| c.is_ascii_digit()) => text.parse().ok(),
            _ => None,
        }
    }
}

/// Concatenate the ASCII digits of a string and parse them
fn digits_only(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}
