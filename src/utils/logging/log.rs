//! Phase logging
//!
//! Imports, store reads and downloads announce themselves with the same pair
//! of lines, so the log of a run reads as a list of phases with row counts.

use std::path::Path;
use std::time::Duration;

/// `<operation> <path>`
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{operation} {}", path.display());
}

/// `<verb> <rows> rows (<path>)`, with throughput when the duration is known
pub fn log_operation_complete(verb: &str, path: &Path, rows: usize, elapsed: Option<Duration>) {
    match elapsed {
        Some(elapsed) if !elapsed.is_zero() => log::info!(
            "{verb} {rows} rows ({}) in {elapsed:.2?}, {:.0} rows/s",
            path.display(),
            rows as f64 / elapsed.as_secs_f64()
        ),
        _ => log::info!("{verb} {rows} rows ({})", path.display()),
    }
}

pub fn log_warning(message: &str, path: Option<&Path>) {
    match path {
        Some(path) => log::warn!("{message}: {}", path.display()),
        None => log::warn!("{message}"),
    }
}
