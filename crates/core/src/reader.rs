// crates/core/src/reader.rs
//! Raw file access that never fails outward.
//!
//! Each public reader has a `try_*` twin returning [`ReadError`]; the plain
//! versions log the error and hand back an empty sentinel instead.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ReadError;
use crate::tail::tail_lines;

/// Read a whole file as UTF-8 text.
pub fn try_read_text(path: &Path) -> Result<String, ReadError> {
    std::fs::read_to_string(path).map_err(|e| ReadError::io(path, e))
}

/// Read a whole file as text, or `""` if it is missing or unreadable.
pub fn read_text(path: &Path) -> String {
    try_read_text(path).unwrap_or_else(|e| {
        log_degraded(&e);
        String::new()
    })
}

/// Parse a whole file as one JSON document.
pub fn try_read_structured<T: DeserializeOwned>(path: &Path) -> Result<T, ReadError> {
    let contents = try_read_text(path)?;
    serde_json::from_str(&contents).map_err(|e| ReadError::malformed(path, &e))
}

/// Parse a whole file as one JSON document, or `None` on any failure.
pub fn read_structured<T: DeserializeOwned>(path: &Path) -> Option<T> {
    match try_read_structured(path) {
        Ok(value) => Some(value),
        Err(e) => {
            log_degraded(&e);
            None
        }
    }
}

/// Read the last `max_count` records of a JSONL file that parse as `T`.
///
/// Records come back in file order. Lines that fail to parse are dropped
/// and do not count towards `max_count`: if the tail window contains bad
/// lines, the window is widened until enough good records are found or
/// the start of the file is reached.
pub fn try_read_tail_records<T: DeserializeOwned>(
    path: &Path,
    max_count: usize,
) -> Result<Vec<T>, ReadError> {
    if max_count == 0 {
        return Ok(Vec::new());
    }

    let mut window = max_count;
    loop {
        let lines = tail_lines(path, window).map_err(|e| ReadError::io(path, e))?;
        let exhausted = lines.len() < window || window == usize::MAX;

        let mut records: Vec<T> = lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        if records.len() >= max_count || exhausted {
            let dropped = lines.len() - records.len();
            if dropped > 0 {
                debug!(path = %path.display(), dropped, "Skipped unparsable JSONL lines");
            }
            let start = records.len().saturating_sub(max_count);
            return Ok(records.split_off(start));
        }

        window = window.saturating_mul(2);
    }
}

/// Tail-read JSONL records, or an empty vec if the file is missing.
pub fn read_tail_records<T: DeserializeOwned>(path: &Path, max_count: usize) -> Vec<T> {
    try_read_tail_records(path, max_count).unwrap_or_else(|e| {
        log_degraded(&e);
        Vec::new()
    })
}

fn log_degraded(err: &ReadError) {
    if err.is_not_found() {
        debug!(error = %err, "State file absent, using empty default");
    } else {
        warn!(error = %err, "State file unreadable, using empty default");
    }
}
