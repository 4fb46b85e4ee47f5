//! Session transcript lookup.
//!
//! Transcript files are JSONL with one `{"type":"session","id":...}` header
//! record followed by `{"type":"message", ...}` records. The file name is
//! not trusted to match the session id, so every `.jsonl` file in the
//! agent's session directory is searched.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::reader::read_tail_records;
use crate::types::TranscriptMessage;

/// Records read from the end of each transcript file.
pub const TRANSCRIPT_SCAN_RECORDS: usize = 200;
pub const DEFAULT_TRANSCRIPT_LIMIT: usize = 50;

pub(crate) fn find_transcript(
    sessions_dir: &Path,
    session_id: &str,
    limit: usize,
) -> Vec<TranscriptMessage> {
    let files = match transcript_files(sessions_dir) {
        Ok(files) => files,
        Err(e) => {
            debug!(dir = %sessions_dir.display(), error = %e, "Session directory unreadable");
            return Vec::new();
        }
    };

    for file in files {
        let records: Vec<Value> = read_tail_records(&file, TRANSCRIPT_SCAN_RECORDS);
        let is_match = records.iter().any(|record| {
            record_type(record) == Some("session")
                && record.get("id").and_then(Value::as_str) == Some(session_id)
        });
        if is_match {
            let messages: Vec<TranscriptMessage> = records
                .iter()
                .filter(|record| record_type(record) == Some("message"))
                .map(project_message)
                .collect();
            let start = messages.len().saturating_sub(limit);
            return messages[start..].to_vec();
        }
    }

    Vec::new()
}

/// `.jsonl` files directly inside `dir`, sorted by name.
fn transcript_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "jsonl"))
        .collect();
    files.sort();
    Ok(files)
}

fn record_type(record: &Value) -> Option<&str> {
    record.get("type").and_then(Value::as_str)
}

fn project_message(record: &Value) -> TranscriptMessage {
    let message = record.get("message");
    TranscriptMessage {
        id: record.get("id").and_then(Value::as_str).map(str::to_string),
        timestamp: record.get("timestamp").filter(|v| !v.is_null()).cloned(),
        role: message
            .and_then(|m| m.get("role"))
            .and_then(Value::as_str)
            .map(str::to_string),
        content: message
            .and_then(|m| m.get("content"))
            .map(render_content)
            .unwrap_or_default(),
    }
}

/// Text blocks are concatenated; any other block becomes `[type]`.
fn render_content(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(blocks) => blocks
            .iter()
            .map(|block| {
                let kind = block.get("type").and_then(Value::as_str).unwrap_or("unknown");
                if kind == "text" {
                    block
                        .get("text")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                } else {
                    format!("[{kind}]")
                }
            })
            .collect(),
        _ => String::new(),
    }
}
