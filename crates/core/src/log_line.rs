//! Grammar for the health and usage monitor logs.
//!
//! Lines look like `2024-01-01 00:00:00 UTC ERROR: disk full`. Anything
//! else is kept verbatim as an `INFO` message with an empty timestamp.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::types::LogEvent;

/// Most log events surfaced per view.
pub const MAX_LOG_EVENTS: usize = 50;

static LOG_LINE_RE: OnceLock<Regex> = OnceLock::new();

fn log_line_re() -> &'static Regex {
    LOG_LINE_RE.get_or_init(|| {
        Regex::new(r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} UTC)\s+(.+?):\s*(.*)$")
            .expect("log line pattern is valid")
    })
}

/// Parse one line. Never fails: unmatched input becomes an `INFO` event.
pub fn parse_log_line(line: &str) -> LogEvent {
    match log_line_re().captures(line) {
        Some(caps) => LogEvent {
            timestamp: caps[1].to_string(),
            level: caps[2].to_string(),
            message: caps[3].to_string(),
        },
        None => LogEvent {
            timestamp: String::new(),
            level: "INFO".to_string(),
            message: line.to_string(),
        },
    }
}

/// Parse a whole log, newest first, keeping at most `cap` events.
pub fn parse_log(text: &str, cap: usize) -> Vec<LogEvent> {
    text.lines()
        .filter(|line| !line.is_empty())
        .rev()
        .take(cap)
        .map(parse_log_line)
        .collect()
}
