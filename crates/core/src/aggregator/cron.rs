//! Cron registry and run history.

use serde_json::Value;
use tracing::warn;

use crate::types::{CronJob, CronSummary};

/// Run records attached per job.
pub const MAX_RUNS_PER_JOB: usize = 20;

/// The `jobs` array of `cron/jobs.json`, or nothing if the document is
/// absent or has no such array.
pub(crate) fn job_entries(registry: Option<&Value>) -> &[Value] {
    registry
        .and_then(|doc| doc.get("jobs"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Job count and how many are enabled. Only object entries count as jobs,
/// the same entries [`decode_job`] accepts.
pub(crate) fn summarize(entries: &[Value]) -> CronSummary {
    let jobs = entries.iter().filter(|entry| entry.is_object());
    CronSummary {
        total: jobs.clone().count(),
        enabled: jobs
            .filter(|job| job.get("enabled").and_then(Value::as_bool).unwrap_or(false))
            .count(),
    }
}

/// Decode one job entry. Any object decodes; members of the wrong type
/// fall back to their defaults.
pub(crate) fn decode_job(entry: &Value) -> Option<CronJob> {
    if !entry.is_object() {
        warn!("Skipping cron job entry that is not an object");
        return None;
    }
    match serde_json::from_value::<CronJob>(entry.clone()) {
        Ok(job) => Some(job),
        Err(e) => {
            warn!(error = %e, "Skipping malformed cron job entry");
            None
        }
    }
}
