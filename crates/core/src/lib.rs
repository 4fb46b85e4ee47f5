// crates/core/src/lib.rs
//! Read-only aggregation layer for the OpenClaw dashboard.
//!
//! Everything here derives views from the state files an OpenClaw install
//! keeps on disk. Nothing is written, and a missing or broken source file
//! degrades the affected view to empty/default values instead of failing.

pub mod aggregator;
pub mod cache;
pub mod error;
pub mod log_line;
pub mod paths;
pub mod reader;
pub mod tail;
pub mod types;

pub use aggregator::Aggregator;
pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use error::*;
pub use paths::StateLayout;
pub use types::*;
