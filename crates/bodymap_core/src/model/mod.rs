//! Body map domain model.
//!
//! # Responsibility
//! - Define canonical records for users, maps and scored regions.
//! - Own value-level validation rules shared by stores and services.
//!
//! # Invariants
//! - Every map and region is identified by a stable UUID.
//! - A region belongs to exactly one map for its whole life.
//! - Region deletion is a hard delete; there are no tombstones.

pub mod body_map;
pub mod region;
pub mod user;
pub mod validation;

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time in Unix epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
