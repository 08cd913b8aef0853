//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into the lifecycle, scoring and query APIs.
//! - Keep FFI/CLI layers decoupled from storage details.
//!
//! # Invariants
//! - Mutations run under the caller's user lock and one write transaction.
//! - Queries run on one read snapshot and take no user lock.

pub mod error;
pub mod lifecycle_service;
mod ownership;
pub mod query_service;
pub mod scoring_service;
pub mod user_lock;
