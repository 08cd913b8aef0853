//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the map store and region store contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate model values before persistence.
//! - Repository APIs return semantic errors (`MapNotFound`,
//!   `RegionNotFound`, `CurrentMapExists`) in addition to DB errors.
//! - Ownership is not checked here; services own that rule.

pub mod map_repo;
pub mod region_repo;
pub mod store_set;
