//! Core domain logic for body pain maps.
//! This crate is the single source of truth for map and region invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{
    default_log_level, init_logging, init_logging_with, logging_status, LogLevel, LoggingConfig,
};
pub use model::body_map::{BodyMap, MapId, MapStatus, MapWithRegions};
pub use model::region::{normalize_region_name, PainScore, Region, RegionId};
pub use model::user::UserId;
pub use model::validation::ValidationError;
pub use repo::map_repo::{MapRepository, RepoError, RepoResult, SqliteMapRepository};
pub use repo::region_repo::{RegionRepository, SqliteRegionRepository};
pub use repo::store_set::{SqliteStores, StoreSet};
pub use service::error::{BodyMapError, ErrorKind, ServiceResult};
pub use service::lifecycle_service::{
    DailyGenerationSummary, MapLifecycleService, UserDirectory, UserGenerationFailure,
};
pub use service::query_service::QueryService;
pub use service::scoring_service::ScoringService;
pub use service::user_lock::UserLocks;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
