//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose one typed request/response call per body map operation.
//! - Translate core errors into a stable `{code, message}` payload.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every response carries either its payload or an `ApiError`, never both.
//! - All calls in one process share one per-user lock registry.

use bodymap_core::db::open_db;
use bodymap_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    BodyMapError, DailyGenerationSummary, MapLifecycleService, MapWithRegions, QueryService,
    Region, ScoringService, SqliteStores, UserId, UserLocks,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

const DB_FILE_NAME: &str = "bodymap.sqlite3";
const DB_PATH_ENV: &str = "BODYMAP_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static USER_LOCKS: OnceLock<Arc<UserLocks>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Error payload shared by every response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// One of `validation|not_found|permission|conflict|storage`.
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn validation(message: impl Into<String>) -> Self {
        Self {
            code: "validation".to_string(),
            message: message.into(),
        }
    }

    fn storage(message: impl Into<String>) -> Self {
        Self {
            code: "storage".to_string(),
            message: message.into(),
        }
    }
}

impl From<BodyMapError> for ApiError {
    fn from(value: BodyMapError) -> Self {
        Self {
            code: value.kind().code().to_string(),
            message: value.to_string(),
        }
    }
}

/// Request carrying only the caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRequest {
    pub user: String,
}

/// Request addressing one map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapRequest {
    pub user: String,
    pub map_id: String,
}

/// Request addressing one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRequest {
    pub user: String,
    pub region_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRegionRequest {
    pub user: String,
    pub map_id: String,
    pub region_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRegionRequest {
    pub user: String,
    pub region_id: String,
    /// Pain intensity; only 1..=10 is accepted.
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionView {
    pub region_id: String,
    pub map_id: String,
    pub name: String,
    pub score: Option<u8>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapView {
    pub map_id: String,
    /// `current` or `saved`.
    pub status: String,
    pub created_at: i64,
    pub saved_at: Option<i64>,
    pub regions: Vec<RegionView>,
}

/// Success/failure without payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckResponse {
    pub error: Option<ApiError>,
}

/// Response returning a newly created id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdResponse {
    pub id: Option<String>,
    pub error: Option<ApiError>,
}

/// Response for lookups that may legitimately find nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalMapResponse {
    pub map: Option<MapView>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsResponse {
    pub maps: Vec<MapView>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionResponse {
    pub region: Option<RegionView>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionsResponse {
    pub regions: Vec<RegionView>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFailureView {
    pub user: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyGenerationResponse {
    /// `(user, map_id)` pairs that received a fresh map.
    pub generated: Vec<(String, String)>,
    pub failed: Vec<UserFailureView>,
    /// Set only when the user directory could not be read.
    pub error: Option<ApiError>,
}

/// Registers a user for the daily generation job.
#[flutter_rust_bridge::frb(sync)]
pub fn register_user(request: UserRequest) -> AckResponse {
    Backend::configured().register_user(request)
}

/// Creates a new current map for the user.
#[flutter_rust_bridge::frb(sync)]
pub fn generate_map(request: UserRequest) -> IdResponse {
    Backend::configured().generate_map(request)
}

/// Saves the user's current map into history.
#[flutter_rust_bridge::frb(sync)]
pub fn save_map(request: UserRequest) -> AckResponse {
    Backend::configured().save_map(request)
}

/// Removes all regions from the user's current map.
#[flutter_rust_bridge::frb(sync)]
pub fn clear_map(request: UserRequest) -> AckResponse {
    Backend::configured().clear_map(request)
}

/// Returns the user's current map, or `map: None` when there is none.
#[flutter_rust_bridge::frb(sync)]
pub fn get_current_map(request: UserRequest) -> OptionalMapResponse {
    Backend::configured().get_current_map(request)
}

/// Returns the user's saved maps ordered by save time.
#[flutter_rust_bridge::frb(sync)]
pub fn get_saved_maps(request: UserRequest) -> MapsResponse {
    Backend::configured().get_saved_maps(request)
}

/// Returns one saved map of the user.
#[flutter_rust_bridge::frb(sync)]
pub fn get_saved_map(request: MapRequest) -> OptionalMapResponse {
    Backend::configured().get_saved_map(request)
}

/// Generates a fresh map for every known user.
///
/// Per-user failures are reported in `failed`; the call itself only fails
/// when the database or user directory is unavailable.
#[flutter_rust_bridge::frb(sync)]
pub fn trigger_daily_map_generation() -> DailyGenerationResponse {
    Backend::configured().trigger_daily_map_generation()
}

/// Adds a named region to the user's current map.
#[flutter_rust_bridge::frb(sync)]
pub fn add_region(request: AddRegionRequest) -> IdResponse {
    Backend::configured().add_region(request)
}

/// Sets a region's pain score (1..=10).
#[flutter_rust_bridge::frb(sync)]
pub fn score_region(request: ScoreRegionRequest) -> AckResponse {
    Backend::configured().score_region(request)
}

/// Removes a region's score.
#[flutter_rust_bridge::frb(sync)]
pub fn clear_score(request: RegionRequest) -> AckResponse {
    Backend::configured().clear_score(request)
}

/// Permanently deletes a region.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_region(request: RegionRequest) -> AckResponse {
    Backend::configured().delete_region(request)
}

/// Returns one region owned by the user.
#[flutter_rust_bridge::frb(sync)]
pub fn get_region(request: RegionRequest) -> RegionResponse {
    Backend::configured().get_region(request)
}

/// Returns the regions of one owned map in creation order.
#[flutter_rust_bridge::frb(sync)]
pub fn get_regions_for_map(request: MapRequest) -> RegionsResponse {
    Backend::configured().get_regions_for_map(request)
}

struct Services<'conn> {
    lifecycle: MapLifecycleService<SqliteStores<'conn>>,
    scoring: ScoringService<SqliteStores<'conn>>,
    query: QueryService<SqliteStores<'conn>>,
}

/// Executes calls against one database file.
///
/// Request fields are parsed before the database is opened, so a malformed
/// request reports `validation` even when storage is unavailable.
struct Backend {
    db_path: PathBuf,
}

impl Backend {
    fn configured() -> Self {
        Self::at(resolve_db_path())
    }

    fn at(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    fn register_user(&self, request: UserRequest) -> AckResponse {
        ack(parse_user(&request.user).and_then(|user| {
            self.with_services(|services| Ok(services.lifecycle.register_user(&user)?))
        }))
    }

    fn generate_map(&self, request: UserRequest) -> IdResponse {
        id_response(parse_user(&request.user).and_then(|user| {
            self.with_services(|services| Ok(services.lifecycle.generate_map(&user)?))
        }))
    }

    fn save_map(&self, request: UserRequest) -> AckResponse {
        ack(parse_user(&request.user).and_then(|user| {
            self.with_services(|services| {
                services.lifecycle.save_map(&user)?;
                Ok(())
            })
        }))
    }

    fn clear_map(&self, request: UserRequest) -> AckResponse {
        ack(parse_user(&request.user).and_then(|user| {
            self.with_services(|services| {
                services.lifecycle.clear_map(&user)?;
                Ok(())
            })
        }))
    }

    fn get_current_map(&self, request: UserRequest) -> OptionalMapResponse {
        let result = parse_user(&request.user).and_then(|user| {
            self.with_services(|services| {
                Ok(services.query.get_current_map(&user)?.map(to_map_view))
            })
        });
        match result {
            Ok(map) => OptionalMapResponse { map, error: None },
            Err(error) => OptionalMapResponse {
                map: None,
                error: Some(error),
            },
        }
    }

    fn get_saved_maps(&self, request: UserRequest) -> MapsResponse {
        let result = parse_user(&request.user).and_then(|user| {
            self.with_services(|services| {
                let maps = services.query.get_saved_maps(&user)?;
                Ok(maps.into_iter().map(to_map_view).collect())
            })
        });
        match result {
            Ok(maps) => MapsResponse { maps, error: None },
            Err(error) => MapsResponse {
                maps: Vec::new(),
                error: Some(error),
            },
        }
    }

    fn get_saved_map(&self, request: MapRequest) -> OptionalMapResponse {
        let result = parse_map_request(&request).and_then(|(user, map_id)| {
            self.with_services(|services| {
                Ok(to_map_view(services.query.get_saved_map(&user, map_id)?))
            })
        });
        match result {
            Ok(map) => OptionalMapResponse {
                map: Some(map),
                error: None,
            },
            Err(error) => OptionalMapResponse {
                map: None,
                error: Some(error),
            },
        }
    }

    fn trigger_daily_map_generation(&self) -> DailyGenerationResponse {
        let result = self.with_services(|services| {
            Ok(services.lifecycle.trigger_daily_map_generation()?)
        });
        match result {
            Ok(summary) => to_daily_response(summary),
            Err(error) => DailyGenerationResponse {
                generated: Vec::new(),
                failed: Vec::new(),
                error: Some(error),
            },
        }
    }

    fn add_region(&self, request: AddRegionRequest) -> IdResponse {
        let parsed = parse_user(&request.user).and_then(|user| {
            parse_id(&request.map_id, "map_id").map(|map_id| (user, map_id))
        });
        id_response(parsed.and_then(|(user, map_id)| {
            self.with_services(|services| {
                Ok(services
                    .scoring
                    .add_region(&user, map_id, &request.region_name)?)
            })
        }))
    }

    fn score_region(&self, request: ScoreRegionRequest) -> AckResponse {
        let parsed = parse_user(&request.user).and_then(|user| {
            parse_id(&request.region_id, "region_id").map(|region_id| (user, region_id))
        });
        ack(parsed.and_then(|(user, region_id)| {
            self.with_services(|services| {
                Ok(services
                    .scoring
                    .score_region(&user, region_id, request.score)?)
            })
        }))
    }

    fn clear_score(&self, request: RegionRequest) -> AckResponse {
        ack(parse_region_request(&request).and_then(|(user, region_id)| {
            self.with_services(|services| Ok(services.scoring.clear_score(&user, region_id)?))
        }))
    }

    fn delete_region(&self, request: RegionRequest) -> AckResponse {
        ack(parse_region_request(&request).and_then(|(user, region_id)| {
            self.with_services(|services| Ok(services.scoring.delete_region(&user, region_id)?))
        }))
    }

    fn get_region(&self, request: RegionRequest) -> RegionResponse {
        let result = parse_region_request(&request).and_then(|(user, region_id)| {
            self.with_services(|services| {
                Ok(to_region_view(services.query.get_region(&user, region_id)?))
            })
        });
        match result {
            Ok(region) => RegionResponse {
                region: Some(region),
                error: None,
            },
            Err(error) => RegionResponse {
                region: None,
                error: Some(error),
            },
        }
    }

    fn get_regions_for_map(&self, request: MapRequest) -> RegionsResponse {
        let result = parse_map_request(&request).and_then(|(user, map_id)| {
            self.with_services(|services| {
                let regions = services.query.get_regions_for_map(&user, map_id)?;
                Ok(regions.into_iter().map(to_region_view).collect())
            })
        });
        match result {
            Ok(regions) => RegionsResponse {
                regions,
                error: None,
            },
            Err(error) => RegionsResponse {
                regions: Vec::new(),
                error: Some(error),
            },
        }
    }

    fn with_services<T>(
        &self,
        f: impl FnOnce(&Services<'_>) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let conn = open_db(&self.db_path).map_err(|err| {
            warn!("event=ffi_call module=ffi status=error error_code=db_open_failed");
            ApiError::storage(format!("database open failed: {err}"))
        })?;
        let stores = || {
            SqliteStores::try_new(&conn)
                .map_err(|err| ApiError::storage(format!("store init failed: {err}")))
        };
        let locks = user_locks();
        let services = Services {
            lifecycle: MapLifecycleService::new(stores()?, Arc::clone(&locks)),
            scoring: ScoringService::new(stores()?, locks),
            query: QueryService::new(stores()?),
        };
        f(&services)
    }
}

fn user_locks() -> Arc<UserLocks> {
    Arc::clone(USER_LOCKS.get_or_init(|| Arc::new(UserLocks::new())))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn parse_user(raw: &str) -> Result<UserId, ApiError> {
    UserId::parse(raw).map_err(|err| ApiError::validation(err.to_string()))
}

fn parse_id(raw: &str, field: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::validation(format!("{field} is not a valid id: `{raw}`")))
}

fn parse_map_request(request: &MapRequest) -> Result<(UserId, Uuid), ApiError> {
    Ok((
        parse_user(&request.user)?,
        parse_id(&request.map_id, "map_id")?,
    ))
}

fn parse_region_request(request: &RegionRequest) -> Result<(UserId, Uuid), ApiError> {
    Ok((
        parse_user(&request.user)?,
        parse_id(&request.region_id, "region_id")?,
    ))
}

fn ack(result: Result<(), ApiError>) -> AckResponse {
    AckResponse {
        error: result.err(),
    }
}

fn id_response(result: Result<Uuid, ApiError>) -> IdResponse {
    match result {
        Ok(id) => IdResponse {
            id: Some(id.to_string()),
            error: None,
        },
        Err(error) => IdResponse {
            id: None,
            error: Some(error),
        },
    }
}

fn to_region_view(region: Region) -> RegionView {
    RegionView {
        region_id: region.id.to_string(),
        map_id: region.map_id.to_string(),
        name: region.name,
        score: region.score.map(|score| score.value()),
        created_at: region.created_at,
    }
}

fn to_map_view(entry: MapWithRegions) -> MapView {
    MapView {
        map_id: entry.map.id.to_string(),
        status: entry.map.status.as_str().to_string(),
        created_at: entry.map.created_at,
        saved_at: entry.map.saved_at,
        regions: entry.regions.into_iter().map(to_region_view).collect(),
    }
}

fn to_daily_response(summary: DailyGenerationSummary) -> DailyGenerationResponse {
    DailyGenerationResponse {
        generated: summary
            .generated
            .into_iter()
            .map(|(user, map_id)| (user.to_string(), map_id.to_string()))
            .collect(),
        failed: summary
            .failed
            .into_iter()
            .map(|failure| UserFailureView {
                user: failure.user.to_string(),
                code: failure.kind.code().to_string(),
                message: failure.message,
            })
            .collect(),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, generate_map, init_logging, ping, register_user,
        trigger_daily_map_generation, AddRegionRequest, Backend, MapRequest, RegionRequest,
        ScoreRegionRequest, UserRequest, DB_PATH,
    };
    use tempfile::TempDir;

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn full_flow_generate_score_save() {
        let (_dir, backend) = temp_backend();
        let user = "ffi-flow".to_string();
        let generated = backend.generate_map(user_request(&user));
        assert_eq!(generated.error, None);
        let map_id = generated.id.expect("generate should return map id");

        let added = backend.add_region(AddRegionRequest {
            user: user.clone(),
            map_id: map_id.clone(),
            region_name: "left-shoulder".to_string(),
        });
        assert_eq!(added.error, None);
        let region_id = added.id.expect("add_region should return region id");

        let scored = backend.score_region(ScoreRegionRequest {
            user: user.clone(),
            region_id: region_id.clone(),
            score: 7,
        });
        assert_eq!(scored.error, None);

        let current = backend
            .get_current_map(user_request(&user))
            .map
            .expect("current map should exist");
        assert_eq!(current.map_id, map_id);
        assert_eq!(current.status, "current");
        assert_eq!(current.regions[0].score, Some(7));

        assert_eq!(backend.save_map(user_request(&user)).error, None);
        let after_save = backend.get_current_map(user_request(&user));
        assert_eq!(after_save.error, None);
        assert_eq!(after_save.map, None);

        let saved = backend.get_saved_maps(user_request(&user));
        assert_eq!(saved.maps.len(), 1);
        assert_eq!(saved.maps[0].status, "saved");
        assert_eq!(saved.maps[0].regions[0].region_id, region_id);

        let single = backend.get_saved_map(MapRequest {
            user: user.clone(),
            map_id: map_id.clone(),
        });
        assert_eq!(single.map.as_ref(), saved.maps.first());
    }

    #[test]
    fn errors_carry_stable_codes() {
        let (_dir, backend) = temp_backend();
        let owner = "ffi-owner".to_string();
        let other = "ffi-other".to_string();
        let map_id = backend.generate_map(user_request(&owner)).id.unwrap();
        let region_id = backend
            .add_region(AddRegionRequest {
                user: owner.clone(),
                map_id: map_id.clone(),
                region_name: "knee".to_string(),
            })
            .id
            .unwrap();

        let out_of_range = backend.score_region(ScoreRegionRequest {
            user: owner.clone(),
            region_id: region_id.clone(),
            score: 11,
        });
        assert_eq!(out_of_range.error.unwrap().code, "validation");

        let foreign = backend.get_region(RegionRequest {
            user: other.clone(),
            region_id: region_id.clone(),
        });
        assert_eq!(foreign.region, None);
        assert_eq!(foreign.error.unwrap().code, "permission");

        let duplicate = backend.generate_map(user_request(&owner));
        assert_eq!(duplicate.error.unwrap().code, "conflict");

        let nothing_to_save = backend.save_map(user_request(&other));
        assert_eq!(nothing_to_save.error.unwrap().code, "not_found");

        let bad_id = backend.get_regions_for_map(MapRequest {
            user: owner.clone(),
            map_id: "not-a-uuid".to_string(),
        });
        assert_eq!(bad_id.error.unwrap().code, "validation");

        let blank_user = backend.generate_map(user_request("   "));
        assert_eq!(blank_user.error.unwrap().code, "validation");
    }

    #[test]
    fn malformed_requests_are_validation_errors_even_without_storage() {
        let dir = TempDir::new().unwrap();
        let backend = Backend::at(dir.path().join("missing").join("bodymap.sqlite3"));

        let blank_user = backend.save_map(user_request(" "));
        assert_eq!(blank_user.error.unwrap().code, "validation");

        let bad_region = backend.clear_score(RegionRequest {
            user: "u1".to_string(),
            region_id: "nope".to_string(),
        });
        assert_eq!(bad_region.error.unwrap().code, "validation");

        let bad_map = backend.add_region(AddRegionRequest {
            user: "u1".to_string(),
            map_id: String::new(),
            region_name: "neck".to_string(),
        });
        assert_eq!(bad_map.error.unwrap().code, "validation");

        let well_formed = backend.save_map(user_request("u1"));
        assert_eq!(well_formed.error.unwrap().code, "storage");

        let daily = backend.trigger_daily_map_generation();
        assert_eq!(daily.error.unwrap().code, "storage");
    }

    #[test]
    fn delete_and_clear_empty_the_map() {
        let (_dir, backend) = temp_backend();
        let user = "ffi-clear".to_string();
        let map_id = backend.generate_map(user_request(&user)).id.unwrap();
        let mut region_ids = Vec::new();
        for name in ["neck", "hip"] {
            region_ids.push(
                backend
                    .add_region(AddRegionRequest {
                        user: user.clone(),
                        map_id: map_id.clone(),
                        region_name: name.to_string(),
                    })
                    .id
                    .unwrap(),
            );
        }

        let deleted = backend.delete_region(RegionRequest {
            user: user.clone(),
            region_id: region_ids[0].clone(),
        });
        assert_eq!(deleted.error, None);
        let missing = backend.get_region(RegionRequest {
            user: user.clone(),
            region_id: region_ids[0].clone(),
        });
        assert_eq!(missing.error.unwrap().code, "not_found");

        assert_eq!(backend.clear_map(user_request(&user)).error, None);
        let regions = backend.get_regions_for_map(MapRequest {
            user: user.clone(),
            map_id,
        });
        assert_eq!(regions.error, None);
        assert!(regions.regions.is_empty());
    }

    #[test]
    fn daily_generation_reports_per_user_outcomes() {
        let (_dir, backend) = temp_backend();
        assert_eq!(backend.generate_map(user_request("busy")).error, None);
        assert_eq!(backend.register_user(user_request("idle")).error, None);

        let response = backend.trigger_daily_map_generation();
        assert_eq!(response.error, None);
        assert_eq!(response.generated.len(), 1);
        assert_eq!(response.generated[0].0, "idle");
        assert_eq!(response.failed.len(), 1);
        assert_eq!(response.failed[0].user, "busy");
        assert_eq!(response.failed[0].code, "conflict");
    }

    #[test]
    fn register_user_is_idempotent() {
        let (_dir, backend) = temp_backend();
        assert_eq!(backend.register_user(user_request("ffi-register")).error, None);
        assert_eq!(backend.register_user(user_request("ffi-register")).error, None);
    }

    // Only test that resolves the process-wide database path.
    #[test]
    fn exported_calls_use_configured_database() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("configured.sqlite3");
        DB_PATH.set(db_path.clone()).unwrap();

        assert_eq!(generate_map(user_request("alpha")).error, None);
        assert_eq!(register_user(user_request("beta")).error, None);

        let response = trigger_daily_map_generation();
        assert_eq!(response.error, None);
        assert_eq!(response.generated.len(), 1);
        assert_eq!(response.generated[0].0, "beta");
        assert_eq!(response.failed.len(), 1);
        assert_eq!(response.failed[0].user, "alpha");
        assert!(db_path.exists());
    }

    fn temp_backend() -> (TempDir, Backend) {
        let dir = TempDir::new().unwrap();
        let backend = Backend::at(dir.path().join("bodymap.sqlite3"));
        (dir, backend)
    }

    fn user_request(user: &str) -> UserRequest {
        UserRequest {
            user: user.to_string(),
        }
    }
}
