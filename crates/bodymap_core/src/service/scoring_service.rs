//! Region scoring use-case service.
//!
//! # Responsibility
//! - Add and delete regions on the caller's current map.
//! - Validate and apply pain scores.
//!
//! # Invariants
//! - Only the owner's current map accepts region changes.
//! - A rejected score leaves the stored score untouched.
//! - Rescoring overwrites; there is no score history.

use crate::model::body_map::MapId;
use crate::model::now_epoch_ms;
use crate::model::region::{normalize_region_name, PainScore, Region, RegionId};
use crate::model::user::UserId;
use crate::repo::map_repo::RepoResult;
use crate::repo::region_repo::RegionRepository;
use crate::repo::store_set::StoreSet;
use crate::service::error::{BodyMapError, ServiceResult};
use crate::service::ownership::{mutable_region, owned_map};
use crate::service::user_lock::UserLocks;
use log::{debug, warn};
use std::sync::Arc;

/// Scoring service facade over the map and region stores.
pub struct ScoringService<S: StoreSet> {
    stores: S,
    locks: Arc<UserLocks>,
}

impl<S: StoreSet> ScoringService<S> {
    /// Creates a service using the provided stores and shared lock registry.
    pub fn new(stores: S, locks: Arc<UserLocks>) -> Self {
        Self { stores, locks }
    }

    /// Adds a named region to the caller's current map.
    ///
    /// # Errors
    /// - `Invalid` for a blank or oversized name.
    /// - `MapNotFound` / `MapNotOwned` for an unknown or foreign map.
    /// - `MapNotCurrent` when the map is already saved.
    pub fn add_region(
        &self,
        user: &UserId,
        map_id: MapId,
        region_name: &str,
    ) -> ServiceResult<RegionId> {
        let name = normalize_region_name(region_name)?;
        let result = self.locks.with_user(user, || {
            self.stores.write_scope(|stores| {
                let map = owned_map(stores, user, map_id)?;
                if !map.is_current() {
                    return Err(BodyMapError::MapNotCurrent(map_id));
                }
                let region = Region::new(map.id, name.as_str(), now_epoch_ms())?;
                Ok(stores.regions().insert_region(&region)?)
            })
        });
        match &result {
            Ok(region_id) => debug!(
                "event=region_add module=service status=ok map_id={map_id} region_id={region_id}"
            ),
            Err(err) => warn!(
                "event=region_add module=service status=error map_id={map_id} error_code={}",
                err.kind().code()
            ),
        }
        result
    }

    /// Sets the pain score of one region, replacing any previous score.
    ///
    /// # Errors
    /// - `Invalid` when `score` is outside `[1, 10]`.
    /// - `RegionNotFound` / `RegionNotOwned` for an unknown or foreign region.
    /// - `MapNotCurrent` when the region belongs to a saved map.
    pub fn score_region(
        &self,
        user: &UserId,
        region_id: RegionId,
        score: i64,
    ) -> ServiceResult<()> {
        let score = PainScore::new(score)?;
        self.write_region(user, region_id, "region_score", |stores| {
            stores.regions().set_score(region_id, Some(score))
        })
    }

    /// Removes the score of one region, leaving it unscored.
    pub fn clear_score(&self, user: &UserId, region_id: RegionId) -> ServiceResult<()> {
        self.write_region(user, region_id, "region_clear_score", |stores| {
            stores.regions().set_score(region_id, None)
        })
    }

    /// Permanently removes one region.
    pub fn delete_region(&self, user: &UserId, region_id: RegionId) -> ServiceResult<()> {
        self.write_region(user, region_id, "region_delete", |stores| {
            stores.regions().delete_region(region_id)
        })
    }

    fn write_region(
        &self,
        user: &UserId,
        region_id: RegionId,
        event: &str,
        apply: impl FnOnce(&S) -> RepoResult<()>,
    ) -> ServiceResult<()> {
        let result = self.locks.with_user(user, || {
            self.stores.write_scope(|stores| {
                mutable_region(stores, user, region_id)?;
                apply(stores).map_err(BodyMapError::from)
            })
        });
        match &result {
            Ok(()) => debug!("event={event} module=service status=ok region_id={region_id}"),
            Err(err) => warn!(
                "event={event} module=service status=error region_id={region_id} error_code={}",
                err.kind().code()
            ),
        }
        result
    }
}
