//! Map lifecycle use-case service.
//!
//! # Responsibility
//! - Generate, save and clear a user's current map.
//! - Run the daily bulk generation over a user directory.
//!
//! # Invariants
//! - At most one current map per user; `generate_map` never replaces one.
//! - `clear_map` keeps the map id and `current` status and drops every
//!   region in the same transaction.
//! - One user's failure in the daily job never affects another user.

use crate::model::body_map::{BodyMap, MapId};
use crate::model::now_epoch_ms;
use crate::model::user::UserId;
use crate::repo::map_repo::{MapRepository, RepoResult, SqliteMapRepository};
use crate::repo::region_repo::RegionRepository;
use crate::repo::store_set::StoreSet;
use crate::service::error::{BodyMapError, ErrorKind, ServiceResult};
use crate::service::user_lock::UserLocks;
use log::{info, warn};
use std::collections::HashSet;
use std::sync::Arc;

/// Enumerable source of users for the daily job.
pub trait UserDirectory {
    fn list_users(&self) -> RepoResult<Vec<UserId>>;
}

impl UserDirectory for [UserId] {
    fn list_users(&self) -> RepoResult<Vec<UserId>> {
        Ok(self.to_vec())
    }
}

impl UserDirectory for Vec<UserId> {
    fn list_users(&self) -> RepoResult<Vec<UserId>> {
        Ok(self.clone())
    }
}

impl UserDirectory for SqliteMapRepository<'_> {
    fn list_users(&self) -> RepoResult<Vec<UserId>> {
        self.list_known_users()
    }
}

/// One user the daily job could not generate a map for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGenerationFailure {
    pub user: UserId,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of one daily generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyGenerationSummary {
    /// Users that received a fresh current map, in directory order.
    pub generated: Vec<(UserId, MapId)>,
    /// Users whose generation failed, in directory order.
    pub failed: Vec<UserGenerationFailure>,
}

impl DailyGenerationSummary {
    pub fn total(&self) -> usize {
        self.generated.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Lifecycle service facade over the map and region stores.
pub struct MapLifecycleService<S: StoreSet> {
    stores: S,
    locks: Arc<UserLocks>,
}

impl<S: StoreSet> MapLifecycleService<S> {
    /// Creates a service using the provided stores and shared lock registry.
    pub fn new(stores: S, locks: Arc<UserLocks>) -> Self {
        Self { stores, locks }
    }

    /// Records `user` in the directory used by the daily job.
    pub fn register_user(&self, user: &UserId) -> ServiceResult<()> {
        self.locks.with_user(user, || {
            self.stores.write_scope(|stores| {
                stores
                    .maps()
                    .register_user(user, now_epoch_ms())
                    .map_err(BodyMapError::from)
            })
        })
    }

    /// Creates a new empty current map for `user`.
    ///
    /// # Errors
    /// - `CurrentMapExists` when the user already has a current map.
    pub fn generate_map(&self, user: &UserId) -> ServiceResult<MapId> {
        let result = self.locks.with_user(user, || {
            self.stores.write_scope(|stores| {
                if stores.maps().find_current_map(user)?.is_some() {
                    return Err(BodyMapError::CurrentMapExists(user.clone()));
                }
                let now = now_epoch_ms();
                stores.maps().register_user(user, now)?;
                let map = BodyMap::new_current(user.clone(), now);
                Ok(stores.maps().insert_map(&map)?)
            })
        });
        log_outcome("map_generate", &result, |map_id| format!("map_id={map_id}"));
        result
    }

    /// Moves the user's current map into history.
    ///
    /// Afterwards the user has no current map until the next generation.
    ///
    /// # Errors
    /// - `NoCurrentMap` when there is nothing to save.
    pub fn save_map(&self, user: &UserId) -> ServiceResult<MapId> {
        let result = self.locks.with_user(user, || {
            self.stores.write_scope(|stores| {
                let current = stores
                    .maps()
                    .find_current_map(user)?
                    .ok_or_else(|| BodyMapError::NoCurrentMap(user.clone()))?;
                stores.maps().mark_saved(current.id, now_epoch_ms())?;
                Ok(current.id)
            })
        });
        log_outcome("map_save", &result, |map_id| format!("map_id={map_id}"));
        result
    }

    /// Removes every region of the user's current map.
    ///
    /// Returns the number of regions removed.
    ///
    /// # Errors
    /// - `NoCurrentMap` when there is nothing to clear.
    pub fn clear_map(&self, user: &UserId) -> ServiceResult<usize> {
        let result = self.locks.with_user(user, || {
            self.stores.write_scope(|stores| {
                let current = stores
                    .maps()
                    .find_current_map(user)?
                    .ok_or_else(|| BodyMapError::NoCurrentMap(user.clone()))?;
                Ok(stores.regions().delete_regions_for_map(current.id)?)
            })
        });
        log_outcome("map_clear", &result, |removed| format!("regions_removed={removed}"));
        result
    }

    /// Generates a map for every user in the store's own directory.
    pub fn trigger_daily_map_generation(&self) -> ServiceResult<DailyGenerationSummary>
    where
        S::Maps: UserDirectory,
    {
        let users = self.stores.maps().list_users()?;
        Ok(self.generate_for_users(users))
    }

    /// Generates a map for every user listed by `directory`.
    ///
    /// Only a failure to enumerate users is returned as `Err`; per-user
    /// failures are collected in the summary.
    pub fn trigger_daily_map_generation_for<D>(
        &self,
        directory: &D,
    ) -> ServiceResult<DailyGenerationSummary>
    where
        D: UserDirectory + ?Sized,
    {
        let users = directory.list_users()?;
        Ok(self.generate_for_users(users))
    }

    fn generate_for_users(&self, users: Vec<UserId>) -> DailyGenerationSummary {
        let mut seen = HashSet::new();
        let mut summary = DailyGenerationSummary::default();

        for user in users {
            if !seen.insert(user.clone()) {
                continue;
            }
            match self.generate_map(&user) {
                Ok(map_id) => summary.generated.push((user, map_id)),
                Err(err) => summary.failed.push(UserGenerationFailure {
                    kind: err.kind(),
                    message: err.to_string(),
                    user,
                }),
            }
        }

        info!(
            "event=daily_generation module=service status={} users={} generated={} failed={}",
            if summary.is_clean() { "ok" } else { "partial" },
            summary.total(),
            summary.generated.len(),
            summary.failed.len()
        );
        summary
    }
}

fn log_outcome<T>(event: &str, result: &ServiceResult<T>, describe: impl FnOnce(&T) -> String) {
    match result {
        Ok(value) => info!("event={event} module=service status=ok {}", describe(value)),
        Err(err) => warn!(
            "event={event} module=service status=error error_code={}",
            err.kind().code()
        ),
    }
}
