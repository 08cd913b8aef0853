//! Store bundle with transaction scoping.
//!
//! # Responsibility
//! - Hand services both stores over one connection.
//! - Run multi-step mutations atomically and queries on one snapshot.
//!
//! # Invariants
//! - `write_scope` takes the SQLite write lock up front (`BEGIN IMMEDIATE`);
//!   an `Err` from the closure rolls everything back.
//! - `read_scope` observes only committed data from a single snapshot.
//! - Scopes do not nest.

use crate::repo::map_repo::{MapRepository, RepoError, RepoResult, SqliteMapRepository};
use crate::repo::region_repo::{RegionRepository, SqliteRegionRepository};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Map and region stores plus the unit-of-work boundary they share.
pub trait StoreSet {
    type Maps: MapRepository;
    type Regions: RegionRepository;

    fn maps(&self) -> &Self::Maps;
    fn regions(&self) -> &Self::Regions;

    /// Runs `f` inside one write transaction.
    fn write_scope<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>;

    /// Runs `f` inside one read transaction.
    fn read_scope<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>;
}

/// SQLite-backed store bundle.
pub struct SqliteStores<'conn> {
    conn: &'conn Connection,
    maps: SqliteMapRepository<'conn>,
    regions: SqliteRegionRepository<'conn>,
}

impl<'conn> SqliteStores<'conn> {
    /// Constructs both stores from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            conn,
            maps: SqliteMapRepository::try_new(conn)?,
            regions: SqliteRegionRepository::try_new(conn)?,
        })
    }

    fn scoped<T, E>(
        &self,
        behavior: TransactionBehavior,
        f: impl FnOnce(&Self) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        let tx = Transaction::new_unchecked(self.conn, behavior).map_err(RepoError::from)?;
        // Dropping `tx` on the error path rolls back.
        let value = f(self)?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}

impl<'conn> StoreSet for SqliteStores<'conn> {
    type Maps = SqliteMapRepository<'conn>;
    type Regions = SqliteRegionRepository<'conn>;

    fn maps(&self) -> &Self::Maps {
        &self.maps
    }

    fn regions(&self) -> &Self::Regions {
        &self.regions
    }

    fn write_scope<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        self.scoped(TransactionBehavior::Immediate, f)
    }

    fn read_scope<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        self.scoped(TransactionBehavior::Deferred, f)
    }
}
