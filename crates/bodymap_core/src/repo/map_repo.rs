//! Map store: repository contract and SQLite implementation for body maps.
//!
//! # Responsibility
//! - Own `body_maps` rows and the `known_users` directory.
//! - Enforce map-level lifecycle transitions (`current -> saved`).
//!
//! # Invariants
//! - Write paths call `BodyMap::validate()` before SQL mutations.
//! - A second current map for one owner is rejected by the partial unique
//!   index and surfaces as `RepoError::CurrentMapExists`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::body_map::{BodyMap, MapId, MapStatus};
use crate::model::region::RegionId;
use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use rusqlite::{ffi, params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const MAP_SELECT_SQL: &str = "SELECT
    uuid,
    owner,
    status,
    created_at,
    saved_at
FROM body_maps";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by the map and region stores.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    MapNotFound(MapId),
    RegionNotFound(RegionId),
    /// Owner already has a current map.
    CurrentMapExists(UserId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MapNotFound(id) => write!(f, "map not found: {id}"),
            Self::RegionNotFound(id) => write!(f, "region not found: {id}"),
            Self::CurrentMapExists(owner) => {
                write!(f, "user `{owner}` already has a current map")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for map records and the user directory.
pub trait MapRepository {
    /// Records `user` in the directory. No-op when already known.
    fn register_user(&self, user: &UserId, seen_at: i64) -> RepoResult<()>;
    /// Lists every known user, oldest first.
    fn list_known_users(&self) -> RepoResult<Vec<UserId>>;
    /// Inserts a new map row.
    fn insert_map(&self, map: &BodyMap) -> RepoResult<MapId>;
    fn get_map(&self, id: MapId) -> RepoResult<Option<BodyMap>>;
    fn find_current_map(&self, owner: &UserId) -> RepoResult<Option<BodyMap>>;
    /// Transitions a current map to saved. Saved maps are not touched.
    fn mark_saved(&self, id: MapId, saved_at: i64) -> RepoResult<()>;
    /// Lists saved maps ordered by `saved_at ASC`, then insertion order.
    fn list_saved_maps(&self, owner: &UserId) -> RepoResult<Vec<BodyMap>>;
}

/// SQLite-backed map repository.
pub struct SqliteMapRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMapRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for table in ["body_maps", "known_users"] {
            ensure_table(conn, table)?;
        }
        Ok(Self { conn })
    }
}

impl MapRepository for SqliteMapRepository<'_> {
    fn register_user(&self, user: &UserId, seen_at: i64) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO known_users (user_id, first_seen_at) VALUES (?1, ?2);",
            params![user.as_str(), seen_at],
        )?;
        Ok(())
    }

    fn list_known_users(&self) -> RepoResult<Vec<UserId>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id FROM known_users ORDER BY first_seen_at ASC, user_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            let raw: String = row.get(0)?;
            let user = UserId::parse(&raw).map_err(|_| {
                RepoError::InvalidData(format!("invalid user id `{raw}` in known_users"))
            })?;
            users.push(user);
        }
        Ok(users)
    }

    fn insert_map(&self, map: &BodyMap) -> RepoResult<MapId> {
        map.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO body_maps (uuid, owner, status, created_at, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                map.id.to_string(),
                map.owner.as_str(),
                map.status.as_str(),
                map.created_at,
                map.saved_at,
            ],
        );

        match inserted {
            Ok(_) => Ok(map.id),
            Err(err) if is_constraint(&err, ffi::SQLITE_CONSTRAINT_UNIQUE) => {
                Err(RepoError::CurrentMapExists(map.owner.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_map(&self, id: MapId) -> RepoResult<Option<BodyMap>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MAP_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_map_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_current_map(&self, owner: &UserId) -> RepoResult<Option<BodyMap>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MAP_SELECT_SQL} WHERE owner = ?1 AND status = 'current';"
        ))?;
        let mut rows = stmt.query([owner.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_map_row(row)?)),
            None => Ok(None),
        }
    }

    fn mark_saved(&self, id: MapId, saved_at: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE body_maps
             SET status = 'saved',
                 saved_at = max(?2, created_at)
             WHERE uuid = ?1
               AND status = 'current';",
            params![id.to_string(), saved_at],
        )?;

        if changed == 0 {
            return Err(RepoError::MapNotFound(id));
        }
        Ok(())
    }

    fn list_saved_maps(&self, owner: &UserId) -> RepoResult<Vec<BodyMap>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MAP_SELECT_SQL}
             WHERE owner = ?1
               AND status = 'saved'
             ORDER BY saved_at ASC, seq ASC;"
        ))?;
        let mut rows = stmt.query([owner.as_str()])?;
        let mut maps = Vec::new();
        while let Some(row) = rows.next()? {
            maps.push(parse_map_row(row)?);
        }
        Ok(maps)
    }
}

fn parse_map_row(row: &Row<'_>) -> RepoResult<BodyMap> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "body_maps.uuid")?;

    let owner_text: String = row.get("owner")?;
    let owner = UserId::parse(&owner_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid owner `{owner_text}` in body_maps.owner"))
    })?;

    let status_text: String = row.get("status")?;
    let status = MapStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in body_maps.status"))
    })?;

    let map = BodyMap {
        id,
        owner,
        status,
        created_at: row.get("created_at")?,
        saved_at: row.get("saved_at")?,
    };
    map.validate()?;
    Ok(map)
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

/// Matches SQLite failures by extended result code (`SQLITE_CONSTRAINT_*`).
pub(crate) fn is_constraint(err: &rusqlite::Error, extended_code: i32) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.extended_code == extended_code
    )
}

pub(crate) fn ensure_table(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::MissingRequiredTable(table))
    }
}
