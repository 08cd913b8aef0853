//! Body map storage: connection setup and schema upgrades.
//!
//! A usable connection has `known_users`, `body_maps` and `body_regions`
//! at the latest `PRAGMA user_version`, plus the partial index that allows
//! one current map per owner. Services never see a connection before that
//! holds.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to produce a connection that can store body maps.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A schema step failed; nothing from the upgrade was kept.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a build with a newer body map schema.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// `user_version` claims the schema is current but a table or index the
    /// map invariants rely on is absent.
    MissingSchemaObject(&'static str),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Migration { version, source } => {
                write!(f, "body map schema step {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "body map schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::MissingSchemaObject(name) => {
                write!(f, "body map schema is missing `{name}`")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::MissingSchemaObject(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
