//! Body map schema steps and the runner that brings a file up to date.
//!
//! Steps are numbered from 1 and never renumbered; the highest applied step
//! is stored in `PRAGMA user_version`. All pending steps commit together.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension};

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Tables and indexes the map services depend on, as `(type, name)`.
const REQUIRED_OBJECTS: &[(&str, &str)] = &[
    ("table", "known_users"),
    ("table", "body_maps"),
    ("table", "body_regions"),
    ("index", "idx_body_maps_one_current_per_owner"),
];

/// Highest schema step this build knows how to apply.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Upgrades the body map schema on `conn` and verifies the result.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is ahead of this build.
/// - `Migration` when a step fails; the upgrade is rolled back.
/// - `MissingSchemaObject` when the file reports the latest version but
///   lacks a required table or the one-current-map index.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();

    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    if from < latest {
        let tx = conn.transaction()?;
        for step in SCHEMA_STEPS.iter().filter(|step| step.version > from) {
            tx.execute_batch(step.sql)
                .and_then(|()| {
                    tx.execute_batch(&format!("PRAGMA user_version = {};", step.version))
                })
                .map_err(|source| DbError::Migration {
                    version: step.version,
                    source,
                })?;
        }
        tx.commit()?;
        info!("event=db_migrate module=db status=ok from_version={from} to_version={latest}");
    } else {
        debug!("event=db_migrate module=db status=skip version={from}");
    }

    verify_required_objects(conn)
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

fn verify_required_objects(conn: &Connection) -> DbResult<()> {
    for &(kind, name) in REQUIRED_OBJECTS {
        let found = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2;",
                [kind, name],
                |_| Ok(()),
            )
            .optional()?;
        if found.is_none() {
            return Err(DbError::MissingSchemaObject(name));
        }
    }
    Ok(())
}
