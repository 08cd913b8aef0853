//! Region store: repository contract and SQLite implementation for regions.
//!
//! # Responsibility
//! - Own `body_regions` rows and their scores.
//! - Keep region membership tied to an existing map.
//!
//! # Invariants
//! - Inserting a region for an unknown map fails with `MapNotFound`
//!   (foreign key on `body_maps.uuid`).
//! - Regions are listed in creation order (`seq ASC`).
//! - Deleting a map row cascades to its regions.

use crate::model::body_map::MapId;
use crate::model::region::{PainScore, Region, RegionId};
use crate::repo::map_repo::{ensure_table, is_constraint, parse_uuid, RepoError, RepoResult};
use rusqlite::{ffi, params, Connection, Row};

const REGION_SELECT_SQL: &str = "SELECT
    uuid,
    map_uuid,
    name,
    score,
    created_at
FROM body_regions";

/// Repository interface for region records.
pub trait RegionRepository {
    fn insert_region(&self, region: &Region) -> RepoResult<RegionId>;
    fn get_region(&self, id: RegionId) -> RepoResult<Option<Region>>;
    /// Lists regions of one map in creation order.
    fn list_regions_for_map(&self, map_id: MapId) -> RepoResult<Vec<Region>>;
    /// Replaces (or clears, with `None`) the score of one region.
    fn set_score(&self, id: RegionId, score: Option<PainScore>) -> RepoResult<()>;
    fn delete_region(&self, id: RegionId) -> RepoResult<()>;
    /// Removes every region of one map and returns how many were removed.
    fn delete_regions_for_map(&self, map_id: MapId) -> RepoResult<usize>;
}

/// SQLite-backed region repository.
pub struct SqliteRegionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegionRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(conn, "body_regions")?;
        Ok(Self { conn })
    }
}

impl RegionRepository for SqliteRegionRepository<'_> {
    fn insert_region(&self, region: &Region) -> RepoResult<RegionId> {
        region.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO body_regions (uuid, map_uuid, name, score, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                region.id.to_string(),
                region.map_id.to_string(),
                region.name.as_str(),
                region.score.map(i64::from),
                region.created_at,
            ],
        );

        match inserted {
            Ok(_) => Ok(region.id),
            Err(err) if is_constraint(&err, ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
                Err(RepoError::MapNotFound(region.map_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_region(&self, id: RegionId) -> RepoResult<Option<Region>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REGION_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_region_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_regions_for_map(&self, map_id: MapId) -> RepoResult<Vec<Region>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REGION_SELECT_SQL} WHERE map_uuid = ?1 ORDER BY seq ASC;"
        ))?;
        let mut rows = stmt.query([map_id.to_string()])?;
        let mut regions = Vec::new();
        while let Some(row) = rows.next()? {
            regions.push(parse_region_row(row)?);
        }
        Ok(regions)
    }

    fn set_score(&self, id: RegionId, score: Option<PainScore>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE body_regions SET score = ?2 WHERE uuid = ?1;",
            params![id.to_string(), score.map(i64::from)],
        )?;
        if changed == 0 {
            return Err(RepoError::RegionNotFound(id));
        }
        Ok(())
    }

    fn delete_region(&self, id: RegionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM body_regions WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::RegionNotFound(id));
        }
        Ok(())
    }

    fn delete_regions_for_map(&self, map_id: MapId) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM body_regions WHERE map_uuid = ?1;",
            [map_id.to_string()],
        )?;
        Ok(removed)
    }
}

fn parse_region_row(row: &Row<'_>) -> RepoResult<Region> {
    let uuid_text: String = row.get("uuid")?;
    let map_text: String = row.get("map_uuid")?;

    let score = match row.get::<_, Option<i64>>("score")? {
        Some(value) => Some(PainScore::new(value).map_err(|_| {
            RepoError::InvalidData(format!("invalid score `{value}` in body_regions.score"))
        })?),
        None => None,
    };

    let region = Region {
        id: parse_uuid(&uuid_text, "body_regions.uuid")?,
        map_id: parse_uuid(&map_text, "body_regions.map_uuid")?,
        name: row.get("name")?,
        score,
        created_at: row.get("created_at")?,
    };
    region.validate()?;
    Ok(region)
}
