//! Body map domain model.
//!
//! # Responsibility
//! - Define the map record and its two-state lifecycle.
//! - Provide the map-with-regions projection returned to callers.
//!
//! # Invariants
//! - `saved_at` is present if and only if `status == MapStatus::Saved`.
//! - `saved_at` is never earlier than `created_at`.
//! - At most one `Current` map exists per owner (enforced by storage).

use crate::model::region::Region;
use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one body map.
pub type MapId = Uuid;

/// Lifecycle state of a body map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStatus {
    /// The user's open map; regions may be added, scored and deleted.
    Current,
    /// Closed historical snapshot; immutable.
    Saved,
}

impl MapStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Saved => "saved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "current" => Some(Self::Current),
            "saved" => Some(Self::Saved),
            _ => None,
        }
    }
}

/// Canonical map record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyMap {
    pub id: MapId,
    pub owner: UserId,
    pub status: MapStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Set only once the map is saved.
    pub saved_at: Option<i64>,
}

impl BodyMap {
    /// Creates a new empty current map with a generated id.
    pub fn new_current(owner: UserId, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            status: MapStatus::Current,
            created_at,
            saved_at: None,
        }
    }

    pub fn is_current(&self) -> bool {
        self.status == MapStatus::Current
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    /// Validates lifecycle stamps.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.status, self.saved_at) {
            (MapStatus::Current, Some(_)) => Err(ValidationError::SavedAtOnCurrentMap),
            (MapStatus::Saved, None) => Err(ValidationError::SavedAtMissing),
            (MapStatus::Saved, Some(saved_at)) if saved_at < self.created_at => {
                Err(ValidationError::SavedBeforeCreated)
            }
            _ => Ok(()),
        }
    }
}

/// One map together with its regions in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapWithRegions {
    pub map: BodyMap,
    pub regions: Vec<Region>,
}

impl MapWithRegions {
    /// Number of regions that carry a score.
    pub fn scored_count(&self) -> usize {
        self.regions
            .iter()
            .filter(|region| region.score.is_some())
            .count()
    }

    /// Highest pain score in this map, if any region is scored.
    pub fn max_score(&self) -> Option<u8> {
        self.regions
            .iter()
            .filter_map(|region| region.score.map(|score| score.value()))
            .max()
    }
}
