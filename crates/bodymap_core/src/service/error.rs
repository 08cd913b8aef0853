//! Service-level error taxonomy.
//!
//! # Responsibility
//! - Translate repository failures into caller-facing errors.
//! - Classify every error into one of the stable `ErrorKind` buckets.

use crate::model::body_map::MapId;
use crate::model::region::RegionId;
use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use crate::repo::map_repo::RepoError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input: blank name, out-of-range score, blank user id.
    Validation,
    /// Referenced map, region or current-map state does not exist.
    NotFound,
    /// Entity exists but belongs to another user.
    Permission,
    /// Operation would break a lifecycle invariant.
    Conflict,
    /// Storage failure or corrupted persisted data.
    Storage,
}

impl ErrorKind {
    /// Stable textual code used by transport envelopes.
    pub fn code(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Permission => "permission",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
        }
    }
}

/// Errors returned by lifecycle, scoring and query services.
#[derive(Debug)]
pub enum BodyMapError {
    Invalid(ValidationError),
    /// User has no current map.
    NoCurrentMap(UserId),
    MapNotFound(MapId),
    RegionNotFound(RegionId),
    MapNotOwned(MapId),
    RegionNotOwned(RegionId),
    /// User already has a current map; `generate_map` does not replace it.
    CurrentMapExists(UserId),
    /// Target map is saved history and cannot change.
    MapNotCurrent(MapId),
    Repo(RepoError),
}

impl BodyMapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid(_) => ErrorKind::Validation,
            Self::NoCurrentMap(_) | Self::MapNotFound(_) | Self::RegionNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::MapNotOwned(_) | Self::RegionNotOwned(_) => ErrorKind::Permission,
            Self::CurrentMapExists(_) | Self::MapNotCurrent(_) => ErrorKind::Conflict,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }
}

impl Display for BodyMapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::NoCurrentMap(user) => write!(f, "user `{user}` has no current map"),
            Self::MapNotFound(id) => write!(f, "map not found: {id}"),
            Self::RegionNotFound(id) => write!(f, "region not found: {id}"),
            Self::MapNotOwned(id) => write!(f, "map {id} belongs to another user"),
            Self::RegionNotOwned(id) => write!(f, "region {id} belongs to another user"),
            Self::CurrentMapExists(user) => {
                write!(f, "user `{user}` already has a current map")
            }
            Self::MapNotCurrent(id) => write!(f, "map {id} is saved and cannot be modified"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BodyMapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for BodyMapError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<RepoError> for BodyMapError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Invalid(err),
            RepoError::MapNotFound(id) => Self::MapNotFound(id),
            RepoError::RegionNotFound(id) => Self::RegionNotFound(id),
            RepoError::CurrentMapExists(user) => Self::CurrentMapExists(user),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, BodyMapError>;
