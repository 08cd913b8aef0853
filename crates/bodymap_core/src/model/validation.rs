//! Input and record validation errors for the body map model.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Value-level rule violations.
///
/// Raised for malformed caller input (blank names, out-of-range scores) and
/// for persisted records that break model invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// User id is blank after trim.
    BlankUserId,
    /// User id exceeds the accepted length.
    UserIdTooLong { max_chars: usize },
    /// Region name is blank after normalization.
    BlankRegionName,
    /// Region name exceeds the accepted length.
    RegionNameTooLong { max_chars: usize },
    /// Pain score outside `[1, 10]`.
    ScoreOutOfRange(i64),
    /// Saved map is missing its `saved_at` stamp.
    SavedAtMissing,
    /// Current map carries a `saved_at` stamp.
    SavedAtOnCurrentMap,
    /// `saved_at` is earlier than `created_at`.
    SavedBeforeCreated,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUserId => write!(f, "user id must not be blank"),
            Self::UserIdTooLong { max_chars } => {
                write!(f, "user id must be at most {max_chars} characters")
            }
            Self::BlankRegionName => write!(f, "region name must not be blank"),
            Self::RegionNameTooLong { max_chars } => {
                write!(f, "region name must be at most {max_chars} characters")
            }
            Self::ScoreOutOfRange(value) => {
                write!(f, "score must be an integer in [1, 10], got {value}")
            }
            Self::SavedAtMissing => write!(f, "saved map must have saved_at"),
            Self::SavedAtOnCurrentMap => write!(f, "current map must not have saved_at"),
            Self::SavedBeforeCreated => write!(f, "saved_at must not be earlier than created_at"),
        }
    }
}

impl Error for ValidationError {}
