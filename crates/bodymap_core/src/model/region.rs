//! Body region domain model.
//!
//! # Responsibility
//! - Define the region record and the pain score value type.
//! - Normalize region names before persistence.
//!
//! # Invariants
//! - `name` is non-blank and whitespace-normalized.
//! - `score`, when present, is within `[1, 10]`.

use crate::model::body_map::MapId;
use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one region.
pub type RegionId = Uuid;

pub const REGION_NAME_MAX_CHARS: usize = 64;
pub const PAIN_SCORE_MIN: i64 = 1;
pub const PAIN_SCORE_MAX: i64 = 10;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Pain intensity reported for one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct PainScore(u8);

impl PainScore {
    /// Accepts integers in `[1, 10]` inclusive.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if !(PAIN_SCORE_MIN..=PAIN_SCORE_MAX).contains(&value) {
            return Err(ValidationError::ScoreOutOfRange(value));
        }
        // Range check above keeps the value within u8.
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for PainScore {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PainScore> for i64 {
    fn from(value: PainScore) -> Self {
        i64::from(value.0)
    }
}

/// Canonical region record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub map_id: MapId,
    pub name: String,
    /// Absent until the region is first scored.
    pub score: Option<PainScore>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Region {
    /// Creates an unscored region with a generated id.
    ///
    /// The name is normalized with [`normalize_region_name`].
    pub fn new(
        map_id: MapId,
        name: impl AsRef<str>,
        created_at: i64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            map_id,
            name: normalize_region_name(name.as_ref())?,
            score: None,
            created_at,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        normalize_region_name(&self.name).map(|_| ())
    }
}

/// Trims a region label and collapses inner whitespace runs.
///
/// # Errors
/// - `BlankRegionName` when nothing remains after trim.
/// - `RegionNameTooLong` when the normalized label exceeds 64 characters.
pub fn normalize_region_name(name: &str) -> Result<String, ValidationError> {
    let collapsed = WHITESPACE_RE.replace_all(name.trim(), " ");
    if collapsed.is_empty() {
        return Err(ValidationError::BlankRegionName);
    }
    if collapsed.chars().count() > REGION_NAME_MAX_CHARS {
        return Err(ValidationError::RegionNameTooLong {
            max_chars: REGION_NAME_MAX_CHARS,
        });
    }
    Ok(collapsed.into_owned())
}

#[cfg(test)]
mod tests {
    use super::{normalize_region_name, PainScore, Region};
    use crate::model::validation::ValidationError;
    use uuid::Uuid;

    #[test]
    fn pain_score_accepts_boundaries_and_rejects_outside() {
        assert_eq!(PainScore::new(1).unwrap().value(), 1);
        assert_eq!(PainScore::new(10).unwrap().value(), 10);
        assert_eq!(PainScore::new(0), Err(ValidationError::ScoreOutOfRange(0)));
        assert_eq!(PainScore::new(11), Err(ValidationError::ScoreOutOfRange(11)));
        assert_eq!(
            PainScore::new(-3),
            Err(ValidationError::ScoreOutOfRange(-3))
        );
    }

    #[test]
    fn region_name_is_trimmed_and_collapsed() {
        assert_eq!(
            normalize_region_name("  left \t shoulder ").unwrap(),
            "left shoulder"
        );
        assert_eq!(
            normalize_region_name(" \n "),
            Err(ValidationError::BlankRegionName)
        );
        assert!(matches!(
            normalize_region_name(&"a".repeat(65)),
            Err(ValidationError::RegionNameTooLong { max_chars: 64 })
        ));
    }

    #[test]
    fn new_region_starts_unscored() {
        let region = Region::new(Uuid::new_v4(), "lower-back", 10).unwrap();
        assert_eq!(region.name, "lower-back");
        assert_eq!(region.score, None);
        assert!(region.validate().is_ok());
    }

    #[test]
    fn score_serializes_as_plain_integer() {
        let json = serde_json::to_string(&PainScore::new(7).unwrap()).unwrap();
        assert_eq!(json, "7");
        let err = serde_json::from_str::<PainScore>("11");
        assert!(err.is_err());
    }
}
