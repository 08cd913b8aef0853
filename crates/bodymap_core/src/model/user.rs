//! Caller identity.
//!
//! The core does not own users; it only scopes every map and region to the
//! opaque id supplied on each call.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const USER_ID_MAX_CHARS: usize = 128;

/// Opaque, trimmed, non-blank user identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Parses caller input into a user id.
    ///
    /// # Errors
    /// - `BlankUserId` when the value is empty after trim.
    /// - `UserIdTooLong` when it exceeds 128 characters.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::BlankUserId);
        }
        if trimmed.chars().count() > USER_ID_MAX_CHARS {
            return Err(ValidationError::UserIdTooLong {
                max_chars: USER_ID_MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}
