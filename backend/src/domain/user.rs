//! User identity and profile types.
//!
//! Authentication happens outside this backend; the session hands us an
//! already-verified user id. The profile carried here is the slice the
//! attendee listing and comment rendering need.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Strongly typed user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse from a string representation.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId {
                value: raw.to_owned(),
            })
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validation errors for user types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// The id is not a valid UUID.
    #[error("user id must be a valid UUID, got {value:?}")]
    InvalidId { value: String },
    /// The display name is empty after trimming.
    #[error("display name must not be empty")]
    EmptyDisplayName,
}

/// A user profile as rendered in attendee and comment listings.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    display_name: String,
    avatar: Option<String>,
}

impl User {
    /// Construct a user, validating the display name.
    pub fn new(
        id: UserId,
        display_name: impl Into<String>,
        avatar: Option<String>,
    ) -> Result<Self, UserValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        Ok(Self {
            id,
            display_name,
            avatar,
        })
    }

    /// User identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Display name shown in listings.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Avatar image reference, when the user has one.
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }
}
