//! Comments left on a meetup page.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::user::UserId;

/// Validation errors returned by [`Comment::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommentValidationError {
    /// Body is empty after trimming.
    #[error("comment body must not be empty")]
    EmptyBody,
}

/// A comment on a meetup, removed when the meetup is deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    id: Uuid,
    meetup_id: Uuid,
    user_id: UserId,
    body: String,
    created_at: DateTime<Utc>,
}

impl Comment {
    /// Construct a comment, validating the body.
    pub fn new(
        id: Uuid,
        meetup_id: Uuid,
        user_id: UserId,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CommentValidationError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(CommentValidationError::EmptyBody);
        }
        Ok(Self {
            id,
            meetup_id,
            user_id,
            body,
            created_at,
        })
    }

    /// Comment identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Meetup the comment belongs to.
    pub fn meetup_id(&self) -> Uuid {
        self.meetup_id
    }

    /// Author of the comment.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Comment text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Creation timestamp; listings order newest first.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
