//! Interest groups and their categories.
//!
//! A group is owned by a single user and hosts zero or more meetups. The
//! category taxonomy is read-only reference data maintained out of band.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::user::UserId;

/// Validation errors returned by group constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupValidationError {
    /// Name is empty after trimming.
    #[error("group name must not be empty")]
    EmptyName,
    /// Description is empty after trimming.
    #[error("group description must not be empty")]
    EmptyDescription,
}

/// Unvalidated field bundle for constructing a [`Group`].
#[derive(Debug, Clone)]
pub struct GroupDraft {
    pub id: Uuid,
    pub owner_user_id: UserId,
    pub category_id: Uuid,
    pub name: String,
    pub description: String,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An interest group hosting meetups.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    id: Uuid,
    owner_user_id: UserId,
    category_id: Uuid,
    name: String,
    description: String,
    url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Group {
    /// Construct a validated group from a draft.
    pub fn new(draft: GroupDraft) -> Result<Self, GroupValidationError> {
        if draft.name.trim().is_empty() {
            return Err(GroupValidationError::EmptyName);
        }
        if draft.description.trim().is_empty() {
            return Err(GroupValidationError::EmptyDescription);
        }
        Ok(Self {
            id: draft.id,
            owner_user_id: draft.owner_user_id,
            category_id: draft.category_id,
            name: draft.name,
            description: draft.description,
            url: draft.url,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    /// Group identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Owning user; the only user allowed to edit, delete, or host meetups.
    pub fn owner_user_id(&self) -> UserId {
        self.owner_user_id
    }

    /// Category the group is listed under.
    pub fn category_id(&self) -> Uuid {
        self.category_id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description shown on the group page.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// External website, when the group has one.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Record creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Field-wise patch for owner-scoped group edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupPatch {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl GroupPatch {
    /// Whether the patch changes anything at all.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Validate the patched fields that carry invariants.
    pub fn validate(&self) -> Result<(), GroupValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(GroupValidationError::EmptyName);
            }
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(GroupValidationError::EmptyDescription);
            }
        }
        Ok(())
    }
}

/// A browsing category for groups and their meetups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: Uuid,
    name: String,
    slug: String,
}

impl Category {
    /// Construct a category from stored fields.
    pub fn new(id: Uuid, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
        }
    }

    /// Category identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URL slug used in browsing routes.
    pub fn slug(&self) -> &str {
        &self.slug
    }
}
