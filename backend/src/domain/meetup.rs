//! Meetup aggregate: a scheduled, geolocated event hosted by a group.
//!
//! The aggregate is immutable once constructed; mutation flows through
//! repository patches (owner edits) or the attendance store (interest set
//! only). The two mutation paths touch disjoint columns so they cannot
//! corrupt each other.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::geo::Point;
use super::user::UserId;

/// Validation errors returned by [`Meetup::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeetupValidationError {
    /// Title is empty after trimming.
    #[error("meetup title must not be empty")]
    EmptyTitle,
    /// Description is empty after trimming.
    #[error("meetup description must not be empty")]
    EmptyDescription,
}

/// Unvalidated field bundle for constructing a [`Meetup`].
#[derive(Debug, Clone)]
pub struct MeetupDraft {
    pub id: Uuid,
    pub group_id: Uuid,
    pub owner_user_id: UserId,
    pub title: String,
    pub guest: Option<String>,
    pub description: String,
    pub location: Point,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub capacity: u32,
    pub scheduled_at: DateTime<Utc>,
    pub interested: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A scheduled, geolocated event hosted by a group.
///
/// ## Invariants
/// - `title` and `description` are non-empty.
/// - `interested` contains no duplicate user ids (set semantics; order is
///   irrelevant and not preserved across storage round-trips).
/// - `capacity` of `0` means unlimited.
#[derive(Debug, Clone, PartialEq)]
pub struct Meetup {
    id: Uuid,
    group_id: Uuid,
    owner_user_id: UserId,
    title: String,
    guest: Option<String>,
    description: String,
    location: Point,
    address: String,
    city: String,
    state: String,
    country: String,
    capacity: u32,
    scheduled_at: DateTime<Utc>,
    interested: Vec<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Meetup {
    /// Construct a validated meetup from a draft.
    ///
    /// Duplicate entries in `interested` are collapsed, first occurrence
    /// wins, so storage rows that predate the set guarantee still load.
    pub fn new(draft: MeetupDraft) -> Result<Self, MeetupValidationError> {
        if draft.title.trim().is_empty() {
            return Err(MeetupValidationError::EmptyTitle);
        }
        if draft.description.trim().is_empty() {
            return Err(MeetupValidationError::EmptyDescription);
        }

        let mut interested = Vec::with_capacity(draft.interested.len());
        for user in draft.interested {
            if !interested.contains(&user) {
                interested.push(user);
            }
        }

        Ok(Self {
            id: draft.id,
            group_id: draft.group_id,
            owner_user_id: draft.owner_user_id,
            title: draft.title,
            guest: draft.guest,
            description: draft.description,
            location: draft.location,
            address: draft.address,
            city: draft.city,
            state: draft.state,
            country: draft.country,
            capacity: draft.capacity,
            scheduled_at: draft.scheduled_at,
            interested,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    /// Meetup identifier, immutable after creation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Hosting group.
    pub fn group_id(&self) -> Uuid {
        self.group_id
    }

    /// Owner of the hosting group; the only user allowed to edit or delete.
    pub fn owner_user_id(&self) -> UserId {
        self.owner_user_id
    }

    /// Event title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Featured guest, when announced.
    pub fn guest(&self) -> Option<&str> {
        self.guest.as_deref()
    }

    /// Event description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Geographic location of the event.
    pub fn location(&self) -> Point {
        self.location
    }

    /// Street address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// City.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// State or region.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Country.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Maximum attendee count; `0` means unlimited.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Scheduled date and time of the event.
    pub fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    /// Users who confirmed attendance.
    pub fn interested(&self) -> &[UserId] {
        &self.interested
    }

    /// Number of confirmed attendees.
    pub fn attendee_count(&self) -> usize {
        self.interested.len()
    }

    /// Whether `user` has confirmed attendance.
    pub fn is_interested(&self, user: &UserId) -> bool {
        self.interested.contains(user)
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

/// Field-wise patch for owner-scoped meetup edits.
///
/// `None` leaves the stored value untouched. The interest set is absent on
/// purpose; it is only reachable through the attendance store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeetupPatch {
    pub group_id: Option<Uuid>,
    pub title: Option<String>,
    pub guest: Option<String>,
    pub description: Option<String>,
    pub location: Option<Point>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub capacity: Option<u32>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl MeetupPatch {
    /// Whether the patch changes anything at all.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Validate the patched fields that carry invariants.
    pub fn validate(&self) -> Result<(), MeetupValidationError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(MeetupValidationError::EmptyTitle);
            }
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(MeetupValidationError::EmptyDescription);
            }
        }
        Ok(())
    }
}
