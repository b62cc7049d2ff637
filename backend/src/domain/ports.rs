//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the PostgreSQL repositories and the geo index). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants instead of returning `anyhow::Result`. The driving side
//! (attendance and proximity) is also expressed as traits so HTTP handlers
//! depend on behaviour, not on concrete service types.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::comment::Comment;
use super::geo::Point;
use super::group::{Category, Group, GroupPatch};
use super::meetup::{Meetup, MeetupPatch};
use super::user::{User, UserId};

/// Storage-layer failures shared by every repository port.
///
/// `Connection` and `Timeout` are the transient, retryable class;
/// `Query` covers malformed statements, constraint violations, and rows
/// that fail domain validation on load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Storage connectivity failure.
    #[error("storage connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("storage query failed: {message}")]
    Query { message: String },
    /// The caller-supplied deadline elapsed before the call completed.
    #[error("storage call timed out: {message}")]
    Timeout { message: String },
}

impl PersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for deadline expiry.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }
}

impl From<PersistenceError> for super::error::Error {
    fn from(error: PersistenceError) -> Self {
        match error {
            PersistenceError::Query { message } => {
                Self::internal(format!("storage error: {message}"))
            }
            other => Self::service_unavailable(other.to_string()),
        }
    }
}

/// Bound a storage future with `deadline`, producing `on_timeout()` when it
/// elapses. Services use this so a stuck connection surfaces as a typed
/// timeout instead of hanging the request.
pub async fn bounded<T, E, F>(
    deadline: Duration,
    on_timeout: impl FnOnce() -> E,
    operation: F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout()),
    }
}

/// Errors surfaced by the geo index adapter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoIndexError {
    /// The origin has non-finite coordinates.
    #[error("origin coordinates must be finite, got ({latitude}, {longitude})")]
    InvalidOrigin { latitude: f64, longitude: f64 },
    /// The search radius is non-finite or not positive.
    #[error("search radius must be a positive number of meters, got {radius_meters}")]
    InvalidRadius { radius_meters: f64 },
    /// Limit or offset is negative.
    #[error("limit and offset must be non-negative, got limit={limit} offset={offset}")]
    InvalidWindow { limit: i64, offset: i64 },
    /// The underlying spatial query failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// A candidate returned by the geo index: a meetup and its great-circle
/// distance from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCandidate {
    pub meetup_id: Uuid,
    pub distance_meters: f64,
}

/// Read-only spatial lookup over meetup locations.
#[async_trait]
pub trait GeoIndex: Send + Sync {
    /// Return meetups within `max_distance_meters` of `origin`, ascending by
    /// spherical distance with ties broken by meetup id, windowed by
    /// `limit`/`offset`.
    async fn nearby(
        &self,
        origin: Point,
        max_distance_meters: f64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GeoCandidate>, GeoIndexError>;
}

/// Outcome of an owner-scoped update.
///
/// The repository distinguishes "row exists but you don't own it" from
/// "row is gone" so the calling layer can map to forbidden vs. not-found
/// without a second racy read.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome<T> {
    /// The row matched and was updated; carries the fresh value.
    Updated(T),
    /// The row exists but is owned by someone else; nothing changed.
    NotOwner,
    /// No row with that id.
    NotFound,
}

/// Outcome of an owner-scoped delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The row matched and was removed.
    Deleted,
    /// The row exists but is owned by someone else; nothing changed.
    NotOwner,
    /// No row with that id.
    NotFound,
}

/// Horizon selector for the owner administration listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleHorizon {
    /// Meetups scheduled now or later, soonest first.
    Upcoming,
    /// Meetups already held, most recent first.
    Past,
}

/// Persistence port owning the canonical meetup records.
///
/// The interest set is deliberately absent from this port's mutations; it
/// belongs to [`AttendanceStore`] so owner edits and attendance toggles
/// touch disjoint columns.
#[async_trait]
pub trait MeetupRepository: Send + Sync {
    /// Fetch a meetup by id.
    async fn get(&self, id: Uuid) -> Result<Option<Meetup>, PersistenceError>;

    /// Fetch meetups by id, preserving the input order so ranked callers
    /// keep their ranking. Unknown ids are skipped, not errors.
    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Meetup>, PersistenceError>;

    /// Persist a freshly constructed meetup.
    async fn create(&self, meetup: &Meetup) -> Result<(), PersistenceError>;

    /// Apply `patch` iff `owner` matches the stored owner; the ownership
    /// check and the write happen in one atomic statement.
    async fn update_owned(
        &self,
        id: Uuid,
        owner: UserId,
        patch: &MeetupPatch,
    ) -> Result<UpdateOutcome<Meetup>, PersistenceError>;

    /// Delete a meetup. Idempotent: deleting an absent id succeeds.
    async fn delete(&self, id: Uuid) -> Result<(), PersistenceError>;

    /// Meetups owned by `owner`, filtered and ordered by `horizon`.
    async fn list_for_owner(
        &self,
        owner: UserId,
        horizon: ScheduleHorizon,
    ) -> Result<Vec<Meetup>, PersistenceError>;

    /// Meetups hosted by groups in a category, soonest first.
    async fn list_by_category(&self, category_id: Uuid)
        -> Result<Vec<Meetup>, PersistenceError>;
}

/// Point-in-time view of a meetup's interest set, used to disambiguate a
/// conditional mutation that matched no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceSnapshot {
    /// Configured capacity; `0` means unlimited.
    pub capacity: u32,
    /// Current size of the interest set.
    pub size: u32,
    /// Whether the queried user is currently in the set.
    pub is_member: bool,
}

/// Atomic mutations over a meetup's interest set.
///
/// Every mutation must execute as a single conditional statement at the
/// storage layer; a read-modify-write in application code would drop one of
/// two concurrent confirmations.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Append `user` iff not already present and, when `enforce_capacity`
    /// is set, the set is below a non-zero capacity. Returns the new set
    /// size when the row mutated, `None` when the condition did not match.
    async fn try_join(
        &self,
        meetup_id: Uuid,
        user: UserId,
        enforce_capacity: bool,
    ) -> Result<Option<u32>, PersistenceError>;

    /// Remove `user` iff present. Returns the new set size when the row
    /// mutated, `None` when the condition did not match.
    async fn try_leave(
        &self,
        meetup_id: Uuid,
        user: UserId,
    ) -> Result<Option<u32>, PersistenceError>;

    /// Read the current capacity, size, and membership for `user`, or
    /// `None` when the meetup does not exist.
    async fn snapshot(
        &self,
        meetup_id: Uuid,
        user: UserId,
    ) -> Result<Option<AttendanceSnapshot>, PersistenceError>;
}

/// Persistence port for interest groups.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Fetch a group by id.
    async fn get(&self, id: Uuid) -> Result<Option<Group>, PersistenceError>;

    /// Persist a freshly constructed group.
    async fn create(&self, group: &Group) -> Result<(), PersistenceError>;

    /// Apply `patch` iff `owner` matches the stored owner.
    async fn update_owned(
        &self,
        id: Uuid,
        owner: UserId,
        patch: &GroupPatch,
    ) -> Result<UpdateOutcome<Group>, PersistenceError>;

    /// Delete iff `owner` matches the stored owner.
    async fn delete_owned(&self, id: Uuid, owner: UserId)
        -> Result<DeleteOutcome, PersistenceError>;

    /// Groups owned by `owner`, newest first.
    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Group>, PersistenceError>;
}

/// Read-only port for the category taxonomy.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories, alphabetical.
    async fn list(&self) -> Result<Vec<Category>, PersistenceError>;

    /// Look a category up by its URL slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, PersistenceError>;
}

/// Persistence port for meetup comments.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments on a meetup, newest first.
    async fn list_for_meetup(&self, meetup_id: Uuid)
        -> Result<Vec<Comment>, PersistenceError>;

    /// Persist a freshly constructed comment.
    async fn create(&self, comment: &Comment) -> Result<(), PersistenceError>;

    /// Fetch a comment by id.
    async fn get(&self, id: Uuid) -> Result<Option<Comment>, PersistenceError>;

    /// Delete a comment. Idempotent: deleting an absent id succeeds.
    async fn delete(&self, id: Uuid) -> Result<(), PersistenceError>;
}

/// Read-only port for user profiles.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a profile by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PersistenceError>;

    /// Fetch profiles by id, preserving the input order; unknown ids are
    /// skipped.
    async fn list_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, PersistenceError>;
}

/// Attendance intent carried by an RSVP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Confirm attendance.
    Join,
    /// Withdraw a confirmation.
    Leave,
}

/// Driving port: toggle a user's membership in a meetup's interest set.
#[async_trait]
pub trait AttendanceCommand: Send + Sync {
    /// Apply `intent` for `user` on `meetup_id` and return the resulting
    /// set size. Idempotent for repeated joins and leaves.
    async fn set_interest(
        &self,
        meetup_id: Uuid,
        user: UserId,
        intent: Intent,
    ) -> Result<u32, super::attendance::AttendanceError>;
}

/// A nearby meetup with its distance from the reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyMeetup {
    pub meetup: Meetup,
    pub distance_meters: f64,
}

/// Driving port: proximity-ranked meetup discovery.
#[async_trait]
pub trait ProximityQuery: Send + Sync {
    /// Meetups within `radius_meters` of the reference meetup's location,
    /// nearest first, excluding the reference itself.
    async fn find_nearby(
        &self,
        reference_meetup_id: Uuid,
        radius_meters: f64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NearbyMeetup>, super::proximity::ProximityError>;
}

/// Scheduled-at ordering helpers shared by repository adapters.
impl ScheduleHorizon {
    /// Whether `scheduled_at` falls inside this horizon relative to `now`.
    pub fn contains(&self, scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::Upcoming => scheduled_at >= now,
            Self::Past => scheduled_at < now,
        }
    }
}
