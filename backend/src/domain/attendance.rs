//! Attendance set management.
//!
//! Confirms and cancels a user's interest in a meetup with exactly-once
//! membership semantics. The store mutates the interest set with single
//! conditional statements, so concurrent confirmations from distinct users
//! all land; the service's only remaining job is to turn a mutation that
//! matched no row into the right answer (idempotent no-op, missing meetup,
//! full meetup) and to retry the narrow window where the row changed
//! between the attempt and the disambiguating read.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::error::Error;
use super::ports::{bounded, AttendanceCommand, AttendanceStore, Intent, PersistenceError};
use super::user::UserId;

/// How a non-zero meetup capacity is applied on join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CapacityPolicy {
    /// Capacity is display-only; joins always succeed.
    #[default]
    Advisory,
    /// Joins are rejected once the interest set reaches capacity.
    Enforced,
}

impl CapacityPolicy {
    /// Parse a policy from its configuration spelling.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "advisory" => Some(Self::Advisory),
            "enforced" => Some(Self::Enforced),
            _ => None,
        }
    }
}

/// Tuning for the attendance service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceConfig {
    /// Capacity handling on join.
    pub capacity_policy: CapacityPolicy,
    /// Deadline applied to each individual store call.
    pub storage_timeout: Duration,
    /// Attempts before a persistently racing mutation gives up.
    pub max_attempts: u32,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            capacity_policy: CapacityPolicy::default(),
            storage_timeout: Duration::from_secs(5),
            max_attempts: 5,
        }
    }
}

/// Failures surfaced by [`AttendanceCommand::set_interest`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttendanceError {
    /// The meetup does not exist.
    #[error("meetup {meetup_id} not found")]
    MeetupNotFound { meetup_id: Uuid },
    /// The interest set is at capacity and the policy is enforced.
    #[error("meetup {meetup_id} is at capacity ({capacity})")]
    CapacityExceeded { meetup_id: Uuid, capacity: u32 },
    /// The row kept changing underneath the call; the retry budget ran out.
    #[error("interest set for meetup {meetup_id} kept changing; gave up after {attempts} attempts")]
    RetriesExhausted { meetup_id: Uuid, attempts: u32 },
    /// The store failed.
    #[error(transparent)]
    Store(#[from] PersistenceError),
}

impl From<AttendanceError> for Error {
    fn from(error: AttendanceError) -> Self {
        match error {
            AttendanceError::MeetupNotFound { meetup_id } => {
                Error::not_found("meetup not found")
                    .with_details(json!({ "meetupId": meetup_id }))
            }
            AttendanceError::CapacityExceeded { meetup_id, capacity } => {
                Error::capacity_exceeded("meetup is at capacity")
                    .with_details(json!({ "meetupId": meetup_id, "capacity": capacity }))
            }
            AttendanceError::RetriesExhausted { meetup_id, attempts } => {
                Error::conflict("attendance update kept conflicting; try again")
                    .with_details(json!({ "meetupId": meetup_id, "attempts": attempts }))
            }
            AttendanceError::Store(PersistenceError::Query { message }) => {
                Error::internal(format!("attendance store error: {message}"))
            }
            AttendanceError::Store(persistence) => {
                Error::service_unavailable(format!("attendance store unavailable: {persistence}"))
            }
        }
    }
}

/// Attendance service implementing the driving port.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    config: AttendanceConfig,
}

impl AttendanceService {
    /// Create a new service over an attendance store.
    pub fn new(store: Arc<dyn AttendanceStore>, config: AttendanceConfig) -> Self {
        Self { store, config }
    }

    fn timeout_error(&self) -> AttendanceError {
        AttendanceError::Store(PersistenceError::timeout(format!(
            "attendance store call exceeded {:?}",
            self.config.storage_timeout
        )))
    }

    async fn join(&self, meetup_id: Uuid, user: UserId) -> Result<u32, AttendanceError> {
        let enforce = self.config.capacity_policy == CapacityPolicy::Enforced;

        for attempt in 1..=self.config.max_attempts {
            let mutated = bounded(
                self.config.storage_timeout,
                || self.timeout_error(),
                async {
                    self.store
                        .try_join(meetup_id, user, enforce)
                        .await
                        .map_err(AttendanceError::from)
                },
            )
            .await?;
            if let Some(size) = mutated {
                return Ok(size);
            }

            // The conditional append matched no row. Find out why.
            let snapshot = bounded(
                self.config.storage_timeout,
                || self.timeout_error(),
                async {
                    self.store
                        .snapshot(meetup_id, user)
                        .await
                        .map_err(AttendanceError::from)
                },
            )
            .await?;

            match snapshot {
                None => return Err(AttendanceError::MeetupNotFound { meetup_id }),
                Some(snap) if snap.is_member => return Ok(snap.size),
                Some(snap) if enforce && snap.capacity > 0 && snap.size >= snap.capacity => {
                    return Err(AttendanceError::CapacityExceeded {
                        meetup_id,
                        capacity: snap.capacity,
                    });
                }
                Some(_) => {
                    // The set changed between the append and the snapshot
                    // (a seat freed up, or our earlier state is stale).
                    debug!(%meetup_id, %user, attempt, "join raced an interest-set change, retrying");
                }
            }
        }

        Err(AttendanceError::RetriesExhausted {
            meetup_id,
            attempts: self.config.max_attempts,
        })
    }

    async fn leave(&self, meetup_id: Uuid, user: UserId) -> Result<u32, AttendanceError> {
        for attempt in 1..=self.config.max_attempts {
            let mutated = bounded(
                self.config.storage_timeout,
                || self.timeout_error(),
                async {
                    self.store
                        .try_leave(meetup_id, user)
                        .await
                        .map_err(AttendanceError::from)
                },
            )
            .await?;
            if let Some(size) = mutated {
                return Ok(size);
            }

            let snapshot = bounded(
                self.config.storage_timeout,
                || self.timeout_error(),
                async {
                    self.store
                        .snapshot(meetup_id, user)
                        .await
                        .map_err(AttendanceError::from)
                },
            )
            .await?;

            match snapshot {
                None => return Err(AttendanceError::MeetupNotFound { meetup_id }),
                // Leaving a set one is not in is a no-op, not an error.
                Some(snap) if !snap.is_member => return Ok(snap.size),
                Some(_) => {
                    debug!(%meetup_id, %user, attempt, "leave raced an interest-set change, retrying");
                }
            }
        }

        Err(AttendanceError::RetriesExhausted {
            meetup_id,
            attempts: self.config.max_attempts,
        })
    }
}

#[async_trait]
impl AttendanceCommand for AttendanceService {
    async fn set_interest(
        &self,
        meetup_id: Uuid,
        user: UserId,
        intent: Intent,
    ) -> Result<u32, AttendanceError> {
        match intent {
            Intent::Join => self.join(meetup_id, user).await,
            Intent::Leave => self.leave(meetup_id, user).await,
        }
    }
}
