//! Proximity-ranked meetup discovery.
//!
//! Given a reference meetup, finds the other meetups within a radius,
//! nearest first. The geo index does the distance math; this service
//! resolves the reference's true location, drops the reference from its own
//! results, applies the caller's pagination to the ordered set, and hydrates
//! full records without disturbing the ranking.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::error::Error;
use super::ports::{
    bounded, GeoIndex, GeoIndexError, MeetupRepository, NearbyMeetup, PersistenceError,
    ProximityQuery,
};

/// Failures surfaced by [`ProximityQuery::find_nearby`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProximityError {
    /// The reference meetup does not exist.
    #[error("reference meetup {meetup_id} not found")]
    ReferenceNotFound { meetup_id: Uuid },
    /// The spatial query or its parameters were invalid.
    #[error(transparent)]
    Geo(#[from] GeoIndexError),
    /// Loading the reference or hydrating candidates failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<ProximityError> for Error {
    fn from(error: ProximityError) -> Self {
        match error {
            ProximityError::ReferenceNotFound { meetup_id } => {
                Error::not_found("meetup not found")
                    .with_details(json!({ "meetupId": meetup_id }))
            }
            ProximityError::Geo(GeoIndexError::Persistence(persistence))
            | ProximityError::Persistence(persistence) => match persistence {
                PersistenceError::Query { message } => {
                    Error::internal(format!("nearby query failed: {message}"))
                }
                other => Error::service_unavailable(format!("nearby query unavailable: {other}")),
            },
            ProximityError::Geo(invalid) => {
                Error::invalid_request(invalid.to_string())
            }
        }
    }
}

/// Proximity service implementing the driving port.
#[derive(Clone)]
pub struct ProximityService {
    geo: Arc<dyn GeoIndex>,
    meetups: Arc<dyn MeetupRepository>,
    storage_timeout: Duration,
}

impl ProximityService {
    /// Create a new service over a geo index and the meetup repository.
    pub fn new(
        geo: Arc<dyn GeoIndex>,
        meetups: Arc<dyn MeetupRepository>,
        storage_timeout: Duration,
    ) -> Self {
        Self {
            geo,
            meetups,
            storage_timeout,
        }
    }

    fn timeout_error(&self) -> ProximityError {
        ProximityError::Persistence(PersistenceError::timeout(format!(
            "nearby lookup exceeded {:?}",
            self.storage_timeout
        )))
    }
}

#[async_trait]
impl ProximityQuery for ProximityService {
    async fn find_nearby(
        &self,
        reference_meetup_id: Uuid,
        radius_meters: f64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NearbyMeetup>, ProximityError> {
        if limit < 0 || offset < 0 {
            return Err(GeoIndexError::InvalidWindow { limit, offset }.into());
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let reference = bounded(self.storage_timeout, || self.timeout_error(), async {
            self.meetups
                .get(reference_meetup_id)
                .await
                .map_err(ProximityError::from)
        })
        .await?
        .ok_or(ProximityError::ReferenceNotFound {
            meetup_id: reference_meetup_id,
        })?;

        // The reference itself sits at distance zero somewhere in the head
        // of the candidate list, so fetch the whole window from the start,
        // drop it, and only then apply the caller's pagination. Pages stay
        // stable no matter where zero-distance ties sort.
        let window = offset + limit + 1;
        let origin = reference.location();
        let candidates = bounded(self.storage_timeout, || self.timeout_error(), async {
            self.geo
                .nearby(origin, radius_meters, window, 0)
                .await
                .map_err(ProximityError::from)
        })
        .await?;

        let page: Vec<_> = candidates
            .into_iter()
            .filter(|candidate| candidate.meetup_id != reference_meetup_id)
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        if page.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = page.iter().map(|candidate| candidate.meetup_id).collect();
        let distances: HashMap<Uuid, f64> = page
            .iter()
            .map(|candidate| (candidate.meetup_id, candidate.distance_meters))
            .collect();

        let hydrated = bounded(self.storage_timeout, || self.timeout_error(), async {
            self.meetups
                .list_by_ids(&ids)
                .await
                .map_err(ProximityError::from)
        })
        .await?;

        if hydrated.len() != ids.len() {
            // A candidate was deleted between ranking and hydration; the
            // shorter page is still correctly ordered.
            debug!(
                expected = ids.len(),
                got = hydrated.len(),
                "nearby candidates disappeared during hydration"
            );
        }

        Ok(hydrated
            .into_iter()
            .filter_map(|meetup| {
                distances.get(&meetup.id()).map(|distance| NearbyMeetup {
                    distance_meters: *distance,
                    meetup,
                })
            })
            .collect())
    }
}
