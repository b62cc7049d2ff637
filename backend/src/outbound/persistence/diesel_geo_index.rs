//! PostGIS-backed implementation of the geo index port.
//!
//! Ranking is delegated entirely to `ST_DistanceSphere`, which computes
//! great-circle distance in meters on a sphere. Planar distance would skew
//! rankings at high latitudes, so the adapter never falls back to it.

use async_trait::async_trait;
use diesel::sql_types::{BigInt, Double, Float8, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::geo::Point;
use crate::domain::ports::{GeoCandidate, GeoIndex, GeoIndexError};

use super::error_mapping::map_diesel_error;
use super::pool::DbPool;

/// `ST_MakePoint` takes (longitude, latitude); the bind order below feeds
/// latitude as `$1` and longitude as `$2`, so the SQL flips them.
const NEARBY_SQL: &str = "\
SELECT id, \
       ST_DistanceSphere( \
           ST_SetSRID(ST_MakePoint(longitude, latitude), 4326), \
           ST_SetSRID(ST_MakePoint($2, $1), 4326) \
       ) AS distance_meters \
  FROM meetups \
 WHERE ST_DistanceSphere( \
           ST_SetSRID(ST_MakePoint(longitude, latitude), 4326), \
           ST_SetSRID(ST_MakePoint($2, $1), 4326) \
       ) <= $3 \
 ORDER BY distance_meters ASC, id ASC \
 LIMIT $4 OFFSET $5";

#[derive(diesel::QueryableByName)]
struct CandidateRow {
    #[diesel(sql_type = SqlUuid)]
    id: Uuid,
    #[diesel(sql_type = Double)]
    distance_meters: f64,
}

/// Diesel/PostGIS implementation of [`GeoIndex`].
#[derive(Clone)]
pub struct DieselGeoIndex {
    pool: DbPool,
}

impl DieselGeoIndex {
    /// Create a new adapter over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GeoIndex for DieselGeoIndex {
    async fn nearby(
        &self,
        origin: Point,
        max_distance_meters: f64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GeoCandidate>, GeoIndexError> {
        // `Point` guarantees finite coordinates; re-check anyway so a
        // future construction path cannot send NaN into the SQL layer.
        if !origin.latitude().is_finite() || !origin.longitude().is_finite() {
            return Err(GeoIndexError::InvalidOrigin {
                latitude: origin.latitude(),
                longitude: origin.longitude(),
            });
        }
        if !max_distance_meters.is_finite() || max_distance_meters <= 0.0 {
            return Err(GeoIndexError::InvalidRadius {
                radius_meters: max_distance_meters,
            });
        }
        if limit < 0 || offset < 0 {
            return Err(GeoIndexError::InvalidWindow { limit, offset });
        }

        let mut conn = self.pool.get().await?;

        let rows: Vec<CandidateRow> = diesel::sql_query(NEARBY_SQL)
            .bind::<Float8, _>(origin.latitude())
            .bind::<Float8, _>(origin.longitude())
            .bind::<Float8, _>(max_distance_meters)
            .bind::<BigInt, _>(limit)
            .bind::<BigInt, _>(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|row| GeoCandidate {
                meetup_id: row.id,
                distance_meters: row.distance_meters,
            })
            .collect())
    }
}
