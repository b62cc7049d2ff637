//! Geographic value objects shared by the discovery services.
//!
//! Locations are plain latitude/longitude pairs validated at construction so
//! downstream code never has to re-check finiteness or range. Distance is
//! always great-circle distance in meters; event locations span arbitrary
//! latitudes, so a planar approximation would skew rankings near the poles
//! and across the antimeridian.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in meters, matching the sphere PostGIS uses for
/// `ST_DistanceSphere`.
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Validation errors returned when constructing [`Point`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PointValidationError {
    /// Latitude is not a finite number in `[-90, 90]`.
    #[error("latitude must be finite and within [-90, 90], got {value}")]
    InvalidLatitude { value: f64 },
    /// Longitude is not a finite number in `[-180, 180]`.
    #[error("longitude must be finite and within [-180, 180], got {value}")]
    InvalidLongitude { value: f64 },
}

/// A validated geographic point.
///
/// ## Invariants
/// - `latitude` is finite and within `[-90, 90]`.
/// - `longitude` is finite and within `[-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    latitude: f64,
    longitude: f64,
}

impl Point {
    /// Construct a validated point from a `(latitude, longitude)` pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, PointValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(PointValidationError::InvalidLatitude { value: latitude });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(PointValidationError::InvalidLongitude { value: longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in meters (haversine formula).
    ///
    /// This mirrors the spherical semantics of the storage engine's distance
    /// function so in-memory adapters and tests rank candidates the same way
    /// the database does.
    pub fn distance_meters(&self, other: &Self) -> f64 {
        let lat_a = self.latitude.to_radians();
        let lat_b = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();

        let half_chord = (d_lat / 2.0).sin().powi(2)
            + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
        let angle = 2.0 * half_chord.sqrt().asin();

        EARTH_RADIUS_METERS * angle
    }
}
