//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns a `domain::Error` with an `invalid_request` code and
//! a structured `{field, code}` detail payload so clients can map failures
//! back to form fields.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::geo::Point;
use crate::domain::ports::Intent;
use crate::domain::Error;

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn invalid(field: FieldName, message: impl Into<String>, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code,
    }))
}

/// Parse a UUID path or body field.
pub(crate) fn parse_uuid(raw: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(raw).map_err(|_| {
        invalid(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            "invalid_uuid",
        )
    })
}

/// Parse a latitude/longitude pair into a validated [`Point`].
pub(crate) fn parse_point(latitude: f64, longitude: f64, field: FieldName) -> Result<Point, Error> {
    Point::new(latitude, longitude).map_err(|err| invalid(field, err.to_string(), "invalid_point"))
}

/// Parse an attendance intent from its wire spelling.
pub(crate) fn parse_intent(raw: &str, field: FieldName) -> Result<Intent, Error> {
    match raw {
        "join" => Ok(Intent::Join),
        "leave" => Ok(Intent::Leave),
        _ => Err(invalid(
            field,
            "intent must be \"join\" or \"leave\"",
            "invalid_intent",
        )),
    }
}

/// Parse an RFC 3339 timestamp into UTC.
pub(crate) fn parse_rfc3339_timestamp(
    raw: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            invalid(
                field,
                format!("{} must be an RFC 3339 timestamp", field.as_str()),
                "invalid_timestamp",
            )
        })
}

/// Validate a search radius: finite and strictly positive.
pub(crate) fn parse_radius(radius_meters: f64, field: FieldName) -> Result<f64, Error> {
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return Err(invalid(
            field,
            "radius must be a positive number of meters",
            "invalid_radius",
        ));
    }
    Ok(radius_meters)
}

/// Validate a pagination window, applying defaults and an upper bound on
/// page size.
pub(crate) fn parse_window(
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<(i64, i64), Error> {
    const DEFAULT_LIMIT: i64 = 20;
    const MAX_LIMIT: i64 = 100;

    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    let offset = offset.unwrap_or(0);
    if !(0..=MAX_LIMIT).contains(&limit) {
        return Err(invalid(
            FieldName::new("limit"),
            format!("limit must be between 0 and {MAX_LIMIT}"),
            "invalid_limit",
        ));
    }
    if offset < 0 {
        return Err(invalid(
            FieldName::new("offset"),
            "offset must not be negative",
            "invalid_offset",
        ));
    }
    Ok((limit, offset))
}
