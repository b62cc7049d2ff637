//! Meetup HTTP handlers.
//!
//! ```text
//! GET    /api/v1/meetups/{id}
//! POST   /api/v1/meetups
//! PATCH  /api/v1/meetups/{id}
//! DELETE /api/v1/meetups/{id}
//! GET    /api/v1/meetups/{id}/nearby
//! POST   /api/v1/meetups/{id}/attendance
//! GET    /api/v1/meetups/{id}/attendees
//! ```

use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{NearbyMeetup, UpdateOutcome};
use crate::domain::{Error, Meetup, MeetupDraft, MeetupPatch, User};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_intent, parse_point, parse_radius, parse_rfc3339_timestamp, parse_uuid, parse_window,
    FieldName,
};

/// Meetup representation returned by every meetup endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeetupBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub group_id: String,
    pub title: String,
    pub guest: Option<String>,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    /// `0` means unlimited.
    pub capacity: u32,
    #[schema(format = "date-time")]
    pub scheduled_at: String,
    pub attendee_count: usize,
}

impl From<&Meetup> for MeetupBody {
    fn from(meetup: &Meetup) -> Self {
        Self {
            id: meetup.id().to_string(),
            group_id: meetup.group_id().to_string(),
            title: meetup.title().to_owned(),
            guest: meetup.guest().map(str::to_owned),
            description: meetup.description().to_owned(),
            latitude: meetup.location().latitude(),
            longitude: meetup.location().longitude(),
            address: meetup.address().to_owned(),
            city: meetup.city().to_owned(),
            state: meetup.state().to_owned(),
            country: meetup.country().to_owned(),
            capacity: meetup.capacity(),
            scheduled_at: meetup.scheduled_at().to_rfc3339(),
            attendee_count: meetup.attendee_count(),
        }
    }
}

/// A nearby meetup with its distance from the reference.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearbyMeetupBody {
    #[serde(flatten)]
    pub meetup: MeetupBody,
    pub distance_meters: f64,
}

impl From<&NearbyMeetup> for NearbyMeetupBody {
    fn from(entry: &NearbyMeetup) -> Self {
        Self {
            meetup: MeetupBody::from(&entry.meetup),
            distance_meters: entry.distance_meters,
        }
    }
}

/// Request payload for creating a meetup.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetupBody {
    #[schema(format = "uuid")]
    pub group_id: String,
    pub title: String,
    pub guest: Option<String>,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    /// Omitted means unlimited.
    pub capacity: Option<u32>,
    #[schema(format = "date-time")]
    pub scheduled_at: String,
}

/// Request payload for patching a meetup. Omitted fields are untouched;
/// `latitude` and `longitude` must be patched together.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeetupBody {
    #[schema(format = "uuid")]
    pub group_id: Option<String>,
    pub title: Option<String>,
    pub guest: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub capacity: Option<u32>,
    #[schema(format = "date-time")]
    pub scheduled_at: Option<String>,
}

/// Query parameters for the nearby listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NearbyQuery {
    /// Search radius; defaults to 20 km.
    pub radius_meters: Option<f64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request payload for an attendance toggle.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceBody {
    /// `"join"` or `"leave"`.
    pub intent: String,
}

/// Response payload for an attendance toggle.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResultBody {
    pub attendee_count: u32,
}

/// An attendee profile in the attendee listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub display_name: String,
    pub avatar: Option<String>,
}

impl From<&User> for AttendeeBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            display_name: user.display_name().to_owned(),
            avatar: user.avatar().map(str::to_owned),
        }
    }
}

const DEFAULT_RADIUS_METERS: f64 = 20_000.0;

fn meetup_not_found(id: Uuid) -> Error {
    Error::not_found("meetup not found").with_details(json!({ "meetupId": id }))
}

/// Fetch a meetup's detail representation.
#[utoipa::path(
    get,
    path = "/api/v1/meetups/{id}",
    params(("id" = String, Path)),
    responses(
        (status = 200, description = "Meetup detail", body = MeetupBody),
        (status = 404, description = "Unknown meetup", body = Error)
    ),
    tags = ["meetups"]
)]
#[get("/meetups/{id}")]
pub async fn get_meetup(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MeetupBody>> {
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let meetup = state
        .meetups
        .get(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| meetup_not_found(id))?;
    Ok(web::Json(MeetupBody::from(&meetup)))
}

/// Create a meetup hosted by one of the caller's groups.
#[utoipa::path(
    post,
    path = "/api/v1/meetups",
    request_body = CreateMeetupBody,
    responses(
        (status = 201, description = "Meetup created", body = MeetupBody),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Caller does not own the group", body = Error)
    ),
    tags = ["meetups"]
)]
#[post("/meetups")]
pub async fn create_meetup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateMeetupBody>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let body = payload.into_inner();

    let group_id = parse_uuid(&body.group_id, FieldName::new("groupId"))?;
    let location = parse_point(body.latitude, body.longitude, FieldName::new("location"))?;
    let scheduled_at =
        parse_rfc3339_timestamp(&body.scheduled_at, FieldName::new("scheduledAt"))?;

    let group = state
        .groups
        .get(group_id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| {
            Error::invalid_request("unknown group").with_details(json!({ "groupId": group_id }))
        })?;
    if group.owner_user_id() != caller {
        return Err(Error::forbidden("only the group owner can schedule meetups"));
    }

    let now = chrono::Utc::now();
    let meetup = Meetup::new(MeetupDraft {
        id: Uuid::new_v4(),
        group_id,
        owner_user_id: caller,
        title: body.title,
        guest: body.guest,
        description: body.description,
        location,
        address: body.address,
        city: body.city,
        state: body.state,
        country: body.country,
        capacity: body.capacity.unwrap_or(0),
        scheduled_at,
        interested: vec![],
        created_at: now,
        updated_at: now,
    })
    .map_err(|err| Error::invalid_request(err.to_string()))?;

    state.meetups.create(&meetup).await.map_err(Error::from)?;
    Ok(HttpResponse::Created().json(MeetupBody::from(&meetup)))
}

fn patch_from_body(body: UpdateMeetupBody) -> Result<MeetupPatch, Error> {
    let location = match (body.latitude, body.longitude) {
        (Some(latitude), Some(longitude)) => Some(parse_point(
            latitude,
            longitude,
            FieldName::new("location"),
        )?),
        (None, None) => None,
        _ => {
            return Err(Error::invalid_request(
                "latitude and longitude must be provided together",
            )
            .with_details(json!({ "field": "location", "code": "partial_point" })));
        }
    };

    let group_id = body
        .group_id
        .as_deref()
        .map(|raw| parse_uuid(raw, FieldName::new("groupId")))
        .transpose()?;
    let scheduled_at = body
        .scheduled_at
        .as_deref()
        .map(|raw| parse_rfc3339_timestamp(raw, FieldName::new("scheduledAt")))
        .transpose()?;

    let patch = MeetupPatch {
        group_id,
        title: body.title,
        guest: body.guest,
        description: body.description,
        location,
        address: body.address,
        city: body.city,
        state: body.state,
        country: body.country,
        capacity: body.capacity,
        scheduled_at,
    };
    patch
        .validate()
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    Ok(patch)
}

/// Owner-scoped meetup edit.
#[utoipa::path(
    patch,
    path = "/api/v1/meetups/{id}",
    params(("id" = String, Path)),
    request_body = UpdateMeetupBody,
    responses(
        (status = 200, description = "Updated meetup", body = MeetupBody),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Caller is not the owner", body = Error),
        (status = 404, description = "Unknown meetup", body = Error)
    ),
    tags = ["meetups"]
)]
#[patch("/meetups/{id}")]
pub async fn update_meetup(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateMeetupBody>,
) -> ApiResult<web::Json<MeetupBody>> {
    let caller = session.require_user_id()?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let patch = patch_from_body(payload.into_inner())?;

    match state
        .meetups
        .update_owned(id, caller, &patch)
        .await
        .map_err(Error::from)?
    {
        UpdateOutcome::Updated(meetup) => Ok(web::Json(MeetupBody::from(&meetup))),
        UpdateOutcome::NotOwner => {
            Err(Error::forbidden("only the owner can edit this meetup"))
        }
        UpdateOutcome::NotFound => Err(meetup_not_found(id)),
    }
}

/// Owner-scoped meetup deletion. Idempotent: deleting an absent meetup
/// succeeds.
#[utoipa::path(
    delete,
    path = "/api/v1/meetups/{id}",
    params(("id" = String, Path)),
    responses(
        (status = 204, description = "Meetup deleted (or already gone)"),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Caller is not the owner", body = Error)
    ),
    tags = ["meetups"]
)]
#[delete("/meetups/{id}")]
pub async fn delete_meetup(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;

    // Ownership is checked against the stored owner, which is immutable,
    // so the read before the delete cannot race an ownership change.
    match state.meetups.get(id).await.map_err(Error::from)? {
        None => Ok(HttpResponse::NoContent().finish()),
        Some(meetup) if meetup.owner_user_id() != caller => {
            Err(Error::forbidden("only the owner can delete this meetup"))
        }
        Some(_) => {
            state.meetups.delete(id).await.map_err(Error::from)?;
            Ok(HttpResponse::NoContent().finish())
        }
    }
}

/// Proximity-ranked listing of other meetups near this one.
#[utoipa::path(
    get,
    path = "/api/v1/meetups/{id}/nearby",
    params(("id" = String, Path), NearbyQuery),
    responses(
        (status = 200, description = "Nearby meetups, nearest first", body = [NearbyMeetupBody]),
        (status = 400, description = "Invalid radius or window", body = Error),
        (status = 404, description = "Unknown meetup", body = Error)
    ),
    tags = ["meetups"]
)]
#[get("/meetups/{id}/nearby")]
pub async fn nearby_meetups(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<NearbyQuery>,
) -> ApiResult<web::Json<Vec<NearbyMeetupBody>>> {
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let radius = parse_radius(
        query.radius_meters.unwrap_or(DEFAULT_RADIUS_METERS),
        FieldName::new("radiusMeters"),
    )?;
    let (limit, offset) = parse_window(query.limit, query.offset)?;

    let nearby = state
        .proximity
        .find_nearby(id, radius, limit, offset)
        .await
        .map_err(Error::from)?;

    Ok(web::Json(nearby.iter().map(NearbyMeetupBody::from).collect()))
}

/// Confirm or cancel the caller's attendance.
#[utoipa::path(
    post,
    path = "/api/v1/meetups/{id}/attendance",
    params(("id" = String, Path)),
    request_body = AttendanceBody,
    responses(
        (status = 200, description = "Resulting attendee count", body = AttendanceResultBody),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown meetup", body = Error),
        (status = 409, description = "Meetup at capacity or persistent write conflict", body = Error)
    ),
    tags = ["meetups"]
)]
#[post("/meetups/{id}/attendance")]
pub async fn set_attendance(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AttendanceBody>,
) -> ApiResult<web::Json<AttendanceResultBody>> {
    let caller = session.require_user_id()?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let intent = parse_intent(&payload.intent, FieldName::new("intent"))?;

    let attendee_count = state
        .attendance
        .set_interest(id, caller, intent)
        .await
        .map_err(Error::from)?;

    Ok(web::Json(AttendanceResultBody { attendee_count }))
}

/// Hydrated profiles of everyone in the interest set.
#[utoipa::path(
    get,
    path = "/api/v1/meetups/{id}/attendees",
    params(("id" = String, Path)),
    responses(
        (status = 200, description = "Attendee profiles", body = [AttendeeBody]),
        (status = 404, description = "Unknown meetup", body = Error)
    ),
    tags = ["meetups"]
)]
#[get("/meetups/{id}/attendees")]
pub async fn list_attendees(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<AttendeeBody>>> {
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let meetup = state
        .meetups
        .get(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| meetup_not_found(id))?;

    let attendees = state
        .users
        .list_by_ids(meetup.interested())
        .await
        .map_err(Error::from)?;

    Ok(web::Json(attendees.iter().map(AttendeeBody::from).collect()))
}

#[cfg(test)]
#[path = "meetups_tests.rs"]
mod tests;
