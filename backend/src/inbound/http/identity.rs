//! Session hand-off endpoints.
//!
//! ```text
//! POST   /api/v1/session
//! DELETE /api/v1/session
//! ```
//!
//! Authentication itself happens upstream; the identity provider calls
//! `POST /session` with the verified user id to establish the cookie
//! session this backend trusts. The only check performed here is that the
//! id refers to a known user.

use actix_web::{delete, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, FieldName};
use crate::domain::UserId;

/// Request payload for establishing a session.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionBody {
    #[schema(format = "uuid")]
    pub user_id: String,
}

/// Establish a session for an already-authenticated user.
#[utoipa::path(
    post,
    path = "/api/v1/session",
    request_body = StartSessionBody,
    responses(
        (status = 204, description = "Session established"),
        (status = 400, description = "Unknown or malformed user id", body = Error)
    ),
    tags = ["session"]
)]
#[post("/session")]
pub async fn start_session(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<StartSessionBody>,
) -> ApiResult<HttpResponse> {
    let raw = payload.into_inner().user_id;
    let user_id = UserId::from_uuid(parse_uuid(&raw, FieldName::new("userId"))?);

    state
        .users
        .find_by_id(user_id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| {
            Error::invalid_request("unknown user").with_details(json!({ "userId": raw }))
        })?;

    session.persist_user(user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// End the current session.
#[utoipa::path(
    delete,
    path = "/api/v1/session",
    responses((status = 204, description = "Session cleared")),
    tags = ["session"]
)]
#[delete("/session")]
pub async fn end_session(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}
