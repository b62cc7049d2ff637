//! Owner administration handlers.
//!
//! ```text
//! GET /api/v1/admin/meetups?horizon=upcoming|past
//! GET /api/v1/admin/groups
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::ports::ScheduleHorizon;
use crate::domain::Error;
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::groups::GroupBody;
use crate::inbound::http::meetups::MeetupBody;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query parameters for the administration meetup listing.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminMeetupsQuery {
    /// `"upcoming"` (default) or `"past"`.
    pub horizon: Option<String>,
}

fn parse_horizon(raw: Option<&str>) -> Result<ScheduleHorizon, Error> {
    match raw {
        None | Some("upcoming") => Ok(ScheduleHorizon::Upcoming),
        Some("past") => Ok(ScheduleHorizon::Past),
        Some(other) => Err(Error::invalid_request(format!(
            "horizon must be \"upcoming\" or \"past\", got {other:?}"
        ))),
    }
}

/// The caller's own meetups for the administration page.
#[utoipa::path(
    get,
    path = "/api/v1/admin/meetups",
    params(AdminMeetupsQuery),
    responses(
        (status = 200, description = "Owned meetups", body = [MeetupBody]),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["admin"]
)]
#[get("/admin/meetups")]
pub async fn list_owned_meetups(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AdminMeetupsQuery>,
) -> ApiResult<web::Json<Vec<MeetupBody>>> {
    let caller = session.require_user_id()?;
    let horizon = parse_horizon(query.horizon.as_deref())?;

    let meetups = state
        .meetups
        .list_for_owner(caller, horizon)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(meetups.iter().map(MeetupBody::from).collect()))
}

/// The caller's own groups for the administration page.
#[utoipa::path(
    get,
    path = "/api/v1/admin/groups",
    responses(
        (status = 200, description = "Owned groups", body = [GroupBody]),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["admin"]
)]
#[get("/admin/groups")]
pub async fn list_owned_groups(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<GroupBody>>> {
    let caller = session.require_user_id()?;

    let groups = state
        .groups
        .list_for_owner(caller)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(groups.iter().map(GroupBody::from).collect()))
}
