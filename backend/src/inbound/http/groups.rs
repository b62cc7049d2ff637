//! Group HTTP handlers.
//!
//! ```text
//! GET    /api/v1/groups/{id}
//! POST   /api/v1/groups
//! PATCH  /api/v1/groups/{id}
//! DELETE /api/v1/groups/{id}
//! ```

use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{DeleteOutcome, UpdateOutcome};
use crate::domain::{Error, Group, GroupDraft, GroupPatch};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, FieldName};

/// Group representation returned by the group endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub owner_user_id: String,
    #[schema(format = "uuid")]
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub url: Option<String>,
}

impl From<&Group> for GroupBody {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id().to_string(),
            owner_user_id: group.owner_user_id().to_string(),
            category_id: group.category_id().to_string(),
            name: group.name().to_owned(),
            description: group.description().to_owned(),
            url: group.url().map(str::to_owned),
        }
    }
}

/// Request payload for creating a group.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupBody {
    #[schema(format = "uuid")]
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub url: Option<String>,
}

/// Request payload for patching a group; omitted fields are untouched.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupBody {
    #[schema(format = "uuid")]
    pub category_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

fn group_not_found(id: Uuid) -> Error {
    Error::not_found("group not found").with_details(json!({ "groupId": id }))
}

/// Fetch a group.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path)),
    responses(
        (status = 200, description = "Group detail", body = GroupBody),
        (status = 404, description = "Unknown group", body = Error)
    ),
    tags = ["groups"]
)]
#[get("/groups/{id}")]
pub async fn get_group(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<GroupBody>> {
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let group = state
        .groups
        .get(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| group_not_found(id))?;
    Ok(web::Json(GroupBody::from(&group)))
}

/// Create a group owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    request_body = CreateGroupBody,
    responses(
        (status = 201, description = "Group created", body = GroupBody),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["groups"]
)]
#[post("/groups")]
pub async fn create_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateGroupBody>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let body = payload.into_inner();
    let category_id = parse_uuid(&body.category_id, FieldName::new("categoryId"))?;

    let now = chrono::Utc::now();
    let group = Group::new(GroupDraft {
        id: Uuid::new_v4(),
        owner_user_id: caller,
        category_id,
        name: body.name,
        description: body.description,
        url: body.url,
        created_at: now,
        updated_at: now,
    })
    .map_err(|err| Error::invalid_request(err.to_string()))?;

    state.groups.create(&group).await.map_err(Error::from)?;
    Ok(HttpResponse::Created().json(GroupBody::from(&group)))
}

/// Owner-scoped group edit.
#[utoipa::path(
    patch,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path)),
    request_body = UpdateGroupBody,
    responses(
        (status = 200, description = "Updated group", body = GroupBody),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Caller is not the owner", body = Error),
        (status = 404, description = "Unknown group", body = Error)
    ),
    tags = ["groups"]
)]
#[patch("/groups/{id}")]
pub async fn update_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateGroupBody>,
) -> ApiResult<web::Json<GroupBody>> {
    let caller = session.require_user_id()?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let body = payload.into_inner();

    let patch = GroupPatch {
        category_id: body
            .category_id
            .as_deref()
            .map(|raw| parse_uuid(raw, FieldName::new("categoryId")))
            .transpose()?,
        name: body.name,
        description: body.description,
        url: body.url,
    };
    patch
        .validate()
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    match state
        .groups
        .update_owned(id, caller, &patch)
        .await
        .map_err(Error::from)?
    {
        UpdateOutcome::Updated(group) => Ok(web::Json(GroupBody::from(&group))),
        UpdateOutcome::NotOwner => Err(Error::forbidden("only the owner can edit this group")),
        UpdateOutcome::NotFound => Err(group_not_found(id)),
    }
}

/// Owner-scoped group deletion; cascades to the group's meetups.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path)),
    responses(
        (status = 204, description = "Group deleted (or already gone)"),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Caller is not the owner", body = Error)
    ),
    tags = ["groups"]
)]
#[delete("/groups/{id}")]
pub async fn delete_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;

    match state
        .groups
        .delete_owned(id, caller)
        .await
        .map_err(Error::from)?
    {
        DeleteOutcome::Deleted | DeleteOutcome::NotFound => {
            Ok(HttpResponse::NoContent().finish())
        }
        DeleteOutcome::NotOwner => {
            Err(Error::forbidden("only the owner can delete this group"))
        }
    }
}

#[cfg(test)]
#[path = "groups_tests.rs"]
mod tests;
