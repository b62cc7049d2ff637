//! Comment HTTP handlers.
//!
//! ```text
//! GET    /api/v1/meetups/{id}/comments
//! POST   /api/v1/meetups/{id}/comments
//! DELETE /api/v1/meetups/{id}/comments/{commentId}
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Comment, Error};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, FieldName};

/// Comment representation in listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub user_id: String,
    pub body: String,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<&Comment> for CommentBody {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id().to_string(),
            user_id: comment.user_id().to_string(),
            body: comment.body().to_owned(),
            created_at: comment.created_at().to_rfc3339(),
        }
    }
}

/// Request payload for creating a comment.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentBody {
    pub body: String,
}

fn meetup_not_found(id: Uuid) -> Error {
    Error::not_found("meetup not found").with_details(json!({ "meetupId": id }))
}

/// Comments on a meetup, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/meetups/{id}/comments",
    params(("id" = String, Path)),
    responses(
        (status = 200, description = "Comments, newest first", body = [CommentBody]),
        (status = 404, description = "Unknown meetup", body = Error)
    ),
    tags = ["comments"]
)]
#[get("/meetups/{id}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<CommentBody>>> {
    let meetup_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    state
        .meetups
        .get(meetup_id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| meetup_not_found(meetup_id))?;

    let comments = state
        .comments
        .list_for_meetup(meetup_id)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(comments.iter().map(CommentBody::from).collect()))
}

/// Leave a comment on a meetup.
#[utoipa::path(
    post,
    path = "/api/v1/meetups/{id}/comments",
    params(("id" = String, Path)),
    request_body = CreateCommentBody,
    responses(
        (status = 201, description = "Comment created", body = CommentBody),
        (status = 400, description = "Blank comment", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown meetup", body = Error)
    ),
    tags = ["comments"]
)]
#[post("/meetups/{id}/comments")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CreateCommentBody>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let meetup_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    state
        .meetups
        .get(meetup_id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| meetup_not_found(meetup_id))?;

    let comment = Comment::new(
        Uuid::new_v4(),
        meetup_id,
        caller,
        payload.into_inner().body,
        chrono::Utc::now(),
    )
    .map_err(|err| Error::invalid_request(err.to_string()))?;

    state.comments.create(&comment).await.map_err(Error::from)?;
    Ok(HttpResponse::Created().json(CommentBody::from(&comment)))
}

/// Delete a comment. Allowed for the comment author and for the owner of
/// the meetup the comment sits on; idempotent for absent comment ids.
#[utoipa::path(
    delete,
    path = "/api/v1/meetups/{id}/comments/{comment_id}",
    params(
        ("id" = String, Path),
        ("comment_id" = String, Path)
    ),
    responses(
        (status = 204, description = "Comment deleted (or already gone)"),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Caller may not delete this comment", body = Error)
    ),
    tags = ["comments"]
)]
#[delete("/meetups/{id}/comments/{comment_id}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let (meetup_raw, comment_raw) = path.into_inner();
    let meetup_id = parse_uuid(&meetup_raw, FieldName::new("id"))?;
    let comment_id = parse_uuid(&comment_raw, FieldName::new("commentId"))?;

    let Some(comment) = state.comments.get(comment_id).await.map_err(Error::from)? else {
        return Ok(HttpResponse::NoContent().finish());
    };
    if comment.meetup_id() != meetup_id {
        return Ok(HttpResponse::NoContent().finish());
    }

    let may_delete = if comment.user_id() == caller {
        true
    } else {
        // The meetup owner moderates their own event's comment thread.
        state
            .meetups
            .get(meetup_id)
            .await
            .map_err(Error::from)?
            .is_some_and(|meetup| meetup.owner_user_id() == caller)
    };
    if !may_delete {
        return Err(Error::forbidden(
            "only the author or the meetup owner can delete a comment",
        ));
    }

    state
        .comments
        .delete(comment_id)
        .await
        .map_err(Error::from)?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "comments_tests.rs"]
mod tests;
