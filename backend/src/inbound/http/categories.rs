//! Category browsing handlers.
//!
//! ```text
//! GET /api/v1/categories
//! GET /api/v1/categories/{slug}/meetups
//! ```

use actix_web::{get, web};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Category, Error};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::meetups::MeetupBody;
use crate::inbound::http::state::HttpState;

/// Category representation in listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for CategoryBody {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id().to_string(),
            name: category.name().to_owned(),
            slug: category.slug().to_owned(),
        }
    }
}

/// All categories, alphabetical.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses((status = 200, description = "Categories", body = [CategoryBody])),
    tags = ["categories"]
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CategoryBody>>> {
    let categories = state.categories.list().await.map_err(Error::from)?;
    Ok(web::Json(categories.iter().map(CategoryBody::from).collect()))
}

/// Meetups hosted by groups in a category, soonest first.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{slug}/meetups",
    params(("slug" = String, Path)),
    responses(
        (status = 200, description = "Meetups in the category", body = [MeetupBody]),
        (status = 404, description = "Unknown category", body = Error)
    ),
    tags = ["categories"]
)]
#[get("/categories/{slug}/meetups")]
pub async fn category_meetups(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<MeetupBody>>> {
    let slug = path.into_inner();
    let category = state
        .categories
        .find_by_slug(&slug)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| {
            Error::not_found("category not found").with_details(json!({ "slug": slug }))
        })?;

    let meetups = state
        .meetups
        .list_by_category(category.id())
        .await
        .map_err(Error::from)?;

    Ok(web::Json(meetups.iter().map(MeetupBody::from).collect()))
}
