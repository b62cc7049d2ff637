//! Handler tests for the group endpoints.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpResponse};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::{AttendanceConfig, Group, GroupDraft, User, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::test_utils::{state_over, test_session_middleware, InMemoryWorld};

use super::{create_group, delete_group, get_group, update_group};

async fn test_login(session: SessionContext, path: web::Path<String>) -> HttpResponse {
    let id = UserId::parse(&path.into_inner()).expect("test user id");
    session.persist_user(id).expect("session persists");
    HttpResponse::Ok().finish()
}

async fn spawn(
    state: HttpState,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .wrap(test_session_middleware())
            .app_data(web::Data::new(state))
            .service(
                web::scope("/api/v1")
                    .service(get_group)
                    .service(create_group)
                    .service(update_group)
                    .service(delete_group),
            )
            .route("/test-login/{user_id}", web::post().to(test_login)),
    )
    .await
}

async fn login<S>(app: &S, user: UserId) -> Cookie<'static>
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let resp = test::call_service(
        app,
        test::TestRequest::post()
            .uri(&format!("/test-login/{user}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    resp.response()
        .cookies()
        .next()
        .expect("session cookie issued")
        .into_owned()
}

fn seeded_owner(world: &Arc<InMemoryWorld>) -> UserId {
    let owner = User::new(UserId::from_uuid(Uuid::new_v4()), "Owner", None).expect("valid user");
    let owner_id = owner.id();
    world.seed_user(owner);
    owner_id
}

fn seeded_group(world: &Arc<InMemoryWorld>, owner: UserId) -> Uuid {
    let now = Utc::now();
    let group = Group::new(GroupDraft {
        id: Uuid::new_v4(),
        owner_user_id: owner,
        category_id: Uuid::new_v4(),
        name: "Compilers".to_owned(),
        description: "Parsing and codegen.".to_owned(),
        url: None,
        created_at: now,
        updated_at: now,
    })
    .expect("valid group");
    let id = group.id();
    world.seed_group(group);
    id
}

#[actix_web::test]
async fn create_and_fetch_group() {
    let world = Arc::new(InMemoryWorld::default());
    let owner = seeded_owner(&world);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, owner).await;

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/groups")
            .cookie(cookie)
            .set_json(json!({
                "categoryId": Uuid::new_v4().to_string(),
                "name": "Databases",
                "description": "Storage engines and query planners."
            }))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(created).await;
    assert_eq!(body["ownerUserId"], owner.to_string());

    let id = body["id"].as_str().expect("id string");
    let fetched: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/groups/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(fetched["name"], "Databases");
}

#[actix_web::test]
async fn blank_group_name_is_rejected() {
    let world = Arc::new(InMemoryWorld::default());
    let owner = seeded_owner(&world);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, owner).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/groups")
            .cookie(cookie)
            .set_json(json!({
                "categoryId": Uuid::new_v4().to_string(),
                "name": "   ",
                "description": "D"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn non_owner_update_is_forbidden() {
    let world = Arc::new(InMemoryWorld::default());
    let owner = seeded_owner(&world);
    let group_id = seeded_group(&world, owner);
    let outsider = seeded_owner(&world);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, outsider).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/groups/{group_id}"))
            .cookie(cookie)
            .set_json(json!({ "name": "Hijacked" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn owner_update_applies_patch() {
    let world = Arc::new(InMemoryWorld::default());
    let owner = seeded_owner(&world);
    let group_id = seeded_group(&world, owner);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, owner).await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/groups/{group_id}"))
            .cookie(cookie)
            .set_json(json!({ "name": "Compilers & Interpreters" }))
            .to_request(),
    )
    .await;
    assert_eq!(body["name"], "Compilers & Interpreters");
}

#[actix_web::test]
async fn owner_delete_cascades_to_meetups() {
    let world = Arc::new(InMemoryWorld::default());
    let owner = seeded_owner(&world);
    let group_id = seeded_group(&world, owner);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, owner).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/groups/{group_id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // A second delete of the now-absent group still succeeds.
    let again = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/groups/{group_id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(again.status(), StatusCode::NO_CONTENT);
}
