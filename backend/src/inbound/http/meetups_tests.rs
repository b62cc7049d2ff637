//! Handler tests for the meetup endpoints, running the real services over
//! the in-memory world.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpResponse};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::geo::Point;
use crate::domain::{
    AttendanceConfig, CapacityPolicy, Group, GroupDraft, Meetup, MeetupDraft, User, UserId,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::test_utils::{state_over, test_session_middleware, InMemoryWorld};

use super::{
    create_meetup, delete_meetup, get_meetup, list_attendees, nearby_meetups, set_attendance,
    update_meetup,
};

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
                    .service(get_meetup)
                    .service(create_meetup)
                    .service(update_meetup)
                    .service(delete_meetup)
                    .service(nearby_meetups)
                    .service(set_attendance)
                    .service(list_attendees),
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

fn fixture_user(name: &str) -> User {
    User::new(UserId::from_uuid(Uuid::new_v4()), name, None).expect("valid user")
}

fn fixture_group(owner: UserId) -> Group {
    let now = Utc::now();
    Group::new(GroupDraft {
        id: Uuid::new_v4(),
        owner_user_id: owner,
        category_id: Uuid::new_v4(),
        name: "Systems".to_owned(),
        description: "Low level talk.".to_owned(),
        url: None,
        created_at: now,
        updated_at: now,
    })
    .expect("valid group")
}

fn fixture_meetup(owner: UserId, group_id: Uuid, latitude: f64, capacity: u32) -> Meetup {
    let now = Utc::now();
    Meetup::new(MeetupDraft {
        id: Uuid::new_v4(),
        group_id,
        owner_user_id: owner,
        title: "Hack night".to_owned(),
        guest: None,
        description: "Bring laptops.".to_owned(),
        location: Point::new(latitude, -3.0).expect("valid point"),
        address: "Calle Mayor 1".to_owned(),
        city: "Madrid".to_owned(),
        state: "Madrid".to_owned(),
        country: "Spain".to_owned(),
        capacity,
        scheduled_at: now,
        interested: vec![],
        created_at: now,
        updated_at: now,
    })
    .expect("valid meetup")
}

fn world_with_owner() -> (Arc<InMemoryWorld>, UserId, Uuid) {
    let world = Arc::new(InMemoryWorld::default());
    let owner = fixture_user("Owner");
    let owner_id = owner.id();
    world.seed_user(owner);
    let group = fixture_group(owner_id);
    let group_id = group.id();
    world.seed_group(group);
    (world, owner_id, group_id)
}

#[actix_web::test]
async fn get_meetup_returns_detail() {
    let (world, owner, group_id) = world_with_owner();
    let meetup = fixture_meetup(owner, group_id, 40.0, 0);
    let id = meetup.id();
    world.seed_meetup(meetup);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/meetups/{id}"))
            .to_request(),
    )
    .await;

    assert_eq!(body["id"], id.to_string());
    assert_eq!(body["title"], "Hack night");
    assert_eq!(body["capacity"], 0);
    assert_eq!(body["attendeeCount"], 0);
}

#[actix_web::test]
async fn get_unknown_meetup_is_404() {
    let (world, _, _) = world_with_owner();
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/meetups/{}", Uuid::new_v4()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn create_meetup_requires_login() {
    let (world, _, group_id) = world_with_owner();
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/meetups")
            .set_json(json!({
                "groupId": group_id.to_string(),
                "title": "T",
                "description": "D",
                "latitude": 40.0,
                "longitude": -3.0,
                "address": "a", "city": "c", "state": "s", "country": "x",
                "scheduledAt": "2026-09-01T18:00:00Z"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn group_owner_creates_meetup() {
    let (world, owner, group_id) = world_with_owner();
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, owner).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/meetups")
            .cookie(cookie)
            .set_json(json!({
                "groupId": group_id.to_string(),
                "title": "Release party",
                "description": "Cake provided.",
                "latitude": 40.4168,
                "longitude": -3.7038,
                "address": "Calle Mayor 1",
                "city": "Madrid", "state": "Madrid", "country": "Spain",
                "capacity": 30,
                "scheduledAt": "2026-09-01T18:00:00Z"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["capacity"], 30);
    let created = Uuid::parse_str(body["id"].as_str().expect("id string")).expect("uuid");
    assert!(world.meetup(created).is_some());
}

#[actix_web::test]
async fn non_owner_cannot_create_meetup_for_group() {
    let (world, _, group_id) = world_with_owner();
    let outsider = fixture_user("Outsider");
    let outsider_id = outsider.id();
    world.seed_user(outsider);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, outsider_id).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/meetups")
            .cookie(cookie)
            .set_json(json!({
                "groupId": group_id.to_string(),
                "title": "T",
                "description": "D",
                "latitude": 40.0,
                "longitude": -3.0,
                "address": "a", "city": "c", "state": "s", "country": "x",
                "scheduledAt": "2026-09-01T18:00:00Z"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn owner_edits_meetup_title() {
    let (world, owner, group_id) = world_with_owner();
    let meetup = fixture_meetup(owner, group_id, 40.0, 0);
    let id = meetup.id();
    world.seed_meetup(meetup);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, owner).await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/meetups/{id}"))
            .cookie(cookie)
            .set_json(json!({ "title": "Renamed night" }))
            .to_request(),
    )
    .await;

    assert_eq!(body["title"], "Renamed night");
    assert_eq!(
        world.meetup(id).expect("still present").title(),
        "Renamed night"
    );
}

#[actix_web::test]
async fn non_owner_edit_is_forbidden_and_changes_nothing() {
    let (world, owner, group_id) = world_with_owner();
    let meetup = fixture_meetup(owner, group_id, 40.0, 0);
    let id = meetup.id();
    world.seed_meetup(meetup);
    let outsider = fixture_user("Outsider");
    let outsider_id = outsider.id();
    world.seed_user(outsider);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, outsider_id).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/meetups/{id}"))
            .cookie(cookie)
            .set_json(json!({ "title": "Hijacked" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(world.meetup(id).expect("still present").title(), "Hack night");
}

#[actix_web::test]
async fn partial_location_patch_is_rejected() {
    let (world, owner, group_id) = world_with_owner();
    let meetup = fixture_meetup(owner, group_id, 40.0, 0);
    let id = meetup.id();
    world.seed_meetup(meetup);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, owner).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/meetups/{id}"))
            .cookie(cookie)
            .set_json(json!({ "latitude": 41.0 }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn delete_is_idempotent_for_absent_ids() {
    let (world, owner, _) = world_with_owner();
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, owner).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/meetups/{}", Uuid::new_v4()))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn owner_deletes_meetup() {
    let (world, owner, group_id) = world_with_owner();
    let meetup = fixture_meetup(owner, group_id, 40.0, 0);
    let id = meetup.id();
    world.seed_meetup(meetup);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, owner).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/meetups/{id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(world.meetup(id).is_none());
}

#[actix_web::test]
async fn non_owner_delete_is_forbidden() {
    let (world, owner, group_id) = world_with_owner();
    let meetup = fixture_meetup(owner, group_id, 40.0, 0);
    let id = meetup.id();
    world.seed_meetup(meetup);
    let outsider = fixture_user("Outsider");
    let outsider_id = outsider.id();
    world.seed_user(outsider);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, outsider_id).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/meetups/{id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(world.meetup(id).is_some());
}

#[actix_web::test]
async fn nearby_excludes_reference_and_orders_by_distance() {
    let (world, owner, group_id) = world_with_owner();
    // Reference at 40.0; candidates ~500 m, ~1500 m, ~2500 m north.
    let reference = fixture_meetup(owner, group_id, 40.0, 0);
    let near = fixture_meetup(owner, group_id, 40.0045, 0);
    let mid = fixture_meetup(owner, group_id, 40.0135, 0);
    let far = fixture_meetup(owner, group_id, 40.0225, 0);
    let reference_id = reference.id();
    let (near_id, mid_id) = (near.id(), mid.id());
    for meetup in [reference, near, mid, far] {
        world.seed_meetup(meetup);
    }
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/meetups/{reference_id}/nearby?radiusMeters=2000"
            ))
            .to_request(),
    )
    .await;

    let entries = body.as_array().expect("array body");
    let ids: Vec<&str> = entries
        .iter()
        .map(|entry| entry["id"].as_str().expect("id string"))
        .collect();
    assert_eq!(ids, vec![near_id.to_string(), mid_id.to_string()]);
    assert!(entries[0]["distanceMeters"].as_f64().expect("distance") < 1_000.0);
}

#[actix_web::test]
async fn attendance_round_trip() {
    let (world, owner, group_id) = world_with_owner();
    let meetup = fixture_meetup(owner, group_id, 40.0, 0);
    let id = meetup.id();
    world.seed_meetup(meetup);
    let attendee = fixture_user("Attendee");
    let attendee_id = attendee.id();
    world.seed_user(attendee);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;
    let cookie = login(&app, attendee_id).await;

    let joined: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/meetups/{id}/attendance"))
            .cookie(cookie.clone())
            .set_json(json!({ "intent": "join" }))
            .to_request(),
    )
    .await;
    assert_eq!(joined["attendeeCount"], 1);

    let left: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/meetups/{id}/attendance"))
            .cookie(cookie)
            .set_json(json!({ "intent": "leave" }))
            .to_request(),
    )
    .await;
    assert_eq!(left["attendeeCount"], 0);
}

#[actix_web::test]
async fn enforced_capacity_returns_conflict() {
    let (world, owner, group_id) = world_with_owner();
    let full = {
        let mut meetup = fixture_meetup(owner, group_id, 40.0, 1);
        let seated = UserId::from_uuid(Uuid::new_v4());
        meetup = Meetup::new(MeetupDraft {
            id: meetup.id(),
            group_id: meetup.group_id(),
            owner_user_id: meetup.owner_user_id(),
            title: meetup.title().to_owned(),
            guest: None,
            description: meetup.description().to_owned(),
            location: meetup.location(),
            address: meetup.address().to_owned(),
            city: meetup.city().to_owned(),
            state: meetup.state().to_owned(),
            country: meetup.country().to_owned(),
            capacity: 1,
            scheduled_at: meetup.scheduled_at(),
            interested: vec![seated],
            created_at: meetup.created_at(),
            updated_at: meetup.updated_at(),
        })
        .expect("valid meetup");
        meetup
    };
    let id = full.id();
    world.seed_meetup(full);
    let hopeful = fixture_user("Hopeful");
    let hopeful_id = hopeful.id();
    world.seed_user(hopeful);

    let config = AttendanceConfig {
        capacity_policy: CapacityPolicy::Enforced,
        ..AttendanceConfig::default()
    };
    let app = spawn(state_over(&world, config)).await;
    let cookie = login(&app, hopeful_id).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/meetups/{id}/attendance"))
            .cookie(cookie)
            .set_json(json!({ "intent": "join" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn attendee_listing_hydrates_profiles() {
    let (world, owner, group_id) = world_with_owner();
    let ada = fixture_user("Ada");
    let grace = fixture_user("Grace");
    let (ada_id, grace_id) = (ada.id(), grace.id());
    world.seed_user(ada);
    world.seed_user(grace);

    let mut meetup = fixture_meetup(owner, group_id, 40.0, 0);
    meetup = Meetup::new(MeetupDraft {
        id: meetup.id(),
        group_id: meetup.group_id(),
        owner_user_id: meetup.owner_user_id(),
        title: meetup.title().to_owned(),
        guest: None,
        description: meetup.description().to_owned(),
        location: meetup.location(),
        address: meetup.address().to_owned(),
        city: meetup.city().to_owned(),
        state: meetup.state().to_owned(),
        country: meetup.country().to_owned(),
        capacity: 0,
        scheduled_at: meetup.scheduled_at(),
        interested: vec![ada_id, grace_id],
        created_at: meetup.created_at(),
        updated_at: meetup.updated_at(),
    })
    .expect("valid meetup");
    let id = meetup.id();
    world.seed_meetup(meetup);
    let app = spawn(state_over(&world, AttendanceConfig::default())).await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/meetups/{id}/attendees"))
            .to_request(),
    )
    .await;

    let names: Vec<&str> = body
        .as_array()
        .expect("array body")
        .iter()
        .map(|entry| entry["displayName"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["Ada", "Grace"]);
}
