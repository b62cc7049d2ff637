//! OpenAPI document assembled from handler annotations.

use utoipa::OpenApi;

use crate::inbound::http::{admin, categories, comments, groups, health, identity, meetups};

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Meetup backend API",
        description = "Groups, geotagged meetups, attendance, and proximity discovery."
    ),
    paths(
        health::live,
        health::ready,
        identity::start_session,
        identity::end_session,
        meetups::get_meetup,
        meetups::create_meetup,
        meetups::update_meetup,
        meetups::delete_meetup,
        meetups::nearby_meetups,
        meetups::set_attendance,
        meetups::list_attendees,
        comments::list_comments,
        comments::create_comment,
        comments::delete_comment,
        groups::get_group,
        groups::create_group,
        groups::update_group,
        groups::delete_group,
        categories::list_categories,
        categories::category_meetups,
        admin::list_owned_meetups,
        admin::list_owned_groups,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        meetups::MeetupBody,
        meetups::NearbyMeetupBody,
        meetups::CreateMeetupBody,
        meetups::UpdateMeetupBody,
        meetups::AttendanceBody,
        meetups::AttendanceResultBody,
        meetups::AttendeeBody,
        comments::CommentBody,
        comments::CreateCommentBody,
        groups::GroupBody,
        groups::CreateGroupBody,
        groups::UpdateGroupBody,
        categories::CategoryBody,
        identity::StartSessionBody,
    ))
)]
pub struct ApiDoc;
