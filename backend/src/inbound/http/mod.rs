//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod categories;
pub mod comments;
pub mod error;
pub mod groups;
pub mod health;
pub mod identity;
pub mod meetups;
pub mod session;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub(crate) mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` route on a service config.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::live)
            .service(health::ready)
            .service(identity::start_session)
            .service(identity::end_session)
            .service(meetups::get_meetup)
            .service(meetups::create_meetup)
            .service(meetups::update_meetup)
            .service(meetups::delete_meetup)
            .service(meetups::nearby_meetups)
            .service(meetups::set_attendance)
            .service(meetups::list_attendees)
            .service(comments::list_comments)
            .service(comments::create_comment)
            .service(comments::delete_comment)
            .service(groups::get_group)
            .service(groups::create_group)
            .service(groups::update_group)
            .service(groups::delete_group)
            .service(categories::list_categories)
            .service(categories::category_meetups)
            .service(admin::list_owned_meetups)
            .service(admin::list_owned_groups),
    );
}
