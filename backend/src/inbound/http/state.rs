//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AttendanceCommand, CategoryRepository, CommentRepository, GroupRepository,
    MeetupRepository, ProximityQuery, UserRepository,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub meetups: Arc<dyn MeetupRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub attendance: Arc<dyn AttendanceCommand>,
    pub proximity: Arc<dyn ProximityQuery>,
}
