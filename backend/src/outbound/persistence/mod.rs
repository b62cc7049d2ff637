//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain's driven ports, backed by
//! PostgreSQL via `diesel-async` with bb8 pooling. Adapters are thin
//! translators: Diesel rows and schema stay internal, domain types come out,
//! and every failure maps onto the domain persistence taxonomy. The two
//! write paths with concurrency contracts, owner-scoped updates and
//! interest-set mutations, each run as a single conditional statement.

mod diesel_attendance_store;
mod diesel_category_repository;
mod diesel_comment_repository;
mod diesel_geo_index;
mod diesel_group_repository;
mod diesel_meetup_repository;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_attendance_store::DieselAttendanceStore;
pub use diesel_category_repository::DieselCategoryRepository;
pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_geo_index::DieselGeoIndex;
pub use diesel_group_repository::DieselGroupRepository;
pub use diesel_meetup_repository::DieselMeetupRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig};
