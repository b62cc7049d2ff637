//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed domain entities and the two services at
//! the heart of the application, attendance set management and
//! proximity-ranked discovery. Types are immutable once constructed;
//! invariants live in the constructors. Adapters on either side of the
//! hexagon depend on the ports in [`ports`], never on each other.

pub mod attendance;
pub mod comment;
pub mod error;
pub mod geo;
pub mod group;
pub mod meetup;
pub mod ports;
pub mod proximity;
pub mod user;

pub use self::attendance::{
    AttendanceConfig, AttendanceError, AttendanceService, CapacityPolicy,
};
pub use self::comment::{Comment, CommentValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::geo::{Point, PointValidationError};
pub use self::group::{Category, Group, GroupDraft, GroupPatch, GroupValidationError};
pub use self::meetup::{Meetup, MeetupDraft, MeetupPatch, MeetupValidationError};
pub use self::proximity::{ProximityError, ProximityService};
pub use self::user::{User, UserId, UserValidationError};

/// Convenient result alias for code returning domain errors.
pub type DomainResult<T> = Result<T, Error>;
