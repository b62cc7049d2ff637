//! Shared Diesel error mapping for the persistence adapters.
//!
//! Every adapter funnels its failures through here so the split between the
//! transient connection class and the permanent query class stays in one
//! place.

use tracing::debug;

use crate::domain::ports::PersistenceError;

/// Map Diesel errors onto the domain persistence taxonomy.
pub(super) fn map_diesel_error(error: diesel::result::Error) -> PersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => PersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => PersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PersistenceError::connection("database connection closed")
        }
        DieselError::DatabaseError(_, info) => {
            PersistenceError::query(info.message().to_owned())
        }
        _ => PersistenceError::query("database error"),
    }
}
