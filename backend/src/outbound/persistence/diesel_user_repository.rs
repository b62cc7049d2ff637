//! PostgreSQL-backed implementation of the user repository port.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{PersistenceError, UserRepository};
use crate::domain::{User, UserId};

use super::error_mapping::map_diesel_error;
use super::models::{row_to_user, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.pool.get().await?;

        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn list_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, PersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        let raw_ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(&raw_ids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut by_id: HashMap<UserId, User> = rows
            .into_iter()
            .map(|row| row_to_user(row).map(|user| (user.id(), user)))
            .collect::<Result<_, _>>()?;

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}
