//! PostgreSQL-backed implementation of the comment repository port.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CommentRepository, PersistenceError};
use crate::domain::Comment;

use super::error_mapping::map_diesel_error;
use super::models::{row_to_comment, CommentRow, NewCommentRow};
use super::pool::DbPool;
use super::schema::comments;

/// Diesel implementation of [`CommentRepository`].
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a new repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn list_for_meetup(
        &self,
        meetup_id: Uuid,
    ) -> Result<Vec<Comment>, PersistenceError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<CommentRow> = comments::table
            .filter(comments::meetup_id.eq(meetup_id))
            .order(comments::created_at.desc())
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_comment).collect()
    }

    async fn create(&self, comment: &Comment) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(comments::table)
            .values(NewCommentRow::from_domain(comment))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>, PersistenceError> {
        let mut conn = self.pool.get().await?;

        let row = comments::table
            .find(id)
            .select(CommentRow::as_select())
            .first::<CommentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_comment).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await?;

        // Idempotent by contract: zero affected rows is still success.
        diesel::delete(comments::table.filter(comments::id.eq(id)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
