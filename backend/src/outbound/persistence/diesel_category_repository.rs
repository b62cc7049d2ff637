//! PostgreSQL-backed implementation of the category repository port.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CategoryRepository, PersistenceError};
use crate::domain::Category;

use super::error_mapping::map_diesel_error;
use super::models::CategoryRow;
use super::pool::DbPool;
use super::schema::categories;

/// Diesel implementation of [`CategoryRepository`].
#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: DbPool,
}

impl DieselCategoryRepository {
    /// Create a new repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for DieselCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, PersistenceError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<CategoryRow> = categories::table
            .order(categories::name.asc())
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, PersistenceError> {
        let mut conn = self.pool.get().await?;

        let row = categories::table
            .filter(categories::slug.eq(slug))
            .select(CategoryRow::as_select())
            .first::<CategoryRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Category::from))
    }
}
