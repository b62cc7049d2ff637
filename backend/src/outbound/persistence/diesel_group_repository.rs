//! PostgreSQL-backed implementation of the group repository port.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{DeleteOutcome, GroupRepository, PersistenceError, UpdateOutcome};
use crate::domain::{Group, GroupPatch, UserId};

use super::error_mapping::map_diesel_error;
use super::models::{row_to_group, GroupChangeset, GroupRow, NewGroupRow};
use super::pool::DbPool;
use super::schema::groups;

/// Diesel implementation of [`GroupRepository`].
#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
}

impl DieselGroupRepository {
    /// Create a new repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Group>, PersistenceError> {
        let mut conn = self.pool.get().await?;

        let row = groups::table
            .find(id)
            .select(GroupRow::as_select())
            .first::<GroupRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_group).transpose()
    }

    async fn create(&self, group: &Group) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(groups::table)
            .values(NewGroupRow::from_domain(group))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner: UserId,
        patch: &GroupPatch,
    ) -> Result<UpdateOutcome<Group>, PersistenceError> {
        let mut conn = self.pool.get().await?;
        let changeset = GroupChangeset::from_patch(patch, Utc::now());

        let updated = diesel::update(
            groups::table
                .filter(groups::id.eq(id))
                .filter(groups::owner_user_id.eq(owner.as_uuid())),
        )
        .set(&changeset)
        .returning(GroupRow::as_returning())
        .get_result::<GroupRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        match updated {
            Some(row) => Ok(UpdateOutcome::Updated(row_to_group(row)?)),
            None => {
                let exists = groups::table
                    .filter(groups::id.eq(id))
                    .select(groups::id)
                    .first::<Uuid>(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                if exists.is_some() {
                    Ok(UpdateOutcome::NotOwner)
                } else {
                    Ok(UpdateOutcome::NotFound)
                }
            }
        }
    }

    async fn delete_owned(
        &self,
        id: Uuid,
        owner: UserId,
    ) -> Result<DeleteOutcome, PersistenceError> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(
            groups::table
                .filter(groups::id.eq(id))
                .filter(groups::owner_user_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if deleted > 0 {
            return Ok(DeleteOutcome::Deleted);
        }

        let exists = groups::table
            .filter(groups::id.eq(id))
            .select(groups::id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        if exists.is_some() {
            Ok(DeleteOutcome::NotOwner)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }

    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Group>, PersistenceError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<GroupRow> = groups::table
            .filter(groups::owner_user_id.eq(owner.as_uuid()))
            .order(groups::created_at.desc())
            .select(GroupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_group).collect()
    }
}
