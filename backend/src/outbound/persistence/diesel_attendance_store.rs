//! PostgreSQL-backed implementation of the attendance store port.
//!
//! Each mutation is a single conditional `UPDATE`: the membership guard,
//! the optional capacity guard, and the array mutation all sit in one
//! statement, so two users confirming at the same instant both land and no
//! read-modify-write window exists. Owner edits touch other columns only,
//! so the row-level lock taken by the update cannot corrupt them.

use async_trait::async_trait;
use diesel::sql_types::{Bool, Int4, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AttendanceSnapshot, AttendanceStore, PersistenceError};
use crate::domain::UserId;

use super::error_mapping::map_diesel_error;
use super::pool::DbPool;

const JOIN_SQL: &str = "\
UPDATE meetups \
   SET interested = array_append(interested, $1), \
       updated_at = now() \
 WHERE id = $2 \
   AND NOT (interested @> ARRAY[$1]::uuid[]) \
   AND ($3 = false OR capacity = 0 OR cardinality(interested) < capacity) \
RETURNING cardinality(interested) AS set_size";

const LEAVE_SQL: &str = "\
UPDATE meetups \
   SET interested = array_remove(interested, $1), \
       updated_at = now() \
 WHERE id = $2 \
   AND interested @> ARRAY[$1]::uuid[] \
RETURNING cardinality(interested) AS set_size";

const SNAPSHOT_SQL: &str = "\
SELECT capacity, \
       cardinality(interested) AS set_size, \
       interested @> ARRAY[$1]::uuid[] AS is_member \
  FROM meetups \
 WHERE id = $2";

#[derive(diesel::QueryableByName)]
struct SetSizeRow {
    #[diesel(sql_type = Int4)]
    set_size: i32,
}

#[derive(diesel::QueryableByName)]
struct SnapshotRow {
    #[diesel(sql_type = Int4)]
    capacity: i32,
    #[diesel(sql_type = Int4)]
    set_size: i32,
    #[diesel(sql_type = Bool)]
    is_member: bool,
}

fn to_u32(value: i32) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(0)
}

/// Diesel implementation of [`AttendanceStore`].
#[derive(Clone)]
pub struct DieselAttendanceStore {
    pool: DbPool,
}

impl DieselAttendanceStore {
    /// Create a new store over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for DieselAttendanceStore {
    async fn try_join(
        &self,
        meetup_id: Uuid,
        user: UserId,
        enforce_capacity: bool,
    ) -> Result<Option<u32>, PersistenceError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<SetSizeRow> = diesel::sql_query(JOIN_SQL)
            .bind::<SqlUuid, _>(*user.as_uuid())
            .bind::<SqlUuid, _>(meetup_id)
            .bind::<Bool, _>(enforce_capacity)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().next().map(|row| to_u32(row.set_size)))
    }

    async fn try_leave(
        &self,
        meetup_id: Uuid,
        user: UserId,
    ) -> Result<Option<u32>, PersistenceError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<SetSizeRow> = diesel::sql_query(LEAVE_SQL)
            .bind::<SqlUuid, _>(*user.as_uuid())
            .bind::<SqlUuid, _>(meetup_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().next().map(|row| to_u32(row.set_size)))
    }

    async fn snapshot(
        &self,
        meetup_id: Uuid,
        user: UserId,
    ) -> Result<Option<AttendanceSnapshot>, PersistenceError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<SnapshotRow> = diesel::sql_query(SNAPSHOT_SQL)
            .bind::<SqlUuid, _>(*user.as_uuid())
            .bind::<SqlUuid, _>(meetup_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().next().map(|row| AttendanceSnapshot {
            capacity: to_u32(row.capacity),
            size: to_u32(row.set_size),
            is_member: row.is_member,
        }))
    }
}
