//! PostgreSQL-backed implementation of the meetup repository port.
//!
//! Owner-scoped updates put the ownership check in the `WHERE` clause of
//! the update itself, so a non-owner can never win a race against the real
//! owner. The interest set column is never written here; it belongs to the
//! attendance store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    MeetupRepository, PersistenceError, ScheduleHorizon, UpdateOutcome,
};
use crate::domain::{Meetup, MeetupPatch, UserId};

use super::error_mapping::map_diesel_error;
use super::models::{row_to_meetup, MeetupChangeset, MeetupRow, NewMeetupRow};
use super::pool::DbPool;
use super::schema::{groups, meetups};

/// Diesel implementation of [`MeetupRepository`].
#[derive(Clone)]
pub struct DieselMeetupRepository {
    pool: DbPool,
}

impl DieselMeetupRepository {
    /// Create a new repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Reorder `loaded` to match `ids`, dropping ids that loaded nothing.
fn in_input_order(ids: &[Uuid], loaded: Vec<Meetup>) -> Vec<Meetup> {
    let mut by_id: HashMap<Uuid, Meetup> = loaded
        .into_iter()
        .map(|meetup| (meetup.id(), meetup))
        .collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

#[async_trait]
impl MeetupRepository for DieselMeetupRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Meetup>, PersistenceError> {
        let mut conn = self.pool.get().await?;

        let row = meetups::table
            .find(id)
            .select(MeetupRow::as_select())
            .first::<MeetupRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_meetup).transpose()
    }

    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Meetup>, PersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        let rows: Vec<MeetupRow> = meetups::table
            .filter(meetups::id.eq_any(ids))
            .select(MeetupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let loaded = rows
            .into_iter()
            .map(row_to_meetup)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(in_input_order(ids, loaded))
    }

    async fn create(&self, meetup: &Meetup) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(meetups::table)
            .values(NewMeetupRow::from_domain(meetup))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner: UserId,
        patch: &MeetupPatch,
    ) -> Result<UpdateOutcome<Meetup>, PersistenceError> {
        let mut conn = self.pool.get().await?;
        let changeset = MeetupChangeset::from_patch(patch, Utc::now());

        let updated = diesel::update(
            meetups::table
                .filter(meetups::id.eq(id))
                .filter(meetups::owner_user_id.eq(owner.as_uuid())),
        )
        .set(&changeset)
        .returning(MeetupRow::as_returning())
        .get_result::<MeetupRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        match updated {
            Some(row) => Ok(UpdateOutcome::Updated(row_to_meetup(row)?)),
            None => {
                let exists = meetups::table
                    .filter(meetups::id.eq(id))
                    .select(meetups::id)
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

    async fn delete(&self, id: Uuid) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await?;

        // Idempotent by contract: zero affected rows is still success.
        diesel::delete(meetups::table.filter(meetups::id.eq(id)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        horizon: ScheduleHorizon,
    ) -> Result<Vec<Meetup>, PersistenceError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now();

        let query = meetups::table
            .filter(meetups::owner_user_id.eq(owner.as_uuid()))
            .select(MeetupRow::as_select());

        let rows: Vec<MeetupRow> = match horizon {
            ScheduleHorizon::Upcoming => {
                query
                    .filter(meetups::scheduled_at.ge(now))
                    .order(meetups::scheduled_at.asc())
                    .load(&mut conn)
                    .await
            }
            ScheduleHorizon::Past => {
                query
                    .filter(meetups::scheduled_at.lt(now))
                    .order(meetups::scheduled_at.desc())
                    .load(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_meetup).collect()
    }

    async fn list_by_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<Meetup>, PersistenceError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<MeetupRow> = meetups::table
            .inner_join(groups::table)
            .filter(groups::category_id.eq(category_id))
            .order(meetups::scheduled_at.asc())
            .select(MeetupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_meetup).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use crate::domain::geo::Point;
    use crate::domain::MeetupDraft;

    use super::*;

    fn meetup_with_id(id: Uuid) -> Meetup {
        let now = Utc::now();
        Meetup::new(MeetupDraft {
            id,
            group_id: Uuid::new_v4(),
            owner_user_id: UserId::from_uuid(Uuid::new_v4()),
            title: "A meetup".to_owned(),
            guest: None,
            description: "Details.".to_owned(),
            location: Point::new(0.0, 0.0).expect("valid point"),
            address: "Street 1".to_owned(),
            city: "City".to_owned(),
            state: "State".to_owned(),
            country: "Country".to_owned(),
            capacity: 0,
            scheduled_at: now,
            interested: vec![],
            created_at: now,
            updated_at: now,
        })
        .expect("valid meetup")
    }

    #[rstest]
    fn in_input_order_preserves_ranking_and_skips_unknown() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let missing = Uuid::new_v4();

        let loaded = vec![meetup_with_id(second), meetup_with_id(first)];
        let ordered = in_input_order(&[first, missing, second], loaded);

        let ids: Vec<Uuid> = ordered.iter().map(Meetup::id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[rstest]
    fn in_input_order_with_empty_input_is_empty() {
        assert!(in_input_order(&[], vec![]).is_empty());
    }
}
