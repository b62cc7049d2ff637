//! Diesel row structs and changesets.
//!
//! Rows are internal to the persistence layer; conversion into domain types
//! always goes through the validated domain constructors so a corrupt row
//! surfaces as a query error instead of leaking into the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::geo::Point;
use crate::domain::ports::PersistenceError;
use crate::domain::{
    Category, Comment, Group, GroupDraft, GroupPatch, Meetup, MeetupDraft, MeetupPatch, User,
    UserId,
};

use super::schema::{categories, comments, groups, meetups, users};

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(super) fn row_to_user(row: UserRow) -> Result<User, PersistenceError> {
    User::new(UserId::from_uuid(row.id), row.display_name, row.avatar)
        .map_err(|err| PersistenceError::query(err.to_string()))
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self::new(row.id, row.name, row.slug)
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct GroupRow {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: String,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(super) fn row_to_group(row: GroupRow) -> Result<Group, PersistenceError> {
    Group::new(GroupDraft {
        id: row.id,
        owner_user_id: UserId::from_uuid(row.owner_user_id),
        category_id: row.category_id,
        name: row.name,
        description: row.description,
        url: row.url,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| PersistenceError::query(err.to_string()))
}

#[derive(Debug, Insertable)]
#[diesel(table_name = groups)]
pub(super) struct NewGroupRow<'a> {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub category_id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub url: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewGroupRow<'a> {
    pub(super) fn from_domain(group: &'a Group) -> Self {
        Self {
            id: group.id(),
            owner_user_id: *group.owner_user_id().as_uuid(),
            category_id: group.category_id(),
            name: group.name(),
            description: group.description(),
            url: group.url(),
            created_at: group.created_at(),
            updated_at: group.updated_at(),
        }
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = groups)]
pub(super) struct GroupChangeset<'a> {
    pub category_id: Option<Uuid>,
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> GroupChangeset<'a> {
    pub(super) fn from_patch(patch: &'a GroupPatch, now: DateTime<Utc>) -> Self {
        Self {
            category_id: patch.category_id,
            name: patch.name.as_deref(),
            description: patch.description.as_deref(),
            url: patch.url.as_deref(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = meetups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct MeetupRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub owner_user_id: Uuid,
    pub title: String,
    pub guest: Option<String>,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub capacity: i32,
    pub scheduled_at: DateTime<Utc>,
    pub interested: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(super) fn row_to_meetup(row: MeetupRow) -> Result<Meetup, PersistenceError> {
    let location = Point::new(row.latitude, row.longitude)
        .map_err(|err| PersistenceError::query(err.to_string()))?;
    let capacity = u32::try_from(row.capacity.max(0))
        .map_err(|err| PersistenceError::query(err.to_string()))?;

    Meetup::new(MeetupDraft {
        id: row.id,
        group_id: row.group_id,
        owner_user_id: UserId::from_uuid(row.owner_user_id),
        title: row.title,
        guest: row.guest,
        description: row.description,
        location,
        address: row.address,
        city: row.city,
        state: row.state,
        country: row.country,
        capacity,
        scheduled_at: row.scheduled_at,
        interested: row.interested.into_iter().map(UserId::from_uuid).collect(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| PersistenceError::query(err.to_string()))
}

#[derive(Debug, Insertable)]
#[diesel(table_name = meetups)]
pub(super) struct NewMeetupRow<'a> {
    pub id: Uuid,
    pub group_id: Uuid,
    pub owner_user_id: Uuid,
    pub title: &'a str,
    pub guest: Option<&'a str>,
    pub description: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub address: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub country: &'a str,
    pub capacity: i32,
    pub scheduled_at: DateTime<Utc>,
    pub interested: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewMeetupRow<'a> {
    pub(super) fn from_domain(meetup: &'a Meetup) -> Self {
        Self {
            id: meetup.id(),
            group_id: meetup.group_id(),
            owner_user_id: *meetup.owner_user_id().as_uuid(),
            title: meetup.title(),
            guest: meetup.guest(),
            description: meetup.description(),
            latitude: meetup.location().latitude(),
            longitude: meetup.location().longitude(),
            address: meetup.address(),
            city: meetup.city(),
            state: meetup.state(),
            country: meetup.country(),
            capacity: i32::try_from(meetup.capacity()).unwrap_or(i32::MAX),
            scheduled_at: meetup.scheduled_at(),
            interested: meetup
                .interested()
                .iter()
                .map(|user| *user.as_uuid())
                .collect(),
            created_at: meetup.created_at(),
            updated_at: meetup.updated_at(),
        }
    }
}

/// Owner-edit changeset. The interest set is deliberately absent: it is
/// only reachable through the attendance store, so an owner edit and a
/// concurrent attendance toggle touch disjoint columns.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = meetups)]
pub(super) struct MeetupChangeset<'a> {
    pub group_id: Option<Uuid>,
    pub title: Option<&'a str>,
    pub guest: Option<&'a str>,
    pub description: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub country: Option<&'a str>,
    pub capacity: Option<i32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> MeetupChangeset<'a> {
    pub(super) fn from_patch(patch: &'a MeetupPatch, now: DateTime<Utc>) -> Self {
        Self {
            group_id: patch.group_id,
            title: patch.title.as_deref(),
            guest: patch.guest.as_deref(),
            description: patch.description.as_deref(),
            latitude: patch.location.map(|point| point.latitude()),
            longitude: patch.location.map(|point| point.longitude()),
            address: patch.address.as_deref(),
            city: patch.city.as_deref(),
            state: patch.state.as_deref(),
            country: patch.country.as_deref(),
            capacity: patch
                .capacity
                .map(|capacity| i32::try_from(capacity).unwrap_or(i32::MAX)),
            scheduled_at: patch.scheduled_at,
            updated_at: now,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct CommentRow {
    pub id: Uuid,
    pub meetup_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

pub(super) fn row_to_comment(row: CommentRow) -> Result<Comment, PersistenceError> {
    Comment::new(
        row.id,
        row.meetup_id,
        UserId::from_uuid(row.user_id),
        row.body,
        row.created_at,
    )
    .map_err(|err| PersistenceError::query(err.to_string()))
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub(super) struct NewCommentRow<'a> {
    pub id: Uuid,
    pub meetup_id: Uuid,
    pub user_id: Uuid,
    pub body: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewCommentRow<'a> {
    pub(super) fn from_domain(comment: &'a Comment) -> Self {
        Self {
            id: comment.id(),
            meetup_id: comment.meetup_id(),
            user_id: *comment.user_id().as_uuid(),
            body: comment.body(),
            created_at: comment.created_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn meetup_row() -> MeetupRow {
        let now = Utc::now();
        MeetupRow {
            id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            owner_user_id: Uuid::new_v4(),
            title: "Kernel hacking night".to_owned(),
            guest: None,
            description: "Bring a laptop.".to_owned(),
            latitude: 40.4168,
            longitude: -3.7038,
            address: "Calle Mayor 1".to_owned(),
            city: "Madrid".to_owned(),
            state: "Madrid".to_owned(),
            country: "Spain".to_owned(),
            capacity: 25,
            scheduled_at: now,
            interested: vec![Uuid::new_v4()],
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn meetup_row_round_trips_location_and_capacity(meetup_row: MeetupRow) {
        let meetup = row_to_meetup(meetup_row).expect("valid row converts");
        assert_eq!(meetup.capacity(), 25);
        assert_eq!(meetup.location().latitude(), 40.4168);
        assert_eq!(meetup.attendee_count(), 1);
    }

    #[rstest]
    fn meetup_row_with_invalid_coordinates_fails(mut meetup_row: MeetupRow) {
        meetup_row.latitude = 120.0;
        let err = row_to_meetup(meetup_row).expect_err("invalid latitude rejected");
        assert!(matches!(err, PersistenceError::Query { .. }));
    }

    #[rstest]
    fn meetup_row_with_blank_title_fails(mut meetup_row: MeetupRow) {
        meetup_row.title = String::new();
        let err = row_to_meetup(meetup_row).expect_err("blank title rejected");
        assert!(matches!(err, PersistenceError::Query { .. }));
    }

    #[rstest]
    fn negative_capacity_clamps_to_zero(mut meetup_row: MeetupRow) {
        meetup_row.capacity = -3;
        let meetup = row_to_meetup(meetup_row).expect("row converts");
        assert_eq!(meetup.capacity(), 0);
    }

    #[rstest]
    fn blank_display_name_fails_user_conversion() {
        let now = Utc::now();
        let row = UserRow {
            id: Uuid::new_v4(),
            display_name: "  ".to_owned(),
            avatar: None,
            created_at: now,
            updated_at: now,
        };
        let err = row_to_user(row).expect_err("blank name rejected");
        assert!(matches!(err, PersistenceError::Query { .. }));
    }
}
