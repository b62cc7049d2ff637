//! Test helpers for inbound HTTP components.
//!
//! `InMemoryWorld` implements every driven port over a single mutex-guarded
//! store, so handler tests exercise the real services and handlers with no
//! database. Mutations lock the whole world, which makes each operation at
//! least as atomic as its SQL counterpart.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::geo::Point;
use crate::domain::ports::{
    AttendanceSnapshot, AttendanceStore, CategoryRepository, CommentRepository, DeleteOutcome,
    GeoCandidate, GeoIndex, GeoIndexError, GroupRepository, MeetupRepository, PersistenceError,
    ScheduleHorizon, UpdateOutcome, UserRepository,
};
use crate::domain::{
    AttendanceConfig, AttendanceService, Category, Comment, Group, GroupDraft, GroupPatch,
    Meetup, MeetupDraft, MeetupPatch, ProximityService, User, UserId,
};
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests: fresh key, no `Secure`
/// flag so plain-HTTP test requests carry the cookie.
pub(crate) fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

#[derive(Default)]
struct WorldData {
    users: Vec<User>,
    categories: Vec<Category>,
    groups: Vec<Group>,
    meetups: Vec<Meetup>,
    comments: Vec<Comment>,
}

/// In-memory backing store implementing every driven port.
#[derive(Default)]
pub(crate) struct InMemoryWorld {
    data: Mutex<WorldData>,
}

fn lock_world(world: &InMemoryWorld) -> MutexGuard<'_, WorldData> {
    world.data.lock().expect("world poisoned")
}

fn rebuild_meetup(meetup: &Meetup, interested: Vec<UserId>) -> Meetup {
    Meetup::new(MeetupDraft {
        id: meetup.id(),
        group_id: meetup.group_id(),
        owner_user_id: meetup.owner_user_id(),
        title: meetup.title().to_owned(),
        guest: meetup.guest().map(str::to_owned),
        description: meetup.description().to_owned(),
        location: meetup.location(),
        address: meetup.address().to_owned(),
        city: meetup.city().to_owned(),
        state: meetup.state().to_owned(),
        country: meetup.country().to_owned(),
        capacity: meetup.capacity(),
        scheduled_at: meetup.scheduled_at(),
        interested,
        created_at: meetup.created_at(),
        updated_at: Utc::now(),
    })
    .expect("rebuilt meetup stays valid")
}

fn apply_meetup_patch(meetup: &Meetup, patch: &MeetupPatch) -> Meetup {
    Meetup::new(MeetupDraft {
        id: meetup.id(),
        group_id: patch.group_id.unwrap_or_else(|| meetup.group_id()),
        owner_user_id: meetup.owner_user_id(),
        title: patch
            .title
            .clone()
            .unwrap_or_else(|| meetup.title().to_owned()),
        guest: patch
            .guest
            .clone()
            .or_else(|| meetup.guest().map(str::to_owned)),
        description: patch
            .description
            .clone()
            .unwrap_or_else(|| meetup.description().to_owned()),
        location: patch.location.unwrap_or_else(|| meetup.location()),
        address: patch
            .address
            .clone()
            .unwrap_or_else(|| meetup.address().to_owned()),
        city: patch.city.clone().unwrap_or_else(|| meetup.city().to_owned()),
        state: patch
            .state
            .clone()
            .unwrap_or_else(|| meetup.state().to_owned()),
        country: patch
            .country
            .clone()
            .unwrap_or_else(|| meetup.country().to_owned()),
        capacity: patch.capacity.unwrap_or_else(|| meetup.capacity()),
        scheduled_at: patch.scheduled_at.unwrap_or_else(|| meetup.scheduled_at()),
        interested: meetup.interested().to_vec(),
        created_at: meetup.created_at(),
        updated_at: Utc::now(),
    })
    .expect("patched meetup stays valid")
}

fn apply_group_patch(group: &Group, patch: &GroupPatch) -> Group {
    Group::new(GroupDraft {
        id: group.id(),
        owner_user_id: group.owner_user_id(),
        category_id: patch.category_id.unwrap_or_else(|| group.category_id()),
        name: patch.name.clone().unwrap_or_else(|| group.name().to_owned()),
        description: patch
            .description
            .clone()
            .unwrap_or_else(|| group.description().to_owned()),
        url: patch.url.clone().or_else(|| group.url().map(str::to_owned)),
        created_at: group.created_at(),
        updated_at: Utc::now(),
    })
    .expect("patched group stays valid")
}

impl InMemoryWorld {
    pub(crate) fn seed_user(&self, user: User) {
        lock_world(self).users.push(user);
    }

    pub(crate) fn seed_category(&self, category: Category) {
        lock_world(self).categories.push(category);
    }

    pub(crate) fn seed_group(&self, group: Group) {
        lock_world(self).groups.push(group);
    }

    pub(crate) fn seed_meetup(&self, meetup: Meetup) {
        lock_world(self).meetups.push(meetup);
    }

    pub(crate) fn seed_comment(&self, comment: Comment) {
        lock_world(self).comments.push(comment);
    }

    pub(crate) fn meetup(&self, id: Uuid) -> Option<Meetup> {
        lock_world(self)
            .meetups
            .iter()
            .find(|meetup| meetup.id() == id)
            .cloned()
    }

    pub(crate) fn comment_count(&self, meetup_id: Uuid) -> usize {
        lock_world(self)
            .comments
            .iter()
            .filter(|comment| comment.meetup_id() == meetup_id)
            .count()
    }
}

#[async_trait]
impl MeetupRepository for InMemoryWorld {
    async fn get(&self, id: Uuid) -> Result<Option<Meetup>, PersistenceError> {
        Ok(self.meetup(id))
    }

    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Meetup>, PersistenceError> {
        let data = lock_world(self);
        Ok(ids
            .iter()
            .filter_map(|id| data.meetups.iter().find(|meetup| meetup.id() == *id))
            .cloned()
            .collect())
    }

    async fn create(&self, meetup: &Meetup) -> Result<(), PersistenceError> {
        lock_world(self).meetups.push(meetup.clone());
        Ok(())
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner: UserId,
        patch: &MeetupPatch,
    ) -> Result<UpdateOutcome<Meetup>, PersistenceError> {
        let mut data = lock_world(self);
        let Some(position) = data.meetups.iter().position(|meetup| meetup.id() == id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if data.meetups[position].owner_user_id() != owner {
            return Ok(UpdateOutcome::NotOwner);
        }
        let updated = apply_meetup_patch(&data.meetups[position], patch);
        data.meetups[position] = updated.clone();
        Ok(UpdateOutcome::Updated(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<(), PersistenceError> {
        let mut data = lock_world(self);
        data.meetups.retain(|meetup| meetup.id() != id);
        data.comments.retain(|comment| comment.meetup_id() != id);
        Ok(())
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        horizon: ScheduleHorizon,
    ) -> Result<Vec<Meetup>, PersistenceError> {
        let now = Utc::now();
        let mut owned: Vec<Meetup> = lock_world(self)
            .meetups
            .iter()
            .filter(|meetup| meetup.owner_user_id() == owner)
            .filter(|meetup| horizon.contains(meetup.scheduled_at(), now))
            .cloned()
            .collect();
        match horizon {
            ScheduleHorizon::Upcoming => {
                owned.sort_by_key(Meetup::scheduled_at);
            }
            ScheduleHorizon::Past => {
                owned.sort_by_key(Meetup::scheduled_at);
                owned.reverse();
            }
        }
        Ok(owned)
    }

    async fn list_by_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<Meetup>, PersistenceError> {
        let data = lock_world(self);
        let group_ids: Vec<Uuid> = data
            .groups
            .iter()
            .filter(|group| group.category_id() == category_id)
            .map(Group::id)
            .collect();
        let mut meetups: Vec<Meetup> = data
            .meetups
            .iter()
            .filter(|meetup| group_ids.contains(&meetup.group_id()))
            .cloned()
            .collect();
        meetups.sort_by_key(Meetup::scheduled_at);
        Ok(meetups)
    }
}

#[async_trait]
impl AttendanceStore for InMemoryWorld {
    async fn try_join(
        &self,
        meetup_id: Uuid,
        user: UserId,
        enforce_capacity: bool,
    ) -> Result<Option<u32>, PersistenceError> {
        let mut data = lock_world(self);
        let Some(position) = data
            .meetups
            .iter()
            .position(|meetup| meetup.id() == meetup_id)
        else {
            return Ok(None);
        };
        let meetup = data.meetups[position].clone();
        if meetup.is_interested(&user) {
            return Ok(None);
        }
        if enforce_capacity
            && meetup.capacity() > 0
            && meetup.attendee_count() as u32 >= meetup.capacity()
        {
            return Ok(None);
        }
        let mut interested = meetup.interested().to_vec();
        interested.push(user);
        let size = interested.len() as u32;
        data.meetups[position] = rebuild_meetup(&meetup, interested);
        Ok(Some(size))
    }

    async fn try_leave(
        &self,
        meetup_id: Uuid,
        user: UserId,
    ) -> Result<Option<u32>, PersistenceError> {
        let mut data = lock_world(self);
        let Some(position) = data
            .meetups
            .iter()
            .position(|meetup| meetup.id() == meetup_id)
        else {
            return Ok(None);
        };
        let meetup = data.meetups[position].clone();
        if !meetup.is_interested(&user) {
            return Ok(None);
        }
        let interested: Vec<UserId> = meetup
            .interested()
            .iter()
            .copied()
            .filter(|member| member != &user)
            .collect();
        let size = interested.len() as u32;
        data.meetups[position] = rebuild_meetup(&meetup, interested);
        Ok(Some(size))
    }

    async fn snapshot(
        &self,
        meetup_id: Uuid,
        user: UserId,
    ) -> Result<Option<AttendanceSnapshot>, PersistenceError> {
        Ok(self.meetup(meetup_id).map(|meetup| AttendanceSnapshot {
            capacity: meetup.capacity(),
            size: meetup.attendee_count() as u32,
            is_member: meetup.is_interested(&user),
        }))
    }
}

#[async_trait]
impl GeoIndex for InMemoryWorld {
    async fn nearby(
        &self,
        origin: Point,
        max_distance_meters: f64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GeoCandidate>, GeoIndexError> {
        if !max_distance_meters.is_finite() || max_distance_meters <= 0.0 {
            return Err(GeoIndexError::InvalidRadius {
                radius_meters: max_distance_meters,
            });
        }
        let mut candidates: Vec<GeoCandidate> = lock_world(self)
            .meetups
            .iter()
            .map(|meetup| GeoCandidate {
                meetup_id: meetup.id(),
                distance_meters: origin.distance_meters(&meetup.location()),
            })
            .filter(|candidate| candidate.distance_meters <= max_distance_meters)
            .collect();
        candidates.sort_by(|a, b| {
            a.distance_meters
                .total_cmp(&b.distance_meters)
                .then_with(|| a.meetup_id.cmp(&b.meetup_id))
        });
        Ok(candidates
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[async_trait]
impl GroupRepository for InMemoryWorld {
    async fn get(&self, id: Uuid) -> Result<Option<Group>, PersistenceError> {
        Ok(lock_world(self)
            .groups
            .iter()
            .find(|group| group.id() == id)
            .cloned())
    }

    async fn create(&self, group: &Group) -> Result<(), PersistenceError> {
        lock_world(self).groups.push(group.clone());
        Ok(())
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner: UserId,
        patch: &GroupPatch,
    ) -> Result<UpdateOutcome<Group>, PersistenceError> {
        let mut data = lock_world(self);
        let Some(position) = data.groups.iter().position(|group| group.id() == id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if data.groups[position].owner_user_id() != owner {
            return Ok(UpdateOutcome::NotOwner);
        }
        let updated = apply_group_patch(&data.groups[position], patch);
        data.groups[position] = updated.clone();
        Ok(UpdateOutcome::Updated(updated))
    }

    async fn delete_owned(
        &self,
        id: Uuid,
        owner: UserId,
    ) -> Result<DeleteOutcome, PersistenceError> {
        let mut data = lock_world(self);
        let Some(position) = data.groups.iter().position(|group| group.id() == id) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if data.groups[position].owner_user_id() != owner {
            return Ok(DeleteOutcome::NotOwner);
        }
        let group_id = data.groups[position].id();
        data.groups.remove(position);
        let orphaned: Vec<Uuid> = data
            .meetups
            .iter()
            .filter(|meetup| meetup.group_id() == group_id)
            .map(Meetup::id)
            .collect();
        data.meetups.retain(|meetup| meetup.group_id() != group_id);
        data.comments
            .retain(|comment| !orphaned.contains(&comment.meetup_id()));
        Ok(DeleteOutcome::Deleted)
    }

    async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Group>, PersistenceError> {
        let mut owned: Vec<Group> = lock_world(self)
            .groups
            .iter()
            .filter(|group| group.owner_user_id() == owner)
            .cloned()
            .collect();
        owned.sort_by_key(Group::created_at);
        owned.reverse();
        Ok(owned)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryWorld {
    async fn list(&self) -> Result<Vec<Category>, PersistenceError> {
        let mut all = lock_world(self).categories.clone();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(all)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, PersistenceError> {
        Ok(lock_world(self)
            .categories
            .iter()
            .find(|category| category.slug() == slug)
            .cloned())
    }
}

#[async_trait]
impl CommentRepository for InMemoryWorld {
    async fn list_for_meetup(
        &self,
        meetup_id: Uuid,
    ) -> Result<Vec<Comment>, PersistenceError> {
        let mut listed: Vec<Comment> = lock_world(self)
            .comments
            .iter()
            .filter(|comment| comment.meetup_id() == meetup_id)
            .cloned()
            .collect();
        listed.sort_by_key(Comment::created_at);
        listed.reverse();
        Ok(listed)
    }

    async fn create(&self, comment: &Comment) -> Result<(), PersistenceError> {
        lock_world(self).comments.push(comment.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>, PersistenceError> {
        Ok(lock_world(self)
            .comments
            .iter()
            .find(|comment| comment.id() == id)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), PersistenceError> {
        lock_world(self).comments.retain(|comment| comment.id() != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryWorld {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PersistenceError> {
        Ok(lock_world(self)
            .users
            .iter()
            .find(|user| user.id() == id)
            .cloned())
    }

    async fn list_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, PersistenceError> {
        let data = lock_world(self);
        Ok(ids
            .iter()
            .filter_map(|id| data.users.iter().find(|user| user.id() == *id))
            .cloned()
            .collect())
    }
}

/// Build an [`HttpState`] wired entirely onto `world`, with the real
/// attendance and proximity services on top.
pub(crate) fn state_over(world: &Arc<InMemoryWorld>, config: AttendanceConfig) -> HttpState {
    let attendance = AttendanceService::new(world.clone(), config);
    let proximity = ProximityService::new(
        world.clone(),
        world.clone(),
        Duration::from_secs(1),
    );
    HttpState {
        meetups: world.clone(),
        groups: world.clone(),
        categories: world.clone(),
        comments: world.clone(),
        users: world.clone(),
        attendance: Arc::new(attendance),
        proximity: Arc::new(proximity),
    }
}
