//! A single in-process store implementing every repository port, so the
//! router can be exercised end to end without Postgres.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::{
    CategoryRepository, EventRepository, GroupRepository, RsvpRepository, SessionRepository,
    UserRepository,
};
use crate::models::{
    Category, CategoryInput, DateScope, Event, EventInput, EventQuery, Group, GroupSummary,
    NewUser, ProfileUpdate, Role, RsvpOutcome, Session, User,
};
use crate::utils::error::{AppError, AppResult};

struct StoredEvent {
    input: EventInput,
    organizer_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    groups: Vec<Group>,
    memberships: Vec<(Uuid, Uuid)>,
    categories: HashMap<Uuid, Category>,
    events: HashMap<Uuid, StoredEvent>,
    rsvps: Vec<(Uuid, Uuid)>,
    sessions: HashMap<Uuid, Session>,
}

impl Inner {
    fn group_names(&self, user_id: Uuid) -> Vec<String> {
        let mut names: Vec<String> = self
            .memberships
            .iter()
            .filter(|(member, _)| *member == user_id)
            .filter_map(|(_, group_id)| self.groups.iter().find(|g| g.id == *group_id))
            .map(|group| group.name.clone())
            .collect();
        names.sort();
        names
    }

    fn user(&self, user_id: Uuid) -> Option<User> {
        self.users.get(&user_id).cloned().map(|mut user| {
            user.groups = self.group_names(user_id);
            user
        })
    }

    fn event(&self, event_id: Uuid) -> Option<Event> {
        let stored = self.events.get(&event_id)?;
        let category_name = self
            .categories
            .get(&stored.input.category_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        let rsvp_count = self.rsvps.iter().filter(|(_, e)| *e == event_id).count() as i64;
        Some(Event {
            id: event_id,
            name: stored.input.name.clone(),
            description: stored.input.description.clone(),
            date: stored.input.date,
            time: stored.input.time,
            location: stored.input.location.clone(),
            category_id: stored.input.category_id,
            category_name,
            organizer_id: stored.organizer_id,
            rsvp_count,
            created_at: stored.created_at,
        })
    }

    fn sorted_events(&self, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .events
            .keys()
            .filter_map(|id| self.event(*id))
            .filter(|event| keep(event))
            .collect();
        events.sort_by(|a, b| (a.date, a.time, &a.name).cmp(&(b.date, b.time, &b.name)));
        events
    }
}

pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// A store seeded with the three role groups, as the migrations do.
    pub fn new() -> Self {
        let groups = Role::ALL
            .iter()
            .map(|role| Group {
                id: Uuid::new_v4(),
                name: role.group_name().to_string(),
            })
            .collect();
        Self {
            inner: Mutex::new(Inner {
                groups,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn rsvp_count(&self, user_id: Uuid, event_id: Uuid) -> usize {
        self.lock()
            .rsvps
            .iter()
            .filter(|pair| **pair == (user_id, event_id))
            .count()
    }

    pub fn set_superuser(&self, user_id: Uuid) {
        if let Some(user) = self.lock().users.get_mut(&user_id) {
            user.is_superuser = true;
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut inner = self.lock();
        let taken = inner.users.values().any(|u| {
            u.username == new_user.username || u.email.eq_ignore_ascii_case(&new_user.email)
        });
        if taken {
            return Err(AppError::Conflict(
                "A user with that username or email already exists".into(),
            ));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            password_hash: new_user.password_hash,
            is_active: false,
            is_superuser: false,
            bio: String::new(),
            phone_number: None,
            profile_image: None,
            date_joined: Utc::now(),
            last_login: None,
            groups: Vec::new(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        Ok(self.lock().user(user_id))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let inner = self.lock();
        let id = inner
            .users
            .values()
            .find(|u| u.username == username)
            .map(|u| u.id);
        Ok(id.and_then(|id| inner.user(id)))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.lock();
        let id = inner
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .map(|u| u.id);
        Ok(id.and_then(|id| inner.user(id)))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let inner = self.lock();
        let mut users: Vec<User> = inner.users.keys().filter_map(|id| inner.user(*id)).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.lock().users.len() as i64)
    }

    async fn update_profile(&self, user_id: Uuid, profile: ProfileUpdate) -> AppResult<()> {
        if let Some(user) = self.lock().users.get_mut(&user_id) {
            user.first_name = profile.first_name;
            user.last_name = profile.last_name;
            user.email = profile.email;
            user.bio = profile.bio;
            user.phone_number = profile.phone_number;
            user.profile_image = profile.profile_image;
        }
        Ok(())
    }

    async fn set_password(&self, user_id: Uuid, password_hash: String) -> AppResult<()> {
        if let Some(user) = self.lock().users.get_mut(&user_id) {
            user.password_hash = password_hash;
        }
        Ok(())
    }

    async fn activate(&self, user_id: Uuid) -> AppResult<()> {
        if let Some(user) = self.lock().users.get_mut(&user_id) {
            user.is_active = true;
        }
        Ok(())
    }

    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        if let Some(user) = self.lock().users.get_mut(&user_id) {
            user.last_login = Some(at);
        }
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn create(&self, name: &str) -> AppResult<Group> {
        let mut inner = self.lock();
        if inner.groups.iter().any(|g| g.name == name) {
            return Err(AppError::Conflict("A group with that name already exists".into()));
        }
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        inner.groups.push(group.clone());
        Ok(group)
    }

    async fn find_by_id(&self, group_id: Uuid) -> AppResult<Option<Group>> {
        Ok(self.lock().groups.iter().find(|g| g.id == group_id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Group>> {
        Ok(self.lock().groups.iter().find(|g| g.name == name).cloned())
    }

    async fn list(&self) -> AppResult<Vec<GroupSummary>> {
        let inner = self.lock();
        let mut groups: Vec<GroupSummary> = inner
            .groups
            .iter()
            .map(|group| GroupSummary {
                id: group.id,
                name: group.name.clone(),
                member_count: inner
                    .memberships
                    .iter()
                    .filter(|(_, g)| *g == group.id)
                    .count() as i64,
            })
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn count_members(&self, name: &str) -> AppResult<i64> {
        let inner = self.lock();
        let Some(group) = inner.groups.iter().find(|g| g.name == name) else {
            return Ok(0);
        };
        Ok(inner
            .memberships
            .iter()
            .filter(|(_, g)| *g == group.id)
            .count() as i64)
    }

    async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let mut inner = self.lock();
        if !inner.memberships.contains(&(user_id, group_id)) {
            inner.memberships.push((user_id, group_id));
        }
        Ok(())
    }

    async fn replace_memberships(&self, user_id: Uuid, group_id: Uuid) -> AppResult<()> {
        let mut inner = self.lock();
        inner.memberships.retain(|(member, _)| *member != user_id);
        inner.memberships.push((user_id, group_id));
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn create(&self, input: CategoryInput) -> AppResult<Category> {
        let mut inner = self.lock();
        if inner
            .categories
            .values()
            .any(|c| c.name.eq_ignore_ascii_case(&input.name))
        {
            return Err(AppError::Conflict("A category with that name already exists".into()));
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
        };
        inner.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_by_id(&self, category_id: Uuid) -> AppResult<Option<Category>> {
        Ok(self.lock().categories.get(&category_id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        Ok(self
            .lock()
            .categories
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<Category>> {
        let mut categories: Vec<Category> = self.lock().categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn update(&self, category_id: Uuid, input: CategoryInput) -> AppResult<bool> {
        let mut inner = self.lock();
        if inner
            .categories
            .values()
            .any(|c| c.id != category_id && c.name.eq_ignore_ascii_case(&input.name))
        {
            return Err(AppError::Conflict("A category with that name already exists".into()));
        }
        match inner.categories.get_mut(&category_id) {
            Some(category) => {
                category.name = input.name;
                category.description = input.description;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, category_id: Uuid) -> AppResult<bool> {
        let mut inner = self.lock();
        if inner.categories.remove(&category_id).is_none() {
            return Ok(false);
        }
        let doomed: Vec<Uuid> = inner
            .events
            .iter()
            .filter(|(_, e)| e.input.category_id == category_id)
            .map(|(id, _)| *id)
            .collect();
        for event_id in doomed {
            inner.events.remove(&event_id);
            inner.rsvps.retain(|(_, e)| *e != event_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn create(&self, input: EventInput, organizer_id: Uuid) -> AppResult<Event> {
        let mut inner = self.lock();
        let event_id = Uuid::new_v4();
        inner.events.insert(
            event_id,
            StoredEvent {
                input,
                organizer_id: Some(organizer_id),
                created_at: Utc::now(),
            },
        );
        inner
            .event(event_id)
            .ok_or_else(|| AppError::InternalServerError("event vanished after insert".into()))
    }

    async fn find_by_id(&self, event_id: Uuid) -> AppResult<Option<Event>> {
        Ok(self.lock().event(event_id))
    }

    async fn list(&self, query: &EventQuery) -> AppResult<Vec<Event>> {
        Ok(self.lock().sorted_events(|event| query.matches(event)))
    }

    async fn count(&self, scope: DateScope, today: NaiveDate) -> AppResult<i64> {
        let inner = self.lock();
        Ok(inner
            .events
            .values()
            .filter(|e| scope.contains(e.input.date, today))
            .count() as i64)
    }

    async fn update(&self, event_id: Uuid, input: EventInput) -> AppResult<bool> {
        match self.lock().events.get_mut(&event_id) {
            Some(stored) => {
                stored.input = input;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, event_id: Uuid) -> AppResult<bool> {
        let mut inner = self.lock();
        let removed = inner.events.remove(&event_id).is_some();
        inner.rsvps.retain(|(_, e)| *e != event_id);
        Ok(removed)
    }
}

#[async_trait]
impl RsvpRepository for InMemoryStore {
    async fn create(&self, user_id: Uuid, event_id: Uuid) -> AppResult<RsvpOutcome> {
        let mut inner = self.lock();
        if inner.rsvps.contains(&(user_id, event_id)) {
            return Ok(RsvpOutcome::AlreadyExists);
        }
        inner.rsvps.push((user_id, event_id));
        Ok(RsvpOutcome::Created)
    }

    async fn exists(&self, user_id: Uuid, event_id: Uuid) -> AppResult<bool> {
        Ok(self.lock().rsvps.contains(&(user_id, event_id)))
    }

    async fn event_ids_for_user(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        Ok(self
            .lock()
            .rsvps
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, e)| *e)
            .collect())
    }

    async fn events_for_user(&self, user_id: Uuid) -> AppResult<Vec<Event>> {
        let inner = self.lock();
        Ok(inner.sorted_events(|event| inner.rsvps.contains(&(user_id, event.id))))
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn create(&self, user_id: Uuid, expires_at: DateTime<Utc>) -> AppResult<Session> {
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
            expires_at,
        };
        self.lock().sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find(&self, session_id: Uuid) -> AppResult<Option<Session>> {
        Ok(self.lock().sessions.get(&session_id).cloned())
    }

    async fn delete(&self, session_id: Uuid) -> AppResult<()> {
        self.lock().sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> AppResult<()> {
        self.lock().sessions.retain(|_, s| s.user_id != user_id);
        Ok(())
    }
}
