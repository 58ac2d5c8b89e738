//! Storage ports. Handlers only see these traits; `postgres` provides the
//! production implementations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    Category, CategoryInput, DateScope, Event, EventInput, EventQuery, Group, GroupSummary,
    NewUser, ProfileUpdate, RsvpOutcome, Session, User,
};
use crate::utils::error::AppResult;

pub mod postgres;

#[cfg(test)]
pub mod memory;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new, inactive user.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;
    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn list(&self) -> AppResult<Vec<User>>;
    async fn count(&self) -> AppResult<i64>;
    async fn update_profile(&self, user_id: Uuid, profile: ProfileUpdate) -> AppResult<()>;
    async fn set_password(&self, user_id: Uuid, password_hash: String) -> AppResult<()>;
    async fn activate(&self, user_id: Uuid) -> AppResult<()>;
    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()>;
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, name: &str) -> AppResult<Group>;
    async fn find_by_id(&self, group_id: Uuid) -> AppResult<Option<Group>>;
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Group>>;
    async fn list(&self) -> AppResult<Vec<GroupSummary>>;
    async fn count_members(&self, name: &str) -> AppResult<i64>;
    async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> AppResult<()>;
    /// Drops every membership of the user, then joins `group_id`.
    async fn replace_memberships(&self, user_id: Uuid, group_id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, input: CategoryInput) -> AppResult<Category>;
    async fn find_by_id(&self, category_id: Uuid) -> AppResult<Option<Category>>;
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>>;
    async fn list(&self) -> AppResult<Vec<Category>>;
    /// Returns `false` when no category has that id.
    async fn update(&self, category_id: Uuid, input: CategoryInput) -> AppResult<bool>;
    async fn delete(&self, category_id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, input: EventInput, organizer_id: Uuid) -> AppResult<Event>;
    async fn find_by_id(&self, event_id: Uuid) -> AppResult<Option<Event>>;
    /// Events matching the query, soonest first.
    async fn list(&self, query: &EventQuery) -> AppResult<Vec<Event>>;
    async fn count(&self, scope: DateScope, today: NaiveDate) -> AppResult<i64>;
    async fn update(&self, event_id: Uuid, input: EventInput) -> AppResult<bool>;
    async fn delete(&self, event_id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait RsvpRepository: Send + Sync {
    /// Inserts the pair unless it already exists; never creates a duplicate.
    async fn create(&self, user_id: Uuid, event_id: Uuid) -> AppResult<RsvpOutcome>;
    async fn exists(&self, user_id: Uuid, event_id: Uuid) -> AppResult<bool>;
    async fn event_ids_for_user(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;
    async fn events_for_user(&self, user_id: Uuid) -> AppResult<Vec<Event>>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, expires_at: DateTime<Utc>) -> AppResult<Session>;
    async fn find(&self, session_id: Uuid) -> AppResult<Option<Session>>;
    async fn delete(&self, session_id: Uuid) -> AppResult<()>;
    async fn delete_for_user(&self, user_id: Uuid) -> AppResult<()>;
}
