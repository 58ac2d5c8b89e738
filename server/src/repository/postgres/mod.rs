//! sqlx-backed repositories sharing one `PgPool`.

use sqlx::PgPool;

use crate::utils::error::AppError;

mod category;
mod event;
mod group;
mod rsvp;
mod session;
mod user;

pub use category::PgCategoryRepository;
pub use event::PgEventRepository;
pub use group::PgGroupRepository;
pub use rsvp::PgRsvpRepository;
pub use session::PgSessionRepository;
pub use user::PgUserRepository;

/// Every repository, wired to the same pool.
pub struct PgRepositories {
    pub users: PgUserRepository,
    pub groups: PgGroupRepository,
    pub categories: PgCategoryRepository,
    pub events: PgEventRepository,
    pub rsvps: PgRsvpRepository,
    pub sessions: PgSessionRepository,
}

impl PgRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            groups: PgGroupRepository::new(pool.clone()),
            categories: PgCategoryRepository::new(pool.clone()),
            events: PgEventRepository::new(pool.clone()),
            rsvps: PgRsvpRepository::new(pool.clone()),
            sessions: PgSessionRepository::new(pool),
        }
    }
}

/// Turns a unique-constraint violation into a `Conflict` naming `what`.
fn conflict_on_duplicate(error: sqlx::Error, what: &str) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("{what} already exists"))
        }
        _ => AppError::DatabaseError(error),
    }
}
