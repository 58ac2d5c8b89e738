use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::token::TokenGenerator;
use crate::config::Config;
use crate::mail::Mailer;
use crate::repository::postgres::PgRepositories;
use crate::repository::{
    CategoryRepository, EventRepository, GroupRepository, RsvpRepository, SessionRepository,
    UserRepository,
};

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    categories: Arc<dyn CategoryRepository>,
    events: Arc<dyn EventRepository>,
    rsvps: Arc<dyn RsvpRepository>,
    sessions: Arc<dyn SessionRepository>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenGenerator,
}

impl AppState {
    pub fn postgres(pool: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        let repos = PgRepositories::new(pool);
        let tokens = TokenGenerator::new(config.secret_key.clone(), config.token_ttl);
        Self {
            config: Arc::new(config),
            users: Arc::new(repos.users),
            groups: Arc::new(repos.groups),
            categories: Arc::new(repos.categories),
            events: Arc::new(repos.events),
            rsvps: Arc::new(repos.rsvps),
            sessions: Arc::new(repos.sessions),
            mailer,
            tokens,
        }
    }

    #[cfg(test)]
    pub fn in_memory(
        store: Arc<crate::repository::memory::InMemoryStore>,
        config: Config,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let tokens = TokenGenerator::new(config.secret_key.clone(), config.token_ttl);
        Self {
            config: Arc::new(config),
            users: store.clone(),
            groups: store.clone(),
            categories: store.clone(),
            events: store.clone(),
            rsvps: store.clone(),
            sessions: store,
            mailer,
            tokens,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    pub fn groups(&self) -> &dyn GroupRepository {
        self.groups.as_ref()
    }

    pub fn categories(&self) -> &dyn CategoryRepository {
        self.categories.as_ref()
    }

    pub fn events(&self) -> &dyn EventRepository {
        self.events.as_ref()
    }

    pub fn rsvps(&self) -> &dyn RsvpRepository {
        self.rsvps.as_ref()
    }

    pub fn sessions(&self) -> &dyn SessionRepository {
        self.sessions.as_ref()
    }

    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    pub fn tokens(&self) -> &TokenGenerator {
        &self.tokens
    }
}
