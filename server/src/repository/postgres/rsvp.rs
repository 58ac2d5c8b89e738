use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::event::EVENT_SELECT;
use crate::models::{Event, RsvpOutcome};
use crate::repository::RsvpRepository;
use crate::utils::error::AppResult;

pub struct PgRsvpRepository {
    pool: PgPool,
}

impl PgRsvpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RsvpRepository for PgRsvpRepository {
    async fn create(&self, user_id: Uuid, event_id: Uuid) -> AppResult<RsvpOutcome> {
        // The (user_id, event_id) primary key settles concurrent requests.
        let result = sqlx::query(
            r#"
            INSERT INTO rsvps (user_id, event_id) VALUES ($1, $2)
            ON CONFLICT (user_id, event_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(RsvpOutcome::AlreadyExists)
        } else {
            Ok(RsvpOutcome::Created)
        }
    }

    async fn exists(&self, user_id: Uuid, event_id: Uuid) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM rsvps WHERE user_id = $1 AND event_id = $2)",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn event_ids_for_user(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT event_id FROM rsvps WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn events_for_user(&self, user_id: Uuid) -> AppResult<Vec<Event>> {
        let sql = format!(
            "{EVENT_SELECT} JOIN rsvps mine ON mine.event_id = e.id \
             WHERE mine.user_id = $1 ORDER BY e.date, e.time, e.name"
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }
}
