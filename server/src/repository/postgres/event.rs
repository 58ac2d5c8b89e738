use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{DateScope, Event, EventInput, EventQuery};
use crate::repository::EventRepository;
use crate::utils::error::{AppError, AppResult};

pub(super) const EVENT_SELECT: &str = r#"
    SELECT e.id, e.name, e.description, e.date, e.time, e.location, e.category_id,
           c.name AS category_name, e.organizer_id,
           (SELECT COUNT(*) FROM rsvps r WHERE r.event_id = e.id) AS rsvp_count,
           e.created_at
    FROM events e
    JOIN categories c ON c.id = e.category_id
"#;

pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_scope(builder: &mut QueryBuilder<'_, Postgres>, scope: DateScope, today: NaiveDate) {
    let comparison = match scope {
        DateScope::All => return,
        DateScope::Today => " AND e.date = ",
        DateScope::Upcoming => " AND e.date > ",
        DateScope::Past => " AND e.date < ",
    };
    builder.push(comparison).push_bind(today);
}

/// `%term%` with LIKE metacharacters escaped, so the term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(&self, input: EventInput, organizer_id: Uuid) -> AppResult<Event> {
        let event_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO events (id, name, description, date, time, location, category_id, organizer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.date)
        .bind(input.time)
        .bind(&input.location)
        .bind(input.category_id)
        .bind(organizer_id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(event_id).await?.ok_or_else(|| {
            AppError::InternalServerError(format!("event {event_id} vanished after insert"))
        })
    }

    async fn find_by_id(&self, event_id: Uuid) -> AppResult<Option<Event>> {
        let sql = format!("{EVENT_SELECT} WHERE e.id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn list(&self, query: &EventQuery) -> AppResult<Vec<Event>> {
        let mut builder = QueryBuilder::<Postgres>::new(EVENT_SELECT);
        builder.push(" WHERE TRUE");
        push_scope(&mut builder, query.scope, query.today);

        if let Some(term) = &query.search {
            let pattern = like_pattern(term);
            builder
                .push(r" AND (e.name ILIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR e.location ILIKE ")
                .push_bind(pattern)
                .push(r" ESCAPE '\')");
        }
        builder.push(" ORDER BY e.date, e.time, e.name");

        let events = builder
            .build_query_as::<Event>()
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn count(&self, scope: DateScope, today: NaiveDate) -> AppResult<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM events e WHERE TRUE");
        push_scope(&mut builder, scope, today);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update(&self, event_id: Uuid, input: EventInput) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET name = $2, description = $3, date = $4, time = $5, location = $6, category_id = $7
            WHERE id = $1
            "#,
        )
        .bind(event_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.date)
        .bind(input.time)
        .bind(&input.location)
        .bind(input.category_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, event_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
