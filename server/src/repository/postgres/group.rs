use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::conflict_on_duplicate;
use crate::models::{Group, GroupSummary};
use crate::repository::GroupRepository;
use crate::utils::error::AppResult;

pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn create(&self, name: &str) -> AppResult<Group> {
        let group = sqlx::query_as::<_, Group>(
            "INSERT INTO groups (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_duplicate(e, "A group with that name"))?;
        Ok(group)
    }

    async fn find_by_id(&self, group_id: Uuid) -> AppResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>("SELECT id, name FROM groups WHERE id = $1")
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>("SELECT id, name FROM groups WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    async fn list(&self) -> AppResult<Vec<GroupSummary>> {
        let groups = sqlx::query_as::<_, GroupSummary>(
            r#"
            SELECT g.id, g.name, COUNT(ug.user_id) AS member_count
            FROM groups g
            LEFT JOIN user_groups ug ON ug.group_id = g.id
            GROUP BY g.id, g.name
            ORDER BY g.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn count_members(&self, name: &str) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM user_groups ug
            JOIN groups g ON g.id = ug.group_id
            WHERE g.name = $1
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_groups (user_id, group_id) VALUES ($1, $2)
            ON CONFLICT (user_id, group_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn replace_memberships(&self, user_id: Uuid, group_id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_groups WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO user_groups (user_id, group_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
