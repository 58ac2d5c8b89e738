use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::conflict_on_duplicate;
use crate::models::{Category, CategoryInput};
use crate::repository::CategoryRepository;
use crate::utils::error::AppResult;

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, input: CategoryInput) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, description) VALUES ($1, $2, $3)
            RETURNING id, name, description
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_duplicate(e, "A category with that name"))?;
        Ok(category)
    }

    async fn find_by_id(&self, category_id: Uuid) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE id = $1",
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn list(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn update(&self, category_id: Uuid, input: CategoryInput) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE categories SET name = $2, description = $3 WHERE id = $1")
                .bind(category_id)
                .bind(&input.name)
                .bind(&input.description)
                .execute(&self.pool)
                .await
                .map_err(|e| conflict_on_duplicate(e, "A category with that name"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, category_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
