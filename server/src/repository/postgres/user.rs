use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::conflict_on_duplicate;
use crate::models::{NewUser, ProfileUpdate, User};
use crate::repository::UserRepository;
use crate::utils::error::{AppError, AppResult};

const USER_SELECT: &str = r#"
    SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.password_hash,
           u.is_active, u.is_superuser, u.bio, u.phone_number, u.profile_image,
           u.date_joined, u.last_login,
           COALESCE(
               ARRAY_AGG(g.name::text ORDER BY g.name) FILTER (WHERE g.name IS NOT NULL),
               ARRAY[]::text[]
           ) AS groups
    FROM users u
    LEFT JOIN user_groups ug ON ug.user_id = u.id
    LEFT JOIN groups g ON g.id = ug.group_id
"#;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_where(&self, condition: &str, value: &str) -> AppResult<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE {condition} GROUP BY u.id");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let user_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, password_hash, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            "#,
        )
        .bind(user_id)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_duplicate(e, "A user with that username or email"))?;

        self.find_by_id(user_id).await?.ok_or_else(|| {
            AppError::InternalServerError(format!("user {user_id} vanished after insert"))
        })
    }

    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE u.id = $1 GROUP BY u.id");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.find_where("u.username = $1", username).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.find_where("LOWER(u.email) = LOWER($1)", email).await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let sql = format!("{USER_SELECT} GROUP BY u.id ORDER BY u.username");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update_profile(&self, user_id: Uuid, profile: ProfileUpdate) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, bio = $5,
                phone_number = $6, profile_image = $7
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.email)
        .bind(&profile.bio)
        .bind(&profile.phone_number)
        .bind(&profile.profile_image)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_duplicate(e, "A user with that email"))?;
        Ok(())
    }

    async fn set_password(&self, user_id: Uuid, password_hash: String) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn activate(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET is_active = TRUE WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(user_id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
