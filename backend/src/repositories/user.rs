//! PostgreSQL user repository

use super::{StoreError, StoreResult, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use identity_shared::{Role, User};
use sqlx::PgPool;

/// Role assigned to every newly registered user
const DEFAULT_ROLE: &str = "user";

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            email: record.email,
            username: record.username,
            password_hash: record.password_hash,
            role: Role::parse(&record.role),
            created_at: record.created_at,
        }
    }
}

/// PostgreSQL-backed [`UserStore`]
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn save_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> StoreResult<i64> {
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(DEFAULT_ROLE)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(id),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicateUser),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, email: &str) -> StoreResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, username, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::UserNotFound)?;

        Ok(record.into())
    }

    async fn get_role(&self, user_id: i64) -> StoreResult<Role> {
        let role = sqlx::query_scalar::<_, String>(
            r#"
            SELECT role FROM users WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::UserNotFound)?;

        Ok(Role::parse(&role))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
