//! User storage
//!
//! The authentication core depends only on the [`UserStore`] contract.
//! `PgUserStore` backs it with PostgreSQL, `InMemoryUserStore` with a map.

pub mod memory;
pub mod user;

use async_trait::async_trait;
use identity_shared::{Role, User};
use thiserror::Error;

pub use memory::InMemoryUserStore;
pub use user::PgUserStore;

/// Store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Email already registered")]
    DuplicateUser,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent user records and role assignments
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user with the default role and return its new ID
    ///
    /// Fails with [`StoreError::DuplicateUser`] if the email is taken.
    async fn save_user(&self, email: &str, username: &str, password_hash: &str)
        -> StoreResult<i64>;

    /// Look a user up by email
    async fn find_user(&self, email: &str) -> StoreResult<User>;

    /// Role of the user with the given ID
    async fn get_role(&self, user_id: i64) -> StoreResult<Role>;

    /// Readiness probe
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
