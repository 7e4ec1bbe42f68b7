//! In-memory user repository
//!
//! Used by tests and by local runs without a database.

use super::{StoreError, StoreResult, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use identity_shared::{Role, User};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    next_id: i64,
    by_id: HashMap<i64, User>,
    by_email: HashMap<String, i64>,
}

/// Map-backed [`UserStore`]
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a user's role, as an operator would out-of-band
    ///
    /// Returns `false` if no such user exists.
    pub async fn set_role(&self, user_id: i64, role: Role) -> bool {
        let mut inner = self.inner.write().await;
        match inner.by_id.get_mut(&user_id) {
            Some(user) => {
                user.role = role;
                true
            }
            None => false,
        }
    }

    /// Insert a user record as-is, for seeding legacy data
    pub async fn insert(&self, user: User) {
        let mut inner = self.inner.write().await;
        inner.next_id = inner.next_id.max(user.id);
        inner.by_email.insert(user.email.clone(), user.id);
        inner.by_id.insert(user.id, user);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn save_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> StoreResult<i64> {
        let mut inner = self.inner.write().await;
        if inner.by_email.contains_key(email) {
            return Err(StoreError::DuplicateUser);
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner.by_email.insert(email.to_string(), id);
        inner.by_id.insert(
            id,
            User {
                id,
                email: email.to_string(),
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                role: Role::User,
                created_at: Utc::now(),
            },
        );

        Ok(id)
    }

    async fn find_user(&self, email: &str) -> StoreResult<User> {
        let inner = self.inner.read().await;
        inner
            .by_email
            .get(email)
            .and_then(|id| inner.by_id.get(id))
            .cloned()
            .ok_or(StoreError::UserNotFound)
    }

    async fn get_role(&self, user_id: i64) -> StoreResult<Role> {
        self.inner
            .read()
            .await
            .by_id
            .get(&user_id)
            .map(|user| user.role)
            .ok_or(StoreError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_assigns_sequential_ids() {
        let store = InMemoryUserStore::new();
        let first = store.save_user("a@example.com", "a", "h").await.unwrap();
        let second = store.save_user("b@example.com", "b", "h").await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryUserStore::new();
        store.save_user("a@example.com", "a", "h").await.unwrap();

        let result = store.save_user("a@example.com", "other", "h").await;
        assert!(matches!(result, Err(StoreError::DuplicateUser)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_find_and_role() {
        let store = InMemoryUserStore::new();
        let id = store.save_user("a@example.com", "a", "hash").await.unwrap();

        let user = store.find_user("a@example.com").await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "a");
        assert_eq!(user.password_hash, "hash");
        assert_eq!(store.get_role(id).await.unwrap(), Role::User);

        assert!(store.set_role(id, Role::Admin).await);
        assert_eq!(store.get_role(id).await.unwrap(), Role::Admin);
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = InMemoryUserStore::new();
        assert!(store.is_empty().await);
        assert!(matches!(
            store.find_user("nobody@example.com").await,
            Err(StoreError::UserNotFound)
        ));
        assert!(matches!(store.get_role(1).await, Err(StoreError::UserNotFound)));
        assert!(!store.set_role(1, Role::Admin).await);
    }
}
