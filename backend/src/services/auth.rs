//! Authentication service
//!
//! Orchestrates registration, login, token refresh, token validation and
//! admin lookup on top of the [`UserStore`] contract, the password hasher
//! and the JWT codec. Holds no per-request state; every call is independent
//! and nothing is retried.

use crate::auth::{JwtService, PasswordService, TokenKind};
use crate::repositories::{StoreError, UserStore};
use identity_shared::{AuthError, Principal, TokenPair};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, jwt: JwtService) -> Self {
        Self { store, jwt }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Register a new user and return the store-assigned ID
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<i64, AuthError> {
        const OP: &str = "auth.register";

        let password_hash = PasswordService::hash_async(password.to_string())
            .await
            .map_err(|e| {
                error!(op = OP, email, error = %e, "Failed to hash password");
                e
            })?;

        let user_id = match self.store.save_user(email, username, &password_hash).await {
            Ok(id) => id,
            Err(StoreError::DuplicateUser) => {
                warn!(op = OP, email, "User already exists");
                return Err(AuthError::UserAlreadyExists);
            }
            Err(e) => {
                error!(op = OP, email, error = %e, "Failed to save user");
                return Err(AuthError::storage(OP, e));
            }
        };

        info!(op = OP, email, user_id, "User registered");
        Ok(user_id)
    }

    /// Verify credentials and issue a fresh token pair
    ///
    /// An unknown email and a wrong password both fail with
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        const OP: &str = "auth.login";

        let user = match self.store.find_user(email).await {
            Ok(user) => user,
            Err(StoreError::UserNotFound) => {
                warn!(op = OP, email, "User not found");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(op = OP, email, error = %e, "Failed to load user");
                return Err(AuthError::storage(OP, e));
            }
        };

        let valid = PasswordService::verify_async(password.to_string(), user.password_hash)
            .await
            .map_err(|e| {
                error!(op = OP, email, user_id = user.id, error = %e, "Failed to verify password");
                e
            })?;

        if !valid {
            warn!(op = OP, email, user_id = user.id, "Invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        self.jwt.issue(user.id, &user.email).map_err(|e| {
            error!(op = OP, email, user_id = user.id, error = %e, "Failed to issue tokens");
            e.into()
        })
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The presented refresh token stays valid until it expires; see
    /// [`JwtService::rotate`].
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.jwt.rotate(refresh_token).map_err(|e| {
            warn!(op = "auth.refresh", error = %e, "Refresh rejected");
            e.into()
        })
    }

    /// Verify an access token and return the principal it names
    pub fn validate_token(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.jwt.parse_kind(token, TokenKind::Access)?;
        Ok(Principal {
            user_id: claims.uid,
            email: claims.email,
        })
    }

    /// Whether the user's stored role is exactly `admin`
    pub async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
        const OP: &str = "auth.is_admin";

        let role = match self.store.get_role(user_id).await {
            Ok(role) => role,
            Err(StoreError::UserNotFound) => {
                warn!(op = OP, user_id, "User not found");
                return Err(AuthError::UserNotFound);
            }
            Err(e) => {
                error!(op = OP, user_id, error = %e, "Failed to load role");
                return Err(AuthError::storage(OP, e));
            }
        };

        let admin = role.is_admin();
        info!(op = OP, user_id, admin, "Checked admin role");
        Ok(admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtSecret;
    use crate::repositories::{InMemoryUserStore, StoreResult};
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use fake::faker::internet::en::{Password, SafeEmail, Username};
    use fake::Fake;
    use identity_shared::{Role, TokenError, User};

    const ACCESS_TTL: i64 = 900;
    const REFRESH_TTL: i64 = 86400;

    fn create_test_service() -> (AuthService, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::new());
        let jwt = JwtService::new(&JwtSecret::from("test-secret"), ACCESS_TTL, REFRESH_TTL);
        (AuthService::new(store.clone(), jwt), store)
    }

    /// Store whose every call fails with a connection error
    struct BrokenStore;

    #[async_trait]
    impl UserStore for BrokenStore {
        async fn save_user(&self, _: &str, _: &str, _: &str) -> StoreResult<i64> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn find_user(&self, _: &str) -> StoreResult<User> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn get_role(&self, _: i64) -> StoreResult<Role> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (service, _) = create_test_service();
        let email: String = SafeEmail().fake();
        let username: String = Username().fake();
        let password: String = Password(8..20).fake();

        let user_id = service.register(&email, &username, &password).await.unwrap();
        let pair = service.login(&email, &password).await.unwrap();

        let principal = service.validate_token(&pair.access_token).unwrap();
        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.email, email);
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let (service, store) = create_test_service();
        service.register("a@example.com", "alice", "plaintext-pw").await.unwrap();

        let user = store.find_user("a@example.com").await.unwrap();
        assert_ne!(user.password_hash, "plaintext-pw");
        assert!(PasswordService::verify("plaintext-pw", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (service, _) = create_test_service();
        service.register("dup@example.com", "one", "password1").await.unwrap();

        let result = service.register("dup@example.com", "two", "password2").await;
        assert!(matches!(result, Err(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (service, _) = create_test_service();
        service.register("known@example.com", "known", "right-password").await.unwrap();

        let wrong_password = service.login("known@example.com", "wrong-password").await.unwrap_err();
        let unknown_email = service.login("unknown@example.com", "right-password").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_login_with_legacy_bcrypt_hash() {
        let (service, store) = create_test_service();
        store
            .insert(User {
                id: 100,
                email: "legacy@example.com".to_string(),
                username: "legacy".to_string(),
                password_hash: bcrypt::hash("old-password", 4).unwrap(),
                role: Role::User,
                created_at: Utc::now(),
            })
            .await;

        let pair = service.login("legacy@example.com", "old-password").await.unwrap();
        assert_eq!(service.validate_token(&pair.access_token).unwrap().user_id, 100);
    }

    #[tokio::test]
    async fn test_login_with_corrupt_hash_is_internal_error() {
        let (service, store) = create_test_service();
        store
            .insert(User {
                id: 1,
                email: "corrupt@example.com".to_string(),
                username: "corrupt".to_string(),
                password_hash: "garbage".to_string(),
                role: Role::User,
                created_at: Utc::now(),
            })
            .await;

        let err = service.login("corrupt@example.com", "password").await.unwrap_err();
        assert!(matches!(err, AuthError::Hashing(_)));
    }

    #[tokio::test]
    async fn test_expired_access_token_rejected() {
        let (service, _) = create_test_service();
        let issued_at = Utc::now() - Duration::seconds(ACCESS_TTL + 1);
        let pair = service.jwt().issue_at(1, "a@example.com", issued_at).unwrap();

        let err = service.validate_token(&pair.access_token).unwrap_err();
        assert!(matches!(err, AuthError::Token(TokenError::Expired)));
    }

    #[tokio::test]
    async fn test_validate_rejects_refresh_token() {
        let (service, _) = create_test_service();
        let pair = service.jwt().issue(1, "a@example.com").unwrap();

        let err = service.validate_token(&pair.refresh_token).unwrap_err();
        assert!(matches!(err, AuthError::Token(TokenError::WrongKind { .. })));
    }

    #[tokio::test]
    async fn test_refresh_keeps_identity_and_old_token() {
        let (service, _) = create_test_service();
        service.register("r@example.com", "r", "password").await.unwrap();
        let original = service.login("r@example.com", "password").await.unwrap();

        let rotated = service.refresh(&original.refresh_token).unwrap();
        let principal = service.validate_token(&rotated.access_token).unwrap();
        assert_eq!(principal.email, "r@example.com");

        // Old refresh token still works
        assert!(service.refresh(&original.refresh_token).is_ok());
    }

    #[tokio::test]
    async fn test_refresh_propagates_codec_errors() {
        let (service, _) = create_test_service();

        let err = service.refresh("not-a-token").unwrap_err();
        assert!(matches!(err, AuthError::Token(TokenError::Malformed)));
    }

    #[tokio::test]
    async fn test_is_admin() {
        let (service, store) = create_test_service();
        let admin = service.register("admin@example.com", "admin", "pw").await.unwrap();
        let regular = service.register("user@example.com", "user", "pw").await.unwrap();
        let odd = service.register("odd@example.com", "odd", "pw").await.unwrap();
        store.set_role(admin, Role::Admin).await;
        store.set_role(odd, Role::Unknown).await;

        assert!(service.is_admin(admin).await.unwrap());
        assert!(!service.is_admin(regular).await.unwrap());
        assert!(!service.is_admin(odd).await.unwrap());
        assert!(matches!(
            service.is_admin(9999).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_login_with_out_of_range_ttl_fails_cleanly() {
        let store = Arc::new(InMemoryUserStore::new());
        let jwt = JwtService::new(&JwtSecret::from("test-secret"), ACCESS_TTL, 10_000_000_000_000);
        let service = AuthService::new(store, jwt);
        service.register("ttl@example.com", "ttl", "pw").await.unwrap();

        let err = service.login("ttl@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Token(TokenError::Signing(_))));
    }

    #[tokio::test]
    async fn test_storage_failures_are_opaque() {
        let jwt = JwtService::new(&JwtSecret::from("test-secret"), ACCESS_TTL, REFRESH_TTL);
        let service = AuthService::new(Arc::new(BrokenStore), jwt);

        let err = service.register("a@example.com", "a", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::StorageUnavailable { op: "auth.register", .. }));

        let err = service.login("a@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::StorageUnavailable { op: "auth.login", .. }));

        let err = service.is_admin(1).await.unwrap_err();
        assert!(matches!(err, AuthError::StorageUnavailable { op: "auth.is_admin", .. }));
    }
}
