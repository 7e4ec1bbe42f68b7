//! Error types for the identity service

use thiserror::Error;

/// Boxed underlying failure forwarded from a collaborator
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Authentication error types
///
/// Every failure the authentication core can report. Transport layers map
/// these kinds onto their own status codes.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email or wrong password. Both cases are reported the same way.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Hashing(#[from] HashError),

    /// Any store failure that does not match a known case
    #[error("Storage unavailable in {op}")]
    StorageUnavailable {
        op: &'static str,
        #[source]
        source: BoxError,
    },
}

impl AuthError {
    /// Wrap an opaque store failure with the operation that hit it
    pub fn storage<E>(op: &'static str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        AuthError::StorageUnavailable {
            op,
            source: source.into(),
        }
    }
}

/// Token codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Malformed token")]
    Malformed,

    #[error("Expected {expected} token, got {found}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Credential hasher errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error("Malformed password hash: {0}")]
    MalformedHash(String),
}
