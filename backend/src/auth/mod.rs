//! Authentication module
//!
//! JWT issuance and verification, argon2 password hashing and the bearer
//! token extractor.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtConfig, JwtKeys, JwtSecret, JwtService, TokenKind, MAX_TOKEN_TTL_SECS};
pub use middleware::AuthUser;
pub use password::PasswordService;
