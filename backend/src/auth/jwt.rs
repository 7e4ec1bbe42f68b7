//! JWT token generation and validation
//!
//! Issues HS256-signed access/refresh pairs, verifies presented tokens and
//! rotates refresh tokens. Keys are derived once from the process secret and
//! shared behind `Arc`.

use chrono::{DateTime, Duration, Utc};
use identity_shared::{TokenError, TokenPair};
use jsonwebtoken::{
    crypto, decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Longest token lifetime accepted anywhere (ten years)
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Symmetric signing secret
///
/// Loaded once at startup and never printed.
pub struct JwtSecret(Secret<Vec<u8>>);

impl JwtSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Secret::new(bytes.into()))
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }
}

impl From<&str> for JwtSecret {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JwtSecret([REDACTED])")
    }
}

/// Token kind carried in every claim set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub uid: i64,
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub token_type: TokenKind,
    /// Unique per token, so two pairs issued in the same second still differ
    pub jti: String,
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    pub fn new(secret: &JwtSecret) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.expose())),
            decoding: Arc::new(DecodingKey::from_secret(secret.expose())),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Token lifetimes
#[derive(Debug, Clone, Copy)]
pub struct JwtConfig {
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
}

/// JWT service for token operations
///
/// Cheap to clone; all handlers share one instance built at startup.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    config: JwtConfig,
    validation: Arc<Validation>,
}

impl JwtService {
    pub fn new(
        secret: &JwtSecret,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
    ) -> Self {
        Self::from_keys(
            JwtKeys::new(secret),
            JwtConfig {
                access_token_expiry_secs,
                refresh_token_expiry_secs,
            },
        )
    }

    pub fn from_keys(keys: JwtKeys, config: JwtConfig) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            keys,
            config,
            validation: Arc::new(validation),
        }
    }

    /// Issue an access/refresh pair for a user, issued now
    pub fn issue(&self, user_id: i64, email: &str) -> Result<TokenPair, TokenError> {
        self.issue_at(user_id, email, Utc::now())
    }

    /// Issue an access/refresh pair with both expirations derived from `issued_at`
    pub fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let access_token = self.generate_token(
            user_id,
            email,
            TokenKind::Access,
            issued_at,
            self.config.access_token_expiry_secs,
        )?;
        let refresh_token = self.generate_token(
            user_id,
            email,
            TokenKind::Refresh,
            issued_at,
            self.config.refresh_token_expiry_secs,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiry_secs,
        })
    }

    fn generate_token(
        &self,
        user_id: i64,
        email: &str,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        expiry_secs: i64,
    ) -> Result<String, TokenError> {
        let exp = Duration::try_seconds(expiry_secs)
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or_else(|| {
                TokenError::Signing(format!(
                    "{} token: lifetime of {}s is out of range",
                    kind.as_str(),
                    expiry_secs
                ))
            })?;

        let claims = Claims {
            uid: user_id,
            email: email.to_string(),
            exp: exp.timestamp(),
            iat: issued_at.timestamp(),
            token_type: kind,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(ALGORITHM), &claims, self.keys.encoding())
            .map_err(|e| TokenError::Signing(format!("{} token: {}", kind.as_str(), e)))
    }

    /// Verify a token and return its claims
    ///
    /// The signature is checked against the raw signed content before
    /// anything is decoded, so altering any byte of the header, payload or
    /// signature yields [`TokenError::InvalidSignature`].
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let (header, payload, signature) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(h), Some(p), Some(s), None)
                    if !h.is_empty() && !p.is_empty() && !s.is_empty() =>
                {
                    (h, p, s)
                }
                _ => return Err(TokenError::Malformed),
            };

        let message = &token[..header.len() + 1 + payload.len()];
        let signed = crypto::verify(signature, message.as_bytes(), self.keys.decoding(), ALGORITHM)
            .map_err(|_| TokenError::InvalidSignature)?;
        if !signed {
            return Err(TokenError::InvalidSignature);
        }

        let data = decode::<Claims>(token, self.keys.decoding(), &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;

        Ok(data.claims)
    }

    /// Verify a token and require it to be of the given kind
    pub fn parse_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let claims = self.parse(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongKind {
                expected: expected.as_str(),
                found: claims.token_type.as_str(),
            });
        }
        Ok(claims)
    }

    /// Exchange a valid refresh token for a fresh pair with the same identity
    ///
    /// Rotation is stateless: the presented refresh token is not revoked and
    /// stays usable until its own `exp`. There is no revocation store, so a
    /// leaked refresh token can mint pairs until it expires. Keep
    /// `refresh_token_expiry_secs` as short as the product allows.
    pub fn rotate(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        let claims = self.parse_kind(refresh_token, TokenKind::Refresh)?;
        self.issue(claims.uid, &claims.email)
    }

    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.config.access_token_expiry_secs
    }

    #[inline]
    pub fn refresh_token_expiry_secs(&self) -> i64 {
        self.config.refresh_token_expiry_secs
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.config
    }
}
