//! Access and refresh tokens.
//!
//! An access token is a short-lived HS256 JWT issued by `alms` that carries
//! the account's [`Role`], so the RBAC extractors never touch the database.
//! A refresh token is an opaque string handed to the client once; the
//! `user_sessions` table only ever sees its SHA-256 digest.

use alms_core::roles::Role;
use alms_core::types::{DbId, Timestamp};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// `iss` claim of every access token.
pub const TOKEN_ISSUER: &str = "alms";

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

/// Payload of an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: DbId,
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

/// Signing secret and token lifetimes.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl JwtConfig {
    /// | Env Var                   | Required | Default |
    /// |---------------------------|----------|---------|
    /// | `JWT_SECRET`              | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`  | no       | `15`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS` | no       | `7`     |
    ///
    /// # Panics
    ///
    /// Panics if the secret is missing or a lifetime is not a positive integer.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_mins = positive_env("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS);
        let refresh_days = positive_env("JWT_REFRESH_EXPIRY_DAYS", DEFAULT_REFRESH_EXPIRY_DAYS);

        Self {
            secret,
            access_ttl: Duration::minutes(access_mins),
            refresh_ttl: Duration::days(refresh_days),
        }
    }

    /// Sign an access token for `user_id` acting as `role`.
    pub fn issue_access_token(
        &self,
        user_id: DbId,
        role: Role,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            role,
            iss: TOKEN_ISSUER.to_string(),
            iat: now,
            exp: now + self.access_ttl.num_seconds(),
            jti: Uuid::new_v4(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Check signature, issuer and expiry, and return the claims.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
    }

    /// Expiry to store on a session opened now.
    pub fn refresh_expires_at(&self) -> Timestamp {
        Utc::now() + self.refresh_ttl
    }

    /// `expires_in` reported to clients, in seconds.
    pub fn access_expires_in(&self) -> i64 {
        self.access_ttl.num_seconds()
    }
}

fn positive_env(key: &str, default: i64) -> i64 {
    let value: i64 = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{key} must be a valid integer"));
    assert!(value > 0, "{key} must be positive");
    value
}

/// A freshly minted refresh token and the digest persisted for it.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    /// Returned to the client, never stored.
    pub token: String,
    pub digest: String,
}

impl RefreshToken {
    pub fn issue() -> Self {
        let token: String = [Uuid::new_v4(), Uuid::new_v4()]
            .iter()
            .map(|id| id.simple().to_string())
            .collect();
        let digest = Self::digest_of(&token);
        Self { token, digest }
    }

    /// Hex SHA-256 of a presented refresh token, for session lookup.
    pub fn digest_of(token: &str) -> String {
        format!("{:x}", Sha256::digest(token.as_bytes()))
    }
}
