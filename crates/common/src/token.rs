//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs whose subject is the user ID.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issues and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from a secret and a token lifetime.
    #[must_use]
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Create an issuer from the `auth` configuration section.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, Duration::days(config.token_ttl_days))
    }

    /// Issue a token for a user, valid from now.
    pub fn issue(&self, user_id: &str) -> AppResult<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token for a user as if issued at `issued_at`.
    pub fn issue_at(&self, user_id: &str, issued_at: DateTime<Utc>) -> AppResult<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a token's signature and expiry and return its claims.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                AppError::Unauthorized
            })
    }
}
