use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::models::UserRecord;

pub const TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Identity claims carried by a session token. `iat`/`exp` are unix
/// timestamps in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i64,
    pub user_name: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
}

pub fn issue_token(
    user: &UserRecord,
    secret: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    let issued_at = now.timestamp();
    let claims = SessionClaims {
        user_id: user.user_id,
        user_name: user.user_name.clone(),
        role: user.role.clone(),
        iat: issued_at,
        exp: issued_at + ttl.as_secs() as i64,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|error| TokenError::Signing(error.to_string()))
}

pub fn verify_token(token: &str, secret: &str) -> Result<SessionClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // zero leeway keeps the one-hour window exact
    validation.leeway = 0;

    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|error| match error.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::InvalidSignature,
    })
}
