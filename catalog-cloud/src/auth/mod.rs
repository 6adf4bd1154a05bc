//! Bearer JWT authentication for write routes
//!
//! Write handlers take an [`Identity`] argument; extraction fails the request
//! with 401 before the handler runs.

use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

use crate::state::AppState;

/// JWT claims for catalog editors
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Editor identity
    pub sub: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated caller extracted from the bearer token
#[derive(Debug, Clone)]
pub struct Identity {
    pub subject: String,
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a JWT token for `subject`
pub fn create_token(subject: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: subject.to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(identity.clone());
        }

        let Some(header) = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
        else {
            tracing::debug!(uri = %parts.uri, "Missing Authorization header");
            return Err(AppError::unauthorized());
        };

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

        let token_data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!(uri = %parts.uri, "JWT validation failed: {e}");
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            }
        })?;

        let identity = Identity {
            subject: token_data.claims.sub,
        };
        parts.extensions.insert(identity.clone());
        Ok(identity)
    }
}
