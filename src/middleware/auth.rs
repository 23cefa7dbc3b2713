use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::accounts::Claims, error::AppError, state::AppState};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Bearer token from the `Authorization` header, if well formed.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let auth_str = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

pub fn decode_user(token: &str, secret: &str) -> Option<AuthUser> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| tracing::debug!(error = %err, "rejected token"))
    .ok()?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).ok()?;
    Some(AuthUser {
        user_id,
        username: decoded.claims.username,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_token(parts)
            .and_then(|token| decode_user(token, &state.config.jwt_secret))
            .ok_or(AppError::Unauthenticated)
    }
}

impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(bearer_token(parts).and_then(|token| decode_user(token, &state.config.jwt_secret)))
    }
}
