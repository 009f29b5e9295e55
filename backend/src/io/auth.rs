//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs signed with the configured secret. The `sub` claim is
//! the owner id every tracker operation is scoped by.

use anyhow::{Context, Result};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::io::rest::error_response;
use crate::AppState;

const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Authentication required";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerClaims {
    pub sub: String,
    pub exp: usize,
}

/// Key material and validation rules for incoming tokens
#[derive(Clone)]
pub struct AuthKeys {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Validate a token and return the owner id it was issued for
    pub fn validate_token(&self, token: &str) -> Result<String> {
        let token_data = decode::<OwnerClaims>(token, &self.decoding_key, &self.validation)
            .context("Failed to decode JWT token")?;

        let owner_id = token_data.claims.sub.trim();
        if owner_id.is_empty() {
            anyhow::bail!("Token has an empty subject");
        }
        Ok(owner_id.to_string())
    }
}

fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE, "unauthorized")
}

/// Middleware that requires a valid bearer token
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(token) = token else {
        return unauthorized();
    };

    match state.auth.validate_token(token) {
        Ok(owner_id) => {
            req.extensions_mut().insert(AuthenticatedOwner(owner_id));
            next.run(req).await
        }
        Err(e) => {
            warn!("Rejected bearer token: {:#}", e);
            unauthorized()
        }
    }
}

/// Owner established by [`require_auth`].
/// Usage in handlers: `async fn handler(AuthenticatedOwner(owner_id): AuthenticatedOwner)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedOwner(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedOwner
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedOwner>()
            .cloned()
            .ok_or_else(|| unauthorized().into_response())
    }
}

#[cfg(test)]
pub mod test_tokens {
    use super::OwnerClaims;
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub const TEST_SECRET: &str = "test-secret";

    /// Far-future expiry (2096)
    pub const FAR_FUTURE: usize = 4_000_000_000;

    pub fn token_for(owner_id: &str) -> String {
        token_with(owner_id, FAR_FUTURE, TEST_SECRET)
    }

    pub fn token_with(owner_id: &str, exp: usize, secret: &str) -> String {
        let claims = OwnerClaims {
            sub: owner_id.to_string(),
            exp,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }
}
