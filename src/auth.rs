//! Caller identity resolved from the `Authorization` header.
//!
//! Tokens are issued by an external service and stored in `auth_tokens`;
//! this module only looks them up.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use model::entities::user;
use tracing::{debug, warn};

use crate::schemas::{ApiError, AppState};

/// The caller of a request: a user, or nobody.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<user::Model>);

impl Caller {
    pub fn id(&self) -> Option<i32> {
        self.0.as_ref().map(|u| u.id)
    }
}

/// An authenticated caller. Rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl AuthUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

/// Extracts the key from `Token <key>` or `Bearer <key>`.
fn token_key(header: &str) -> Option<&str> {
    let (scheme, key) = header.trim().split_once(' ')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") {
        Some(key)
    } else {
        None
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Caller(None));
        };

        let key = value.to_str().ok().and_then(token_key).ok_or_else(|| {
            warn!("Malformed Authorization header");
            ApiError::unauthorized()
        })?;

        match service::users::find_by_token(&state.db, key).await? {
            Some(user) => {
                debug!("Request authenticated as user {}", user.id);
                Ok(Caller(Some(user)))
            }
            None => {
                warn!("Unknown API token");
                Err(ApiError::unauthorized())
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Caller::from_request_parts(parts, state).await? {
            Caller(Some(user)) => Ok(AuthUser(user)),
            Caller(None) => Err(ApiError::unauthorized()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::token_key;

    #[test]
    fn test_token_key_schemes() {
        assert_eq!(token_key("Token abc"), Some("abc"));
        assert_eq!(token_key("Bearer abc"), Some("abc"));
        assert_eq!(token_key("bearer  abc "), Some("abc"));
        assert_eq!(token_key("Basic abc"), None);
        assert_eq!(token_key("Token"), None);
        assert_eq!(token_key("Token "), None);
    }
}
