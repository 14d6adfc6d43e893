use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use tracing::warn;

use crate::auth::claims::Claims;
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;

/// Authenticated-gate: any valid access token.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

/// Admin-gate: valid token with the admin flag set.
#[derive(Debug)]
pub struct AdminUser(pub Claims);

/// Token transport is the custom `token` header carrying `Bearer <jwt>`,
/// kept for wire compatibility; a standard `Authorization` header works too.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers
        .get("token")
        .or_else(|| headers.get(axum::http::header::AUTHORIZATION))
        .and_then(|v| v.to_str().ok())?;
    raw.strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("bearer "))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthenticated("missing bearer token".into()))?;

        match keys.verify(token) {
            Ok(claims) => Ok(AuthUser(claims)),
            Err(_) => {
                warn!("invalid or expired token");
                Err(ApiError::Unauthenticated("invalid or expired token".into()))
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin {
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(claims))
    }
}
