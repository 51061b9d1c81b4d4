use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::cookies::{request_cookie, ACCESS_COOKIE};
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;

/// Identity attached to every protected request: the access token is read
/// from the `Authorization: Bearer` header, falling back to the
/// `accessToken` cookie. Refresh is never attempted here; an expired
/// access token rejects and the client must call `/auth/refresh`.
#[derive(Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
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

        let token = match parts.headers.get(axum::http::header::AUTHORIZATION) {
            Some(header) => {
                let header = header.to_str().map_err(|_| ApiError::AuthMalformed)?;
                // Exactly "Bearer <token>"; a present-but-malformed header
                // never falls through to the cookie.
                let mut segments = header.split(' ');
                match (segments.next(), segments.next(), segments.next()) {
                    (Some("Bearer"), Some(token), None) if !token.is_empty() => token.to_string(),
                    _ => return Err(ApiError::AuthMalformed),
                }
            }
            None => request_cookie(&parts.headers, ACCESS_COOKIE).ok_or(ApiError::AuthMissing)?,
        };

        let claims = keys.verify_access(&token).map_err(|e| {
            warn!(error = %e, "access token rejected");
            ApiError::AuthInvalid
        })?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}
