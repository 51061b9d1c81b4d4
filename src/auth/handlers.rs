use axum::{
    extract::{FromRef, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookies::{self, REFRESH_COOKIE},
        dto::{AuthResponse, LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

/// Issue both tokens, persist the refresh token (overwriting any previous
/// one) and build the session cookie pair.
async fn open_session(state: &AppState, user: &User) -> anyhow::Result<HeaderMap> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id, &user.email)?;
    let refresh_token = keys.sign_refresh(user.id, &user.email)?;
    User::set_refresh_token(&state.db, user.id, &refresh_token).await?;
    Ok(cookies::set_session_cookies(
        &state.config.cookies,
        &access_token,
        &refresh_token,
        keys.refresh_max_age_seconds(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    let new = payload.validate()?;

    if User::find_by_email(&state.db, &new.email).await?.is_some() {
        warn!(email = %new.email, "email already registered");
        return Err(ApiError::Conflict(
            "User with that email already exists".into(),
        ));
    }

    let hash = hash_password(&new.password)?;
    let user = User::create(&state.db, &new, &hash).await?;
    let headers = open_session(&state, &user).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthResponse {
            user: user.into(),
            message: "user registered successfully".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e.trim().to_lowercase(), p),
        _ => return Err(ApiError::Validation("Missing email or password".into())),
    };

    // Uniform rejection whether the email is unknown or the password is
    // wrong, so the endpoint cannot be used to enumerate users.
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let headers = open_session(&state, &user).await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        headers,
        Json(AuthResponse {
            user: user.into(),
            message: "user logged in successfully".into(),
        }),
    ))
}

#[instrument(skip(state, headers))]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Json<serde_json::Value>), ApiError> {
    let presented = cookies::request_cookie(&headers, REFRESH_COOKIE)
        .ok_or_else(|| ApiError::Validation("Missing refresh token cookie".into()))?;

    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&presented)
        .map_err(|_| ApiError::Forbidden("Invalid refresh token".into()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    // The presented token must be the one most recently issued to this
    // user; a later login or a logout supersedes it.
    if user.refresh_token.as_deref() != Some(presented.as_str()) {
        warn!(user_id = %user.id, "refresh token revoked");
        return Err(ApiError::Forbidden("Refresh token revoked".into()));
    }

    let access_token = keys.sign_access(user.id, &user.email)?;
    let set_cookie = cookies::set_access_cookie(&state.config.cookies, &access_token);

    info!(user_id = %user.id, "access token refreshed");
    Ok((
        set_cookie,
        Json(serde_json::json!({ "message": "access token refreshed" })),
    ))
}

/// Logout is idempotent and never fails toward the client: the stored
/// refresh token is cleared best-effort and both cookies always expire.
#[instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (HeaderMap, Json<serde_json::Value>) {
    if let Some(presented) = cookies::request_cookie(&headers, REFRESH_COOKIE) {
        let keys = JwtKeys::from_ref(&state);
        if let Ok(claims) = keys.verify_refresh(&presented) {
            if let Err(e) = User::clear_refresh_token(&state.db, claims.sub).await {
                warn!(error = %e, user_id = %claims.sub, "clearing refresh token failed");
            } else {
                info!(user_id = %claims.sub, "user logged out");
            }
        }
    }

    (
        cookies::clear_session_cookies(&state.config.cookies),
        Json(serde_json::json!({ "message": "Logged out" })),
    )
}
