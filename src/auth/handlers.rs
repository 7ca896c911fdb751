use axum::{
    extract::{FromRef, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{CredentialsRequest, LoginResponse, PublicUser, RefreshResponse},
        extractors::{bearer_token, AuthUser},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::EmailTaken,
    },
    error::ApiError,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;
const INVALID_CREDENTIALS: &str = "Incorrect email or password";
const EMAIL_TAKEN: &str = "Email already registered";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Normalizes the email and applies the registration rules shared by create
/// and update.
fn validate_credentials(payload: &mut CredentialsRequest) -> Result<(), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }
    Ok(())
}

/// Store uniqueness error to 409. Also covers a registration that slips in
/// between the `find_by_email` check and the insert.
fn conflict_if_email_taken(e: anyhow::Error) -> ApiError {
    if e.downcast_ref::<EmailTaken>().is_some() {
        warn!("email already registered");
        ApiError::Conflict(EMAIL_TAKEN)
    } else {
        ApiError::Internal(e)
    }
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).put(update_user))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/revoke", post(revoke))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(mut payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    validate_credentials(&mut payload)?;

    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict(EMAIL_TAKEN));
    }

    let hash = hash_password(&payload.password)?;
    let user = state
        .users
        .create(&payload.email, &hash)
        .await
        .map_err(conflict_if_email_taken)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut payload): Json<CredentialsRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    validate_credentials(&mut payload)?;

    let hash = hash_password(&payload.password)?;
    let user = state
        .users
        .update_credentials(user_id, &payload.email, &hash)
        .await
        .map_err(conflict_if_email_taken)?
        .ok_or_else(|| {
            warn!(user_id = %user_id, "token subject has no user");
            ApiError::Unauthorized(crate::error::UNAUTHORIZED)
        })?;

    info!(user_id = %user.id, "user credentials updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let Some(user) = state.users.find_by_email(&payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(&payload.password, &user.hashed_password)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue_access(user.id)?;
    let refresh_token = state
        .refresh_tokens
        .mint(user.id, state.config.jwt.refresh_ttl)
        .await?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        user: user.into(),
        token,
        refresh_token,
    }))
}

#[instrument(skip(state, headers))]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    let refresh_token = bearer_token(&headers)?;
    let user_id = state.refresh_tokens.resolve_user(refresh_token).await?;

    let token = JwtKeys::from_ref(&state).issue_access(user_id)?;
    info!(user_id = %user_id, "access token refreshed");
    Ok(Json(RefreshResponse { token }))
}

#[instrument(skip(state, headers))]
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let refresh_token = bearer_token(&headers)?;
    state.refresh_tokens.revoke(refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state.users.find_by_id(user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "user not found");
        ApiError::Unauthorized(crate::error::UNAUTHORIZED)
    })?;
    Ok(Json(user.into()))
}
