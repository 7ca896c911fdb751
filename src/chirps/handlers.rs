use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{ChirpResponse, CreateChirpRequest};
use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

/// Longest accepted body, counted in characters.
const MAX_CHIRP_LEN: usize = 140;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/chirps", get(list_chirps))
        .route("/chirps/:chirp_id", get(get_chirp))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/chirps", post(create_chirp))
}

fn validate_body(body: &str) -> Result<(), ApiError> {
    if body.chars().count() > MAX_CHIRP_LEN {
        return Err(ApiError::BadRequest("Chirp is too long".into()));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn create_chirp(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateChirpRequest>,
) -> Result<(StatusCode, Json<ChirpResponse>), ApiError> {
    validate_body(&payload.body)?;

    let chirp = state.chirps.create(user_id, &payload.body).await?;
    info!(chirp_id = %chirp.id, user_id = %user_id, "chirp created");
    Ok((StatusCode::CREATED, Json(chirp.into())))
}

#[instrument(skip(state))]
pub async fn list_chirps(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChirpResponse>>, ApiError> {
    let chirps = state.chirps.list().await?;
    Ok(Json(chirps.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> Result<Json<ChirpResponse>, ApiError> {
    let id = Uuid::parse_str(&chirp_id)
        .map_err(|_| ApiError::BadRequest("invalid chirp ID".into()))?;

    let chirp = state.chirps.find_by_id(id).await?.ok_or_else(|| {
        warn!(chirp_id = %id, "chirp not found");
        ApiError::NotFound("chirp not found")
    })?;
    Ok(Json(chirp.into()))
}
