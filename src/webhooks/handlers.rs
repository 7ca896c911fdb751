use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::api_key,
    error::{ApiError, UNAUTHORIZED},
    state::AppState,
};

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct PolkaEvent {
    pub event: String,
    pub data: PolkaEventData,
}

#[derive(Debug, Deserialize)]
pub struct PolkaEventData {
    pub user_id: Uuid,
}

/// Compares the digests byte by byte without short-circuiting, so timing
/// depends on neither the length nor the matching prefix of `presented`.
fn keys_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Payment provider callback. Authorized by the static `ApiKey`, not by a
/// user token; the body is only parsed once the key matches.
#[instrument(skip_all)]
pub async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let key = api_key(&headers)?;
    if !keys_match(key, &state.config.polka_key) {
        warn!("polka webhook with wrong api key");
        return Err(ApiError::Unauthorized(UNAUTHORIZED));
    }

    let payload: PolkaEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("couldn't decode request: {e}")))?;

    if payload.event != USER_UPGRADED {
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = payload.data.user_id;
    if !state.users.upgrade_to_red(user_id).await? {
        warn!(user_id = %user_id, "upgrade for unknown user");
        return Err(ApiError::NotFound("user not found"));
    }

    info!(user_id = %user_id, "user upgraded to chirpy red");
    Ok(StatusCode::NO_CONTENT)
}
