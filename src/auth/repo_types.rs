use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                   // unique user ID
    pub email: String,              // user email
    #[serde(skip_serializing)]
    pub hashed_password: String,    // Argon2 hash, not exposed in JSON
    pub is_chirpy_red: bool,        // premium tier, set by the Polka webhook
    pub created_at: OffsetDateTime, // creation timestamp
    pub updated_at: OffsetDateTime, // last update timestamp
}

/// Persisted refresh token. Revocation only ever sets `revoked_at`.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub revoked_at: Option<OffsetDateTime>,
}
