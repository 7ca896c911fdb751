use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Chirp record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid, // author, removed with the user
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
