use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::Chirp;
use crate::auth::repo::PgStore;

#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create(&self, user_id: Uuid, body: &str) -> anyhow::Result<Chirp>;
    /// All chirps, oldest first.
    async fn list(&self) -> anyhow::Result<Vec<Chirp>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Chirp>>;
}

#[async_trait]
impl ChirpStore for PgStore {
    async fn create(&self, user_id: Uuid, body: &str) -> anyhow::Result<Chirp> {
        let chirp = sqlx::query_as::<_, Chirp>(
            r#"
            INSERT INTO chirps (id, body, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, body, user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(body)
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .context("insert chirp")?;
        Ok(chirp)
    }

    async fn list(&self) -> anyhow::Result<Vec<Chirp>> {
        let rows = sqlx::query_as::<_, Chirp>(
            r#"
            SELECT id, body, user_id, created_at, updated_at
              FROM chirps
             ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list chirps")?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Chirp>> {
        let row = sqlx::query_as::<_, Chirp>(
            r#"
            SELECT id, body, user_id, created_at, updated_at
              FROM chirps
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find chirp")?;
        Ok(row)
    }
}
