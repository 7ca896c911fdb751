use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{RefreshToken, User};

/// Returned by [`UserStore::create`] and [`UserStore::update_credentials`]
/// when another user already owns the email.
#[derive(Debug, Error)]
#[error("email already registered")]
pub struct EmailTaken;

/// Turns a unique violation on `users.email` into [`EmailTaken`].
fn map_unique_email(e: sqlx::Error, context: &'static str) -> anyhow::Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => EmailTaken.into(),
        _ => anyhow::Error::new(e).context(context),
    }
}

/// Email uniqueness is enforced by the store, which fails with
/// [`EmailTaken`] rather than a generic error.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a new user with an already hashed password.
    async fn create(&self, email: &str, hashed_password: &str) -> anyhow::Result<User>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Replace email and password hash. `None` when the user does not exist.
    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> anyhow::Result<Option<User>>;
    /// Set `is_chirpy_red`. `false` when the user does not exist.
    async fn upgrade_to_red(&self, id: Uuid) -> anyhow::Result<bool>;
}

/// Row-level access to the `refresh_tokens` table. Every method is a single
/// statement; nothing spans more than one token.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Fails if a row with the same token already exists.
    async fn insert(&self, record: &RefreshToken) -> anyhow::Result<()>;
    async fn find(&self, token: &str) -> anyhow::Result<Option<RefreshToken>>;
    /// Set `revoked_at` unless it is already set. Unknown tokens are a no-op.
    async fn revoke(&self, token: &str, at: OffsetDateTime) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgStore {
    pub(crate) db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, email: &str, hashed_password: &str) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, hashed_password)
            VALUES ($1, $2, $3)
            RETURNING id, email, hashed_password, is_chirpy_red, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_email(e, "insert user"))?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, hashed_password, is_chirpy_red, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, hashed_password, is_chirpy_red, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET email = $2, hashed_password = $3, updated_at = NOW()
             WHERE id = $1
            RETURNING id, email, hashed_password, is_chirpy_red, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(hashed_password)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_unique_email(e, "update user credentials"))?;
        Ok(user)
    }

    async fn upgrade_to_red(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET is_chirpy_red = TRUE, updated_at = NOW()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await
        .context("upgrade user")?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl RefreshTokenStore for PgStore {
    async fn insert(&self, record: &RefreshToken) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&record.token)
        .bind(record.user_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.expires_at)
        .bind(record.revoked_at)
        .execute(&self.db)
        .await
        .context("insert refresh token")?;
        Ok(())
    }

    async fn find(&self, token: &str) -> anyhow::Result<Option<RefreshToken>> {
        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
              FROM refresh_tokens
             WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await
        .context("find refresh token")?;
        Ok(row)
    }

    async fn revoke(&self, token: &str, at: OffsetDateTime) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE refresh_tokens
               SET revoked_at = $2, updated_at = $2
             WHERE token = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(token)
        .bind(at)
        .execute(&self.db)
        .await
        .context("revoke refresh token")?;
        Ok(())
    }
}
