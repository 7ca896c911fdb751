use std::{sync::Arc, time::Duration};

use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::{expires_after, repo::RefreshTokenStore, repo_types::RefreshToken};

/// Bytes of entropy per refresh token, hex-encoded on the wire.
const REFRESH_TOKEN_BYTES: usize = 32;

/// Why a refresh token was refused. The first three variants are for logs
/// only; at the HTTP boundary they all become the same 401.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("refresh token not found")]
    NotFound,
    #[error("refresh token expired")]
    Expired,
    #[error("refresh token revoked")]
    Revoked,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Owns the lifecycle of persisted refresh tokens: mint, resolve and revoke.
#[derive(Clone)]
pub struct RefreshTokenManager {
    store: Arc<dyn RefreshTokenStore>,
}

fn random_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl RefreshTokenManager {
    pub fn new(store: Arc<dyn RefreshTokenStore>) -> Self {
        Self { store }
    }

    /// Generates and persists a new token for `user_id`.
    ///
    /// Existing tokens are not consulted: the store's primary key on `token`
    /// rejects a collision, which surfaces as [`RefreshError::Store`].
    pub async fn mint(&self, user_id: Uuid, ttl: Duration) -> Result<String, RefreshError> {
        let now = OffsetDateTime::now_utc();
        let expires_at = expires_after(now, ttl)
            .ok_or_else(|| anyhow::anyhow!("refresh ttl {ttl:?} out of range"))?;
        let record = RefreshToken {
            token: random_token(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        };
        self.store.insert(&record).await?;
        debug!(user_id = %user_id, expires_at = %record.expires_at, "refresh token minted");
        Ok(record.token)
    }

    /// Returns the owner of a live token.
    ///
    /// A resolve racing a revoke of the same token may see either state; each
    /// is a single store read or write and nothing orders them.
    pub async fn resolve_user(&self, token: &str) -> Result<Uuid, RefreshError> {
        let record = self.store.find(token).await?.ok_or(RefreshError::NotFound)?;
        if OffsetDateTime::now_utc() > record.expires_at {
            return Err(RefreshError::Expired);
        }
        if record.revoked_at.is_some() {
            return Err(RefreshError::Revoked);
        }
        Ok(record.user_id)
    }

    /// Marks the token revoked. Already revoked and unknown tokens succeed
    /// the same way, so the result says nothing about existence.
    pub async fn revoke(&self, token: &str) -> Result<(), RefreshError> {
        self.store.revoke(token, OffsetDateTime::now_utc()).await?;
        Ok(())
    }
}
