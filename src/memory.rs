//! In-process stores backing `AppState::fake()` in tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::{
        repo::{EmailTaken, RefreshTokenStore, UserStore},
        repo_types::{RefreshToken, User},
    },
    chirps::{repo::ChirpStore, repo_types::Chirp},
};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    refresh_tokens: Mutex<HashMap<String, RefreshToken>>,
    chirps: Mutex<Vec<Chirp>>, // insertion order
}

impl MemoryStore {
    pub fn refresh_token_count(&self) -> usize {
        self.refresh_tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, email: &str, hashed_password: &str) -> anyhow::Result<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == email) {
            return Err(EmailTaken.into());
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> anyhow::Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.id != id && u.email == email) {
            return Err(EmailTaken.into());
        }
        Ok(users.get_mut(&id).map(|u| {
            u.email = email.to_string();
            u.hashed_password = hashed_password.to_string();
            u.updated_at = OffsetDateTime::now_utc();
            u.clone()
        }))
    }

    async fn upgrade_to_red(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut users = self.users.lock().unwrap();
        Ok(users
            .get_mut(&id)
            .map(|u| u.is_chirpy_red = true)
            .is_some())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn insert(&self, record: &RefreshToken) -> anyhow::Result<()> {
        let mut tokens = self.refresh_tokens.lock().unwrap();
        anyhow::ensure!(
            !tokens.contains_key(&record.token),
            "duplicate refresh token"
        );
        tokens.insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn find(&self, token: &str) -> anyhow::Result<Option<RefreshToken>> {
        Ok(self.refresh_tokens.lock().unwrap().get(token).cloned())
    }

    async fn revoke(&self, token: &str, at: OffsetDateTime) -> anyhow::Result<()> {
        let mut tokens = self.refresh_tokens.lock().unwrap();
        if let Some(record) = tokens.get_mut(token) {
            if record.revoked_at.is_none() {
                record.revoked_at = Some(at);
                record.updated_at = at;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ChirpStore for MemoryStore {
    async fn create(&self, user_id: Uuid, body: &str) -> anyhow::Result<Chirp> {
        let now = OffsetDateTime::now_utc();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            body: body.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.chirps.lock().unwrap().push(chirp.clone());
        Ok(chirp)
    }

    async fn list(&self) -> anyhow::Result<Vec<Chirp>> {
        Ok(self.chirps.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Chirp>> {
        let chirps = self.chirps.lock().unwrap();
        Ok(chirps.iter().find(|c| c.id == id).cloned())
    }
}
