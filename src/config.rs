use std::time::Duration;

use anyhow::Context;
use time::OffsetDateTime;

use crate::auth::expires_after;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Shared key the payment provider presents on its webhook calls.
    pub polka_key: String,
}

/// Reads a lifetime in minutes. Unparsable values fall back to `default`;
/// values whose expiry cannot be represented are an error.
fn ttl_minutes(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> anyhow::Result<Duration> {
    let minutes = get(key)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default);
    let ttl = minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .with_context(|| format!("{key}={minutes} overflows"))?;
    anyhow::ensure!(
        expires_after(OffsetDateTime::now_utc(), ttl).is_some(),
        "{key}={minutes} is out of range"
    );
    Ok(ttl)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;

        let secret = get("JWT_SECRET").context("JWT_SECRET must be set")?;
        anyhow::ensure!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let jwt = JwtConfig {
            secret,
            access_ttl: ttl_minutes(&get, "JWT_TTL_MINUTES", 60)?,
            refresh_ttl: ttl_minutes(&get, "JWT_REFRESH_TTL_MINUTES", 60 * 24 * 60)?,
        };
        let polka_key = get("POLKA_KEY").context("POLKA_KEY must be set")?;

        Ok(Self {
            database_url,
            jwt,
            polka_key,
        })
    }
}
