use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::{
    claims::{Claims, ACCESS_TOKEN_ISSUER},
    expires_after,
};
use crate::{config::JwtConfig, state::AppState};

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad structure, bad encoding or signature mismatch.
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    Expired,
    #[error("invalid issuer")]
    InvalidIssuer,
    #[error("malformed subject")]
    MalformedSubject,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// HMAC keys derived from the process-wide signing secret.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub access_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret, access_ttl, ..
        } = &state.config.jwt;
        Self::from_secret(secret, *access_ttl)
    }
}

impl JwtKeys {
    pub fn from_secret(secret: &str, access_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
        }
    }

    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let exp = expires_after(now, ttl)
            .ok_or_else(|| TokenError::Signing(format!("access ttl {ttl:?} out of range")))?;
        let claims = Claims {
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Issues a token with the configured access lifetime.
    pub fn issue_access(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, self.access_ttl)
    }

    /// Returns the subject of a token signed with this secret.
    ///
    /// Expiry is checked here rather than by `jsonwebtoken` so that the
    /// boundary is exact: a token whose `exp` equals the current second is
    /// already expired.
    pub fn validate(&self, token: &str) -> Result<Uuid, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                debug!(error = %e, "jwt decode failed");
                TokenError::InvalidToken
            })?
            .claims;

        if claims.iss != ACCESS_TOKEN_ISSUER {
            return Err(TokenError::InvalidIssuer);
        }
        if claims.exp <= OffsetDateTime::now_utc().unix_timestamp() {
            return Err(TokenError::Expired);
        }
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::MalformedSubject)?;

        debug!(user_id = %user_id, "jwt verified");
        Ok(user_id)
    }
}
