use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use thiserror::Error;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::ApiError;

/// Credential schemes accepted in the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Bearer,
    ApiKey,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Bearer => "Bearer",
            Scheme::ApiKey => "ApiKey",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("no {} credential in Authorization header", .0.as_str())]
    Missing(Scheme),
    #[error("malformed Authorization header, expected `{} <value>`", .0.as_str())]
    Malformed(Scheme),
}

/// Reads `Authorization: <Scheme> <value>` and returns `<value>`.
///
/// The scheme word is compared case-sensitively. Anything after a second
/// space is ignored.
pub fn extract_credential(headers: &HeaderMap, scheme: Scheme) -> Result<&str, HeaderError> {
    let Some(raw) = headers.get(AUTHORIZATION) else {
        return Err(HeaderError::Missing(scheme));
    };
    if raw.is_empty() {
        return Err(HeaderError::Missing(scheme));
    }
    let value = raw.to_str().map_err(|_| HeaderError::Malformed(scheme))?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next()) {
        (Some(prefix), Some(credential)) if prefix == scheme.as_str() => Ok(credential),
        _ => Err(HeaderError::Malformed(scheme)),
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, HeaderError> {
    extract_credential(headers, Scheme::Bearer)
}

pub fn api_key(headers: &HeaderMap) -> Result<&str, HeaderError> {
    extract_credential(headers, Scheme::ApiKey)
}

/// Caller authenticated by a valid access token.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = bearer_token(&parts.headers)?;
        let user_id = keys.validate(token)?;
        Ok(AuthUser(user_id))
    }
}
