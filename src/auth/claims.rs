use serde::{Deserialize, Serialize};

/// Issuer stamped on every access token. Tokens carrying any other issuer are
/// rejected even when the signature checks out.
pub const ACCESS_TOKEN_ISSUER: &str = "chirpy-access";

/// JWT payload of an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String, // issuer
    pub sub: String, // user ID, parsed only after the signature is verified
    pub iat: i64,    // issued at (unix timestamp)
    pub exp: i64,    // expires at (unix timestamp)
}
