//! Session claims read from the stored access token.
//!
//! The client only needs the payload to pick a landing screen and show who is
//! signed in. The signature is NOT verified here; the backend checks it on
//! every request.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::{normalize_roles, RawRoles};
use crate::types::Timestamp;

/// Payload of an access token issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Username.
    pub sub: String,
    #[serde(default)]
    pub role: Option<RawRoles>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub warehouse_code: Option<String>,
    #[serde(default)]
    pub site_code: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the claims of `token` without checking its signature or expiry.
pub fn decode_claims(token: &str) -> Result<TokenClaims, CoreError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token.trim(), &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode access token");
            CoreError::Unauthorized(format!("Malformed access token: {e}"))
        })
}

/// The signed-in user as shown by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub username: String,
    /// First normalised role, if any.
    pub role: Option<String>,
    pub roles: Vec<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub warehouse_code: Option<String>,
    pub site_code: Option<String>,
    pub exp: Option<i64>,
}

impl CurrentUser {
    /// Build the user from decoded claims; `None` once the token has expired.
    pub fn from_claims_at(claims: TokenClaims, now: Timestamp) -> Option<Self> {
        if claims.exp.is_some_and(|exp| exp < now.timestamp()) {
            return None;
        }

        let roles = claims.role.as_ref().map(normalize_roles).unwrap_or_default();
        let full_name = [claims.first_name.as_deref(), claims.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Some(Self {
            username: claims.sub,
            role: roles.first().cloned(),
            roles,
            first_name: claims.first_name,
            last_name: claims.last_name,
            full_name,
            warehouse_code: claims.warehouse_code,
            site_code: claims.site_code,
            exp: claims.exp,
        })
    }
}

/// Decode `token` and build the current user. `Ok(None)` means the token is
/// well-formed but expired and should be discarded.
pub fn current_user_at(token: &str, now: Timestamp) -> Result<Option<CurrentUser>, CoreError> {
    let claims = decode_claims(token)?;
    Ok(CurrentUser::from_claims_at(claims, now))
}
