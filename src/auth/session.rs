use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use worker::Result;

use crate::config::Config;
use crate::models::SessionUser;

/// Claims carried by the session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Google account id
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl From<SessionClaims> for SessionUser {
    fn from(claims: SessionClaims) -> Self {
        SessionUser {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            image: claims.picture,
            expires_at: claims.exp,
        }
    }
}

/// Sign the claims into a compact HS256 token
pub fn encode_session(claims: &SessionClaims, secret: &str) -> Result<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| worker::Error::RustError(format!("failed to sign session: {}", e)))
}

/// Verify a session token.
///
/// Returns `None` for anything that is not a well-signed, unexpired token.
/// Expiry is checked against `now` (unix seconds) rather than the library
/// clock, which is unavailable inside the worker.
pub fn decode_session(token: &str, secret: &str, now: i64) -> Option<SessionClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    let claims = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .ok()?
    .claims;

    (claims.exp > now).then_some(claims)
}

/// Current wall clock in unix seconds
pub fn now_seconds() -> i64 {
    (js_sys::Date::now() / 1000.0) as i64
}

/// Find a cookie value in a `Cookie` header
pub fn read_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value storing `value` under `name`
pub fn set_cookie(config: &Config, name: &str, value: &str, max_age_seconds: i64) -> String {
    format!(
        "{}={}; {}; Max-Age={}",
        name,
        value,
        config.cookie_attributes(),
        max_age_seconds
    )
}

/// `Set-Cookie` value deleting the cookie `name`
pub fn clear_cookie(config: &Config, name: &str) -> String {
    set_cookie(config, name, "", 0)
}

/// Restrict a post-login or post-logout target to a same-origin path.
pub fn sanitize_callback(target: Option<&str>, fallback: &'static str) -> String {
    match target {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => fallback.to_string(),
    }
}

// Browsers drop tabs and newlines from a Location value, so "/\t/host" would
// become the protocol-relative "//host".
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path
            .chars()
            .any(|c| c == '\\' || c.is_control() || c.is_whitespace())
}
