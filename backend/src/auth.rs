use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{AppConfig, Env};

/// Name of the cookie the browser front end keeps the session token in.
pub const SESSION_COOKIE: &str = "token";

/// Claims
///
/// The payload expected inside a session JWT. Tokens are issued by the external
/// identity service; this service only verifies them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the actor's UUID.
    pub sub: Uuid,
    /// The actor's role. Looked up in the role policy table on every navigation.
    pub role: String,
    /// Expiration Time (exp): always validated.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of a request carrying a valid session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: String,
}

impl AuthUser {
    /// resolve
    ///
    /// Resolves the actor behind a request, or `None` when no valid session is present.
    /// An expired, forged or malformed token counts as no session at all.
    ///
    /// In `Env::Local` the `x-user-id` + `x-user-role` headers are accepted in place of a
    /// token so the front end can be exercised without the identity service.
    pub fn resolve(headers: &HeaderMap, config: &AppConfig) -> Option<AuthUser> {
        if config.env == Env::Local {
            if let Some(user) = local_bypass(headers) {
                return Some(user);
            }
        }

        let token = session_token(headers)?;
        let claims = decode_claims(token, &config.jwt_secret)?;

        Some(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

/// AuthUser Extractor Implementation
///
/// Makes AuthUser usable as a handler argument on authenticated routes. Rejects with
/// 401 Unauthorized when [`AuthUser::resolve`] finds no valid session.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        AuthUser::resolve(&parts.headers, &config).ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Token sources in priority order: `Authorization: Bearer`, then the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if let Some(token) = bearer {
        return Some(token.trim());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

/// decode_claims
///
/// Verifies signature and expiry. Every failure collapses to `None`; the kind is only logged.
pub fn decode_claims(token: &str, secret: &str) -> Option<Claims> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                kind => tracing::debug!(?kind, "session token rejected"),
            }
            None
        }
    }
}

fn local_bypass(headers: &HeaderMap) -> Option<AuthUser> {
    let id = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())?;
    let role = headers
        .get("x-user-role")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())?;

    Some(AuthUser {
        id,
        role: role.to_string(),
    })
}
