use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::TokenError,
    models::Role,
    navigation::LOGIN_PATH,
    session::{Session, SessionState},
};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "dashboard_session";

/// Local-only header naming a session id directly, without a token.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Claims
///
/// Payload of the session token. The token carries only the session id; the
/// email and role live in the session store, so logout takes effect at once
/// even if the client keeps the token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the session id.
    pub sub: Uuid,
    /// Expiration Time (exp).
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// Signs a session token for `session_id`, valid for the configured TTL.
///
/// A TTL whose expiry cannot be represented is an error, never a panic.
pub fn issue_session_token(session_id: Uuid, config: &AppConfig) -> Result<String, TokenError> {
    let hours = config.session_ttl_hours;
    let now = Utc::now();
    let expires_at = TimeDelta::try_hours(hours)
        .filter(|ttl| *ttl > TimeDelta::zero())
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or(TokenError::ExpiryOutOfRange { hours })?;

    let claims = Claims {
        sub: session_id,
        iat: now.timestamp().max(0) as usize,
        exp: expires_at.timestamp().max(0) as usize,
    };

    let key = EncodingKey::from_secret(config.session_secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

/// Verifies a session token and returns its session id. Any failure (bad
/// signature, expired, malformed) yields `None`.
pub fn decode_session_token(token: &str, config: &AppConfig) -> Option<Uuid> {
    let key = DecodingKey::from_secret(config.session_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &key, &validation) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                _ => tracing::debug!(error = %e, "session token rejected"),
            }
            None
        }
    }
}

/// `Set-Cookie` value installing the session token. No `Max-Age`: the cookie
/// lives as long as the browser session.
pub fn session_cookie(token: &str, config: &AppConfig) -> String {
    let secure = if config.env == Env::Production {
        "; Secure"
    } else {
        ""
    };
    format!("{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax{secure}")
}

/// `Set-Cookie` value expiring the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE_NAME}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Resolves the session id of a request.
///
/// Order: the local `x-session-id` bypass (Env::Local only), then a bearer
/// token, then the session cookie.
pub fn resolve_session_id(parts: &Parts, config: &AppConfig) -> Option<Uuid> {
    if config.env == Env::Local {
        if let Some(id) = parts
            .headers
            .get(SESSION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
        {
            return Some(id);
        }
    }

    // A present but invalid bearer token does not fall back to the cookie.
    if let Some(token) = bearer_token(parts) {
        return decode_session_token(token, config);
    }

    cookie_value(parts, SESSION_COOKIE_NAME).and_then(|token| decode_session_token(token, config))
}

/// CurrentSession
///
/// Extractor yielding the caller's session id (if the request carries a valid
/// one) and the session read from the store. Never rejects: everything that
/// goes wrong reads as `Session::Anonymous`.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: Option<Uuid>,
    pub session: Session,
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    SessionState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let id = resolve_session_id(parts, &config);
        let session = match id {
            Some(id) => sessions.current(id).await,
            None => Session::Anonymous,
        };

        Ok(CurrentSession { id, session })
    }
}

/// AuthenticatedUser
///
/// The identity the route guard resolved for this request. Page handlers take
/// it as an argument; it exists only on requests the guard allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Two upper-cased characters from the email's local part.
    pub fn initials(&self) -> String {
        self.email
            .split('@')
            .next()
            .unwrap_or_default()
            .chars()
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

/// Rejection for a page handler reached without the guard's identity.
#[derive(Debug)]
pub struct MissingSession;

impl IntoResponse for MissingSession {
    fn into_response(self) -> Response {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = MissingSession;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(MissingSession)
    }
}
