use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, header, request::Parts},
};
use accord_dashboard::{
    AppState,
    auth::{
        Claims, CurrentSession, SESSION_COOKIE_NAME, SESSION_ID_HEADER, decode_session_token,
        issue_session_token,
    },
    config::{AppConfig, Env},
    error::TokenError,
    models::Role,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::time::SystemTime;
use uuid::Uuid;

// --- Helper Functions ---

const TEST_SESSION_SECRET: &str = "test-secret-value-1234567890";

fn create_app_state(env: Env) -> AppState {
    let mut config = AppConfig::default();
    config.env = env;
    config.session_secret = TEST_SESSION_SECRET.to_string();
    AppState::in_memory(config)
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn expired_token(session_id: Uuid) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let claims = Claims {
        sub: session_id,
        iat: (now - 7200) as usize,
        exp: (now - 3600) as usize,
    };

    let key = EncodingKey::from_secret(TEST_SESSION_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

async fn signed_in_admin(state: &AppState) -> (Uuid, String) {
    let sid = Uuid::new_v4();
    state
        .sessions
        .login(sid, "admin@company.com", "admin123")
        .await
        .unwrap();
    let token = issue_session_token(sid, &state.config).unwrap();
    (sid, token)
}

// --- Token Tests ---

#[test]
fn test_token_round_trip_and_wrong_secret() {
    let config = create_app_state(Env::Production).config;
    let sid = Uuid::new_v4();
    let token = issue_session_token(sid, &config).unwrap();

    assert_eq!(decode_session_token(&token, &config), Some(sid));

    let mut other = config.clone();
    other.session_secret = "a-different-secret".to_string();
    assert_eq!(decode_session_token(&token, &other), None);
}

#[test]
fn test_expired_token_is_rejected() {
    let config = create_app_state(Env::Production).config;
    assert_eq!(decode_session_token(&expired_token(Uuid::new_v4()), &config), None);
}

#[test]
fn test_unrepresentable_ttl_is_an_error() {
    let sid = Uuid::new_v4();
    for hours in [10_000_000_000, i64::MAX, 0, -1] {
        let mut config = create_app_state(Env::Production).config;
        config.session_ttl_hours = hours;

        let result = issue_session_token(sid, &config);
        assert!(
            matches!(result, Err(TokenError::ExpiryOutOfRange { hours: h }) if h == hours),
            "ttl {hours}"
        );
    }
}

// --- Extractor Tests ---

#[tokio::test]
async fn test_current_session_with_bearer_token() {
    let state = create_app_state(Env::Production);
    let (sid, token) = signed_in_admin(&state).await;

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let current = CurrentSession::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(current.id, Some(sid));
    assert_eq!(current.session.role(), Some(Role::Admin));
}

#[tokio::test]
async fn test_current_session_with_cookie() {
    let state = create_app_state(Env::Production);
    let (sid, token) = signed_in_admin(&state).await;

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::COOKIE,
        header::HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE_NAME}={token}"))
            .unwrap(),
    );

    let current = CurrentSession::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(current.id, Some(sid));
    assert!(current.session.is_authenticated());
}

#[tokio::test]
async fn test_current_session_without_credentials_is_anonymous() {
    let state = create_app_state(Env::Production);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let current = CurrentSession::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(current.id, None);
    assert!(!current.session.is_authenticated());
}

#[tokio::test]
async fn test_tampered_token_is_anonymous() {
    let state = create_app_state(Env::Production);
    let (_, token) = signed_in_admin(&state).await;
    let tampered = format!("{}x", token);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", tampered)).unwrap(),
    );

    let current = CurrentSession::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(current.id, None);
    assert!(!current.session.is_authenticated());
}

#[tokio::test]
async fn test_valid_token_after_logout_is_anonymous() {
    let state = create_app_state(Env::Production);
    let (sid, token) = signed_in_admin(&state).await;
    state.sessions.logout(sid).await;

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let current = CurrentSession::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    // The id is still recognised, but the store no longer holds a session for it.
    assert_eq!(current.id, Some(sid));
    assert!(!current.session.is_authenticated());
}

#[tokio::test]
async fn test_local_bypass_success() {
    let state = create_app_state(Env::Local);
    let (sid, _) = signed_in_admin(&state).await;

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static(SESSION_ID_HEADER),
        header::HeaderValue::from_str(&sid.to_string()).unwrap(),
    );

    let current = CurrentSession::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(current.id, Some(sid));
    assert_eq!(current.session.role(), Some(Role::Admin));
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let state = create_app_state(Env::Production);
    let (sid, _) = signed_in_admin(&state).await;

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    // Provide ONLY the local bypass header
    parts.headers.insert(
        header::HeaderName::from_static(SESSION_ID_HEADER),
        header::HeaderValue::from_str(&sid.to_string()).unwrap(),
    );

    let current = CurrentSession::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(current.id, None);
    assert!(!current.session.is_authenticated());
}
