use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Public Router Module
///
/// Endpoints reachable without a session. None of them render protected
/// content: they either manage the session or describe it.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check.
        .route("/health", get(|| async { "ok" }))
        // GET /login, POST /login
        // Login prompt and credential check. A successful POST sets the session cookie.
        .route("/login", get(handlers::login_page).post(handlers::login))
        // POST /logout (GET accepted for plain links)
        // Clears the session and redirects to /login. Idempotent.
        .route("/logout", get(handlers::logout).post(handlers::logout))
        // GET /api/session
        // The caller's session view; `{ "authenticated": false }` when there is none.
        .route("/api/session", get(handlers::get_session))
        // GET /api/navigation
        // The role-filtered menu for the caller.
        .route("/api/navigation", get(handlers::get_navigation))
}
