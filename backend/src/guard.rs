//! The route guard: one decision per protected request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    auth::{AuthenticatedUser, CurrentSession},
    models::Role,
    navigation::{LOGIN_PATH, Navigation},
    session::Session,
};

/// GuardDecision
///
/// Terminal state of one guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the requested page for this user.
    Allow(AuthenticatedUser),
    /// No usable session: go to the login screen.
    Deny,
    /// Signed in, but the role may not open this page: go to `target`.
    Redirect { target: String, role: Role },
}

/// evaluate
///
/// Pure decision function. Anonymous sessions are denied whatever the path; a
/// signed-in user is allowed unless the path has a menu entry that excludes
/// their role.
pub fn evaluate(session: &Session, path: &str, navigation: &Navigation) -> GuardDecision {
    let Session::Authenticated { email, role } = session else {
        return GuardDecision::Deny;
    };
    let role = *role;

    if navigation.permits(role, path) {
        return GuardDecision::Allow(AuthenticatedUser {
            email: email.clone(),
            role,
        });
    }

    match navigation.landing_for(role) {
        Some(target) => GuardDecision::Redirect {
            target: target.to_string(),
            role,
        },
        // A role that can open nothing gets nothing.
        None => GuardDecision::Deny,
    }
}

/// route_guard
///
/// Middleware applied with `route_layer` to the whole protected router, so it
/// runs before any page handler. On `Allow` the resolved user is inserted into
/// the request extensions for the `AuthenticatedUser` extractor.
pub async fn route_guard(
    State(state): State<AppState>,
    CurrentSession { session, .. }: CurrentSession,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match evaluate(&session, &path, &state.navigation) {
        GuardDecision::Allow(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        GuardDecision::Deny => {
            tracing::debug!(%path, "no session, redirecting to login");
            Redirect::to(LOGIN_PATH).into_response()
        }
        GuardDecision::Redirect { target, role } => {
            tracing::info!(%path, %role, %target, "role not permitted, redirecting");
            Redirect::to(&target).into_response()
        }
    }
}
