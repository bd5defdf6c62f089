use crate::{
    AppState,
    auth::{
        AuthenticatedUser, CurrentSession, clear_session_cookie, issue_session_token,
        session_cookie,
    },
    error::AppError,
    models::{
        DashboardView, ErrorResponse, LoginPrompt, LoginRequest, LoginResponse, NavigationItem,
        SessionView, UserSummary,
    },
    navigation::{DASHBOARD_ROOT, LOGIN_PATH},
};
use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

// --- Public Handlers ---

/// login_page
///
/// [Public Route] The login prompt. A visitor who is already signed in is sent
/// straight to their landing page instead.
#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login prompt", body = LoginPrompt),
        (status = 303, description = "Already signed in")
    )
)]
pub async fn login_page(
    State(state): State<AppState>,
    CurrentSession { session, .. }: CurrentSession,
) -> Response {
    if let Some(landing) = session
        .role()
        .and_then(|role| state.navigation.landing_for(role))
    {
        return Redirect::to(landing).into_response();
    }

    Json(LoginPrompt {
        message: "Sign in to your account to continue".to_string(),
        action: LOGIN_PATH.to_string(),
    })
    .into_response()
}

/// login
///
/// [Public Route] Validates the credentials against the credential table.
///
/// On success the session is stored under the caller's existing session id (or
/// a fresh one), and the signed token is returned both in the body and as the
/// session cookie. On failure the caller's session is left untouched.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Session token could not be signed", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    CurrentSession { id, .. }: CurrentSession,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let session_id = id.unwrap_or_else(Uuid::new_v4);

    // Signed before the store is touched, so a signing failure leaves no session behind.
    let token = issue_session_token(session_id, &state.config)
        .map_err(|e| AppError::Internal(format!("failed to sign session token: {e}")))?;

    let session = state
        .sessions
        .login(session_id, &payload.email, &payload.password)
        .await?;

    let redirect_to = session
        .role()
        .and_then(|role| state.navigation.landing_for(role))
        .unwrap_or(DASHBOARD_ROOT)
        .to_string();

    let cookie = session_cookie(&token, &state.config);
    let body = LoginResponse {
        session: session.view(),
        token,
        redirect_to,
    };

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// logout
///
/// [Public Route] Clears the caller's session, expires the cookie and redirects
/// to the login screen. Safe to call with no session or repeatedly.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 303, description = "Signed out, redirect to /login"))
)]
pub async fn logout(
    State(state): State<AppState>,
    CurrentSession { id, .. }: CurrentSession,
) -> Response {
    if let Some(session_id) = id {
        state.sessions.logout(session_id).await;
    }

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}

/// get_session
///
/// [Public Route] The caller's current session. Always succeeds.
#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Current session", body = SessionView))
)]
pub async fn get_session(CurrentSession { session, .. }: CurrentSession) -> Json<SessionView> {
    Json(session.view())
}

/// get_navigation
///
/// [Public Route] The menu the caller may see; empty without a session.
#[utoipa::path(
    get,
    path = "/api/navigation",
    responses((status = 200, description = "Role-filtered menu", body = [NavigationItem]))
)]
pub async fn get_navigation(
    State(state): State<AppState>,
    CurrentSession { session, .. }: CurrentSession,
) -> Json<Vec<NavigationItem>> {
    let menu = session
        .role()
        .map(|role| {
            state
                .navigation
                .menu_for(role)
                .into_iter()
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    Json(menu)
}

// --- Guarded Handlers ---

/// dashboard_home
///
/// [Guarded Route] The dashboard overview.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard shell", body = DashboardView),
        (status = 303, description = "Redirected by the route guard")
    )
)]
pub async fn dashboard_home(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardView>, AppError> {
    render_page(&state, user, DASHBOARD_ROOT)
}

/// dashboard_page
///
/// [Guarded Route] Any page below the dashboard root. The guard has already
/// checked the role; pages unknown to the catalogue are 404.
#[utoipa::path(
    get,
    path = "/dashboard/{page}",
    params(("page" = String, Path, description = "Page slug, e.g. die-info")),
    responses(
        (status = 200, description = "Dashboard shell", body = DashboardView),
        (status = 303, description = "Redirected by the route guard"),
        (status = 404, description = "No such page", body = ErrorResponse)
    )
)]
pub async fn dashboard_page(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Json<DashboardView>, AppError> {
    let path = format!("{DASHBOARD_ROOT}/{page}");
    render_page(&state, user, &path)
}

fn render_page(
    state: &AppState,
    user: AuthenticatedUser,
    path: &str,
) -> Result<Json<DashboardView>, AppError> {
    let page = state
        .pages
        .find(path)
        .ok_or_else(|| AppError::NotFound(path.to_string()))?;

    let menu = state
        .navigation
        .menu_for(user.role)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(DashboardView {
        title: state.pages.header_title(&state.navigation, &page.path),
        path: page.path.clone(),
        user: UserSummary {
            initials: user.initials(),
            email: user.email,
            role: user.role,
        },
        menu,
    }))
}
