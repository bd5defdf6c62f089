use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, Uri},
    middleware,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::{
    Layer, ServiceBuilder,
    util::{MapRequest, MapRequestLayer},
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Session layer: storage medium, session context, token handling.
pub mod auth;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;

// Access control and the pages it protects.
pub mod guard;
pub mod navigation;
pub mod pages;

pub mod handlers;
pub mod models;

// Module for routing segregation (Public, Dashboard).
pub mod routes;
use routes::{dashboard, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use navigation::Navigation;
pub use pages::PageCatalog;
pub use session::{CredentialTable, SessionService, SessionState};
pub use storage::{MemorySessionStorage, StorageState};

/// ApiDoc
///
/// OpenAPI document for every public and guarded endpoint, served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login_page, handlers::login, handlers::logout,
        handlers::get_session, handlers::get_navigation,
        handlers::dashboard_home, handlers::dashboard_page
    ),
    components(
        schemas(
            models::Role, models::NavigationItem, models::LoginRequest,
            models::LoginResponse, models::LoginPrompt, models::SessionView,
            models::UserSummary, models::DashboardView, models::ErrorResponse,
        )
    ),
    tags(
        (name = "accord-dashboard", description = "Plant dashboard session and navigation API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request needs, shared by all requests. Navigation and the page
/// catalogue are immutable after startup; the session service owns the only
/// mutable state.
#[derive(Clone)]
pub struct AppState {
    /// Session context over the injected storage medium.
    pub sessions: SessionState,
    /// Static sidebar menu with per-item role sets.
    pub navigation: Arc<Navigation>,
    /// Static list of protected pages.
    pub pages: Arc<PageCatalog>,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

impl AppState {
    /// State with in-memory session storage, the demo credential table and the
    /// default menu.
    pub fn in_memory(config: AppConfig) -> Self {
        let storage = Arc::new(MemorySessionStorage::new()) as StorageState;
        Self {
            sessions: Arc::new(SessionService::new(storage, CredentialTable::default())),
            navigation: Arc::new(Navigation::default()),
            pages: Arc::new(PageCatalog::default()),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routes, applies the route guard to the dashboard router and
/// wraps everything in the observability stack.
/// The served application: the router behind dashboard path normalisation.
///
/// The rewrite wraps the `Router` because layers added with `Router::layer` only
/// run once a route has matched.
pub type App = MapRequest<Router, fn(Request) -> Request>;

pub fn create_router(state: AppState) -> App {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Dashboard Routes: every one of them passes the route guard first.
        .merge(
            dashboard::dashboard_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                guard::route_guard,
            )),
        )
        .with_state(state);

    let router = base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors);

    let normalize: fn(Request) -> Request = normalize_dashboard_uri;
    MapRequestLayer::new(normalize).layer(router)
}

/// Drops trailing slashes from dashboard paths before routing, keeping the query.
///
/// Other paths are left alone: the Swagger UI redirects `/swagger-ui` to
/// `/swagger-ui/` and would loop.
fn normalize_dashboard_uri(mut request: Request) -> Request {
    let path = request.uri().path();
    if !path.starts_with(navigation::DASHBOARD_ROOT) {
        return request;
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.len() == path.len() {
        return request;
    }

    let mut target = trimmed.to_string();
    if let Some(query) = request.uri().query() {
        target.push('?');
        target.push_str(query);
    }
    match target.parse::<Uri>() {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => tracing::debug!(error = %e, "dashboard path left unnormalised"),
    }
    request
}

/// trace_span_logger
///
/// Per-request span carrying method, URI and the `x-request-id` header so every
/// log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
