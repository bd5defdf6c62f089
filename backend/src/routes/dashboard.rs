use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Dashboard Router Module
///
/// Every protected page. `create_router` applies `guard::route_guard` to this
/// router with `route_layer`, so each handler here only runs for a signed-in
/// user whose role may open the requested path, and receives that user through
/// the `AuthenticatedUser` extractor.
///
/// Routes are declared with their full `/dashboard` prefix rather than nested,
/// so the guard sees the same path the menu is keyed on.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        // GET /dashboard
        // The overview page (admin and user roles).
        .route("/dashboard", get(handlers::dashboard_home))
        // GET /dashboard/{page}
        // die-info, raw-material, maintenance, safety, notifications, profile,
        // plus the unlisted raw-materials and health-safety pages.
        .route("/dashboard/{page}", get(handlers::dashboard_page))
}
