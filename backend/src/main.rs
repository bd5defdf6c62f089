use accord_dashboard::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    session::spawn_session_sweeper,
};
use axum::{ServiceExt, extract::Request};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// main
///
/// Loads configuration, installs logging, builds the in-memory session store
/// and serves the dashboard.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging filter: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "accord_dashboard=debug,tower_http=info".into());

    // 3. Pretty output locally, JSON in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    let bind_addr = config.bind_addr.clone();
    let session_max_age = config.session_max_age();

    // 4. State: in-memory sessions, demo credentials, default menu.
    let app_state = AppState::in_memory(config);
    spawn_session_sweeper(app_state.sessions.clone(), session_max_age, SESSION_SWEEP_PERIOD);
    let app = create_router(app_state);

    // 5. Server.
    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: failed to bind {bind_addr}: {e}"));

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await {
        tracing::error!(error = %e, "server terminated");
    }
}
