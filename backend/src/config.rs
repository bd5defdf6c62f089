use chrono::TimeDelta;
use std::env;

/// Fallback session secret for local development and tests.
pub const LOCAL_SESSION_SECRET: &str = "local-dashboard-session-secret";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

// Matches the default `exp` leeway of the token validator.
const TOKEN_LEEWAY_SECONDS: i64 = 60;

/// Upper bound on `SESSION_TTL_HOURS`: one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

/// AppConfig
///
/// Immutable configuration loaded once at startup and shared through
/// `FromRef<AppState>`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local session bypass and log format.
    pub env: Env,
    // Address the HTTP server binds to.
    pub bind_addr: String,
    // HMAC secret for signing session tokens.
    pub session_secret: String,
    // Lifetime of an issued session token, in hours.
    pub session_ttl_hours: i64,
}

/// Env
///
/// Runtime context: local development (pretty logs, session-id bypass) or
/// production (JSON logs, mandatory secret, secure cookies).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe values for tests; reads no environment variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from the environment.
    ///
    /// # Panics
    /// Panics in production when `SESSION_SECRET` is not set, and in any
    /// environment when `SESSION_TTL_HOURS` is set but is not an integer in
    /// `1..=MAX_SESSION_TTL_HOURS`.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let session_secret = match env {
            Env::Production => env::var("SESSION_SECRET")
                .expect("FATAL: SESSION_SECRET must be set in production."),
            Env::Local => {
                env::var("SESSION_SECRET").unwrap_or_else(|_| LOCAL_SESSION_SECRET.to_string())
            }
        };

        let session_ttl_hours = match env::var("SESSION_TTL_HOURS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|hours| (1..=MAX_SESSION_TTL_HOURS).contains(hours))
                .unwrap_or_else(|| {
                    panic!(
                        "FATAL: SESSION_TTL_HOURS must be an integer between 1 and {MAX_SESSION_TTL_HOURS}."
                    )
                }),
            Err(_) => DEFAULT_SESSION_TTL_HOURS,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Self {
            env,
            bind_addr,
            session_secret,
            session_ttl_hours,
        }
    }

    /// How long a stored session can still be reached by a token: the TTL plus
    /// the validator's leeway.
    pub fn session_max_age(&self) -> TimeDelta {
        TimeDelta::try_hours(self.session_ttl_hours)
            .and_then(|ttl| ttl.checked_add(&TimeDelta::seconds(TOKEN_LEEWAY_SECONDS)))
            .unwrap_or(TimeDelta::MAX)
    }
}
