use chrono::{TimeDelta, Utc};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    error::{AuthError, SessionError},
    models::{Role, SessionView},
    storage::StorageState,
};

// Storage keys for the three session fields.
pub const AUTHENTICATED_KEY: &str = "authenticated";
pub const EMAIL_KEY: &str = "user_email";
pub const ROLE_KEY: &str = "user_role";

/// Session
///
/// The resolved state of one client session. An authenticated session always
/// carries both an email and a role; anything less is `Anonymous`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { email: String, role: Role },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Session::Authenticated { role, .. } => Some(*role),
            Session::Anonymous => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Session::Authenticated { email, .. } => Some(email),
            Session::Anonymous => None,
        }
    }

    pub fn view(&self) -> SessionView {
        match self {
            Session::Anonymous => SessionView::default(),
            Session::Authenticated { email, role } => SessionView {
                authenticated: true,
                email: Some(email.clone()),
                role: Some(*role),
            },
        }
    }
}

struct Credential {
    password: String,
    role: Role,
}

/// CredentialTable
///
/// Static email -> (password, role) table standing in for an identity provider.
/// Passwords are compared in plain text: demo accounts only.
pub struct CredentialTable {
    entries: HashMap<String, Credential>,
}

impl CredentialTable {
    /// An empty table. Nobody can log in until users are added.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with_user(mut self, email: &str, password: &str, role: Role) -> Self {
        self.entries.insert(
            email.to_string(),
            Credential {
                password: password.to_string(),
                role,
            },
        );
        self
    }

    /// Returns the recorded role when the email exists and the password matches.
    pub fn verify(&self, email: &str, password: &str) -> Option<Role> {
        self.entries
            .get(email)
            .filter(|credential| credential.password == password)
            .map(|credential| credential.role)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CredentialTable {
    /// The two demo accounts shown on the login screen.
    fn default() -> Self {
        Self::empty()
            .with_user("admin@company.com", "admin123", Role::Admin)
            .with_user("employee@company.com", "employee123", Role::Employee)
    }
}

/// SessionService
///
/// The injectable session context: `login`, `logout` and `current`, each scoped
/// to one session id. All parsing of stored values happens here, and every read
/// fails closed.
pub struct SessionService {
    storage: StorageState,
    credentials: CredentialTable,
}

/// SessionState
///
/// The shared handle placed in `AppState`.
pub type SessionState = Arc<SessionService>;

impl SessionService {
    pub fn new(storage: StorageState, credentials: CredentialTable) -> Self {
        Self {
            storage,
            credentials,
        }
    }

    /// login
    ///
    /// Checks the credentials and, on success, records the session. On failure
    /// the stored session is left exactly as it was.
    pub async fn login(
        &self,
        session_id: Uuid,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let Some(role) = self.credentials.verify(email, password) else {
            tracing::info!(%session_id, "login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        // The flag is written last so a concurrent reader never sees it without a role.
        self.storage
            .set_item(session_id, EMAIL_KEY, email.to_string())
            .await;
        self.storage
            .set_item(session_id, ROLE_KEY, role.as_str().to_string())
            .await;
        self.storage
            .set_item(session_id, AUTHENTICATED_KEY, "true".to_string())
            .await;

        tracing::info!(%session_id, %role, "login succeeded");

        Ok(Session::Authenticated {
            email: email.to_string(),
            role,
        })
    }

    /// logout
    ///
    /// Clears all three fields. Idempotent.
    pub async fn logout(&self, session_id: Uuid) {
        // Flag first: a partially cleared session must already read as anonymous.
        self.storage.remove_item(session_id, AUTHENTICATED_KEY).await;
        self.storage.remove_item(session_id, EMAIL_KEY).await;
        self.storage.remove_item(session_id, ROLE_KEY).await;

        tracing::debug!(%session_id, "session cleared");
    }

    /// current
    ///
    /// Never fails: a missing or unreadable session is `Anonymous`.
    pub async fn current(&self, session_id: Uuid) -> Session {
        match self.read(session_id).await {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!(%session_id, error = %e, "unreadable session treated as anonymous");
                Session::Anonymous
            }
        }
    }

    /// purge_expired
    ///
    /// Drops every session last written more than `max_age` ago and returns how
    /// many were dropped.
    pub async fn purge_expired(&self, max_age: TimeDelta) -> usize {
        match Utc::now().checked_sub_signed(max_age) {
            Some(cutoff) => self.storage.purge_before(cutoff).await,
            None => 0,
        }
    }

    async fn read(&self, session_id: Uuid) -> Result<Session, SessionError> {
        let flag = self.storage.get_item(session_id, AUTHENTICATED_KEY).await;
        match flag.as_deref() {
            None | Some("false") => return Ok(Session::Anonymous),
            Some("true") => {}
            Some(other) => {
                return Err(SessionError::Corrupt {
                    field: AUTHENTICATED_KEY,
                    value: other.to_string(),
                });
            }
        }

        let email = self
            .storage
            .get_item(session_id, EMAIL_KEY)
            .await
            .filter(|email| !email.is_empty())
            .ok_or(SessionError::Missing { field: EMAIL_KEY })?;

        let raw_role = self
            .storage
            .get_item(session_id, ROLE_KEY)
            .await
            .ok_or(SessionError::Missing { field: ROLE_KEY })?;

        let role = raw_role.parse::<Role>().map_err(|_| SessionError::Corrupt {
            field: ROLE_KEY,
            value: raw_role.clone(),
        })?;

        Ok(Session::Authenticated { email, role })
    }
}

/// spawn_session_sweeper
///
/// Background task that purges sessions older than `max_age` every `period`.
/// `max_age` must not be shorter than a token's lifetime, or live sessions go too.
pub fn spawn_session_sweeper(
    sessions: SessionState,
    max_age: TimeDelta,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired(max_age).await;
            if purged > 0 {
                tracing::debug!(purged, "expired sessions swept");
            }
        }
    })
}
