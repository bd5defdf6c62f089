use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Access Control Schemas ---

/// Role
///
/// The closed set of roles a signed-in user can hold. Every navigation and page
/// permission is expressed in terms of this enum, so an unknown role string can
/// never grant (or silently deny) access: it fails to parse instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Employee,
    User,
}

impl Role {
    /// The wire/storage form of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored or submitted role string is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            "user" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// NavigationItem
///
/// A sidebar menu entry paired with the roles allowed to open its page.
/// Defined once at startup (see `navigation::Navigation::default`) and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigationItem {
    pub name: String,
    pub path: String,
    pub allowed_roles: Vec<Role>,
}

impl NavigationItem {
    pub fn new(name: &str, path: &str, allowed_roles: &[Role]) -> Self {
        let mut roles = Vec::with_capacity(allowed_roles.len());
        for role in allowed_roles {
            if !roles.contains(role) {
                roles.push(*role);
            }
        }
        Self {
            name: name.to_string(),
            path: path.to_string(),
            allowed_roles: roles,
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Input payload for `POST /login`. Credentials are compared in plain text against
/// the static credential table; this is demo data only.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "admin@company.com")]
    pub email: String,
    #[schema(example = "admin123")]
    pub password: String,
}

// --- Response Schemas (Output) ---

/// SessionView
///
/// The serialized view of a session. `email` and `role` are present only when
/// `authenticated` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionView {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// LoginResponse
///
/// Returned by a successful `POST /login`. The same token is also set as the
/// session cookie; `redirect_to` is the landing page for the signed-in role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub session: SessionView,
    pub token: String,
    pub redirect_to: String,
}

/// LoginPrompt
///
/// Body of `GET /login` for visitors without a session.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginPrompt {
    pub message: String,
    pub action: String,
}

/// UserSummary
///
/// The header badge of the dashboard shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserSummary {
    pub email: String,
    pub initials: String,
    pub role: Role,
}

/// DashboardView
///
/// The dashboard shell rendered around every protected page: header title,
/// signed-in user and the role-filtered menu.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DashboardView {
    pub title: String,
    pub path: String,
    pub user: UserSummary,
    pub menu: Vec<NavigationItem>,
}

/// ErrorResponse
///
/// Inline, user-visible error text (e.g. "Invalid credentials").
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}
