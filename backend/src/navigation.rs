use crate::models::{NavigationItem, Role};

/// Root of the protected area and the preferred landing page.
pub const DASHBOARD_ROOT: &str = "/dashboard";

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Navigation
///
/// The ordered sidebar menu. Menu filtering and landing-page selection are both
/// derived from it on demand; it holds no per-user state.
#[derive(Debug, Clone)]
pub struct Navigation {
    items: Vec<NavigationItem>,
}

impl Navigation {
    pub fn new(items: Vec<NavigationItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[NavigationItem] {
        &self.items
    }

    /// The item whose path matches exactly, ignoring one trailing slash.
    pub fn find(&self, path: &str) -> Option<&NavigationItem> {
        let path = normalize_path(path);
        self.items.iter().find(|item| item.path == path)
    }

    /// The menu shown to `role`, in declaration order.
    pub fn menu_for(&self, role: Role) -> Vec<&NavigationItem> {
        self.items.iter().filter(|item| item.allows(role)).collect()
    }

    /// Whether `role` may open `path`. Paths without a menu entry carry no role
    /// restriction.
    pub fn permits(&self, role: Role, path: &str) -> bool {
        self.find(path).is_none_or(|item| item.allows(role))
    }

    /// landing_for
    ///
    /// The page a signed-in user is sent to after login or after hitting a page
    /// their role may not see: the dashboard root if permitted, else the first
    /// menu entry they can open. `None` when the role can open nothing.
    pub fn landing_for(&self, role: Role) -> Option<&str> {
        if self.permits(role, DASHBOARD_ROOT) {
            return Some(DASHBOARD_ROOT);
        }
        self.items
            .iter()
            .find(|item| item.allows(role))
            .map(|item| item.path.as_str())
    }
}

impl Default for Navigation {
    fn default() -> Self {
        use Role::{Admin, Employee, User};

        Self::new(vec![
            NavigationItem::new("Overview", DASHBOARD_ROOT, &[Admin, User]),
            NavigationItem::new("Die Information", "/dashboard/die-info", &[Admin, User]),
            NavigationItem::new("Raw Material Guide", "/dashboard/raw-material", &[Admin, User]),
            NavigationItem::new("Maintenance Info", "/dashboard/maintenance", &[Admin, User]),
            NavigationItem::new("Health & Safety Info", "/dashboard/safety", &[Admin, User]),
            NavigationItem::new(
                "Company Notifications",
                "/dashboard/notifications",
                &[Admin, User],
            ),
            NavigationItem::new("Profile & Info", "/dashboard/profile", &[Admin, Employee]),
        ])
    }
}

/// Strips a single trailing slash, except from the root path.
pub fn normalize_path(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    }
}
