use crate::navigation::{Navigation, normalize_path};

/// A protected page that exists behind the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub path: String,
    pub title: String,
}

/// PageCatalog
///
/// Every page under the dashboard root. Pages with a navigation entry are
/// role-restricted by that entry; the rest are open to any signed-in role.
#[derive(Debug, Clone)]
pub struct PageCatalog {
    pages: Vec<PageInfo>,
}

impl PageCatalog {
    pub fn new(pages: Vec<PageInfo>) -> Self {
        Self { pages }
    }

    pub fn find(&self, path: &str) -> Option<&PageInfo> {
        let path = normalize_path(path);
        self.pages.iter().find(|page| page.path == path)
    }

    /// Header title: the menu name if the page is in the menu, else the page's
    /// own title, else "Dashboard".
    pub fn header_title(&self, navigation: &Navigation, path: &str) -> String {
        navigation
            .find(path)
            .map(|item| item.name.clone())
            .or_else(|| self.find(path).map(|page| page.title.clone()))
            .unwrap_or_else(|| "Dashboard".to_string())
    }
}

impl Default for PageCatalog {
    fn default() -> Self {
        let page = |path: &str, title: &str| PageInfo {
            path: path.to_string(),
            title: title.to_string(),
        };

        Self::new(vec![
            page("/dashboard", "Dashboard Overview"),
            page("/dashboard/die-info", "Die Information"),
            page("/dashboard/raw-material", "Raw Material Guide"),
            page("/dashboard/raw-materials", "Raw Material Guide"),
            page("/dashboard/maintenance", "Maintenance Guide"),
            page("/dashboard/safety", "Health & Safety Information"),
            page("/dashboard/health-safety", "Health & Safety Information"),
            page("/dashboard/notifications", "Company Notifications"),
            page("/dashboard/profile", "Profile & Info"),
        ])
    }
}
