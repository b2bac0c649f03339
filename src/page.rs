use std::fmt;

/// Top-level console pages. Each maps to exactly one initializer in
/// `routes::ui`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Dashboard,
    Containers,
    Nodes,
    Alerts,
    Events,
    Logs,
    Monitoring,
    Admin,
}

impl Page {
    pub const ALL: [Page; 9] = [
        Page::Home,
        Page::Dashboard,
        Page::Containers,
        Page::Nodes,
        Page::Alerts,
        Page::Events,
        Page::Logs,
        Page::Monitoring,
        Page::Admin,
    ];

    /// Resolve the first path segment, with or without a leading slash.
    pub fn from_path(path: &str) -> Option<Self> {
        let seg = path.trim_start_matches('/').split('/').next().unwrap_or("");
        Self::ALL.into_iter().find(|p| p.slug() == seg)
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Dashboard => "dashboard",
            Page::Containers => "containers",
            Page::Nodes => "nodes",
            Page::Alerts => "alerts",
            Page::Events => "events",
            Page::Logs => "logs",
            Page::Monitoring => "monitoring",
            Page::Admin => "admin",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Dashboard => "Dashboard",
            Page::Containers => "Containers",
            Page::Nodes => "Nodes",
            Page::Alerts => "Alerts",
            Page::Events => "Events",
            Page::Logs => "Logs",
            Page::Monitoring => "Monitoring",
            Page::Admin => "Administration",
        }
    }

    pub fn href(&self) -> String {
        format!("/{}", self.slug())
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_from_path() {
        assert_eq!(Page::from_path("/alerts"), Some(Page::Alerts));
        assert_eq!(Page::from_path("monitoring"), Some(Page::Monitoring));
        assert_eq!(Page::from_path("/containers/abc"), Some(Page::Containers));
        assert_eq!(Page::from_path("/"), None);
        assert_eq!(Page::from_path("/settings"), None);
        for p in Page::ALL {
            assert_eq!(Page::from_path(&p.href()), Some(p));
        }
    }
}
