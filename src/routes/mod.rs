//! Route table for the dashboard: paths, the area each path belongs to, the
//! guard that protects it and the portal menus.

pub mod entry;

use crate::auth::{guards::GuardConfig, types::Role};

pub mod paths {
    pub const HOME: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const SIGNUP: &str = "/signup";
    pub const ADMIN_LOGIN: &str = "/admin-login";

    pub const CLIENT_DASHBOARD: &str = "/client/dashboard";
    pub const CLIENT_REPORTS: &str = "/client/dashboard/reports";
    pub const CLIENT_MESSAGES: &str = "/client/dashboard/messages";
    pub const CLIENT_EVENTS: &str = "/client/dashboard/events";
    pub const CLIENT_CONVERSATIONS: &str = "/client/dashboard/conversation-history";
    pub const CLIENT_SETTINGS: &str = "/client/dashboard/settings";
    pub const CLIENT_ACCOUNT: &str = "/client/dashboard/account";

    pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";
    pub const ADMIN_USERS: &str = "/admin/dashboard/users";
    pub const ADMIN_SETTINGS: &str = "/admin/dashboard/settings";

    pub(super) const CLIENT_ROOT: &str = "/client";
    pub(super) const ADMIN_ROOT: &str = "/admin";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryPage {
    Login,
    Signup,
    AdminLogin,
}

impl EntryPage {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            EntryPage::Login => paths::LOGIN,
            EntryPage::Signup => paths::SIGNUP,
            EntryPage::AdminLogin => paths::ADMIN_LOGIN,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Area {
    Landing,
    Entry(EntryPage),
    ClientPortal,
    AdminPortal,
}

impl Area {
    /// Guard for the area, or `None` for pages anyone may see.
    #[must_use]
    pub fn guard_config(self) -> Option<GuardConfig> {
        match self {
            Area::Landing | Area::Entry(_) => None,
            Area::ClientPortal => Some(GuardConfig::authenticated()),
            Area::AdminPortal => Some(GuardConfig::admin().redirect_to(paths::ADMIN_LOGIN)),
        }
    }

    /// Where a logout from this area lands.
    #[must_use]
    pub fn login_entry(self) -> EntryPage {
        match self {
            Area::AdminPortal | Area::Entry(EntryPage::AdminLogin) => EntryPage::AdminLogin,
            _ => EntryPage::Login,
        }
    }

    #[must_use]
    pub fn menu(self) -> &'static [MenuItem] {
        match self {
            Area::ClientPortal => CLIENT_MENU,
            Area::AdminPortal => ADMIN_MENU,
            Area::Landing | Area::Entry(_) => &[],
        }
    }
}

/// Classifies `path`. Query strings, fragments and trailing slashes are
/// ignored; portal prefixes match whole segments only.
#[must_use]
pub fn resolve(path: &str) -> Option<Area> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    let path = if trimmed.is_empty() { paths::HOME } else { trimmed };

    match path {
        paths::HOME => Some(Area::Landing),
        paths::LOGIN => Some(Area::Entry(EntryPage::Login)),
        paths::SIGNUP => Some(Area::Entry(EntryPage::Signup)),
        paths::ADMIN_LOGIN => Some(Area::Entry(EntryPage::AdminLogin)),
        _ if under(path, paths::CLIENT_ROOT) => Some(Area::ClientPortal),
        _ if under(path, paths::ADMIN_ROOT) => Some(Area::AdminPortal),
        _ => None,
    }
}

fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[must_use]
pub const fn dashboard_for(role: Role) -> &'static str {
    match role {
        Role::Admin => paths::ADMIN_DASHBOARD,
        Role::Client => paths::CLIENT_DASHBOARD,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub path: &'static str,
    pub label: &'static str,
}

pub const CLIENT_MENU: &[MenuItem] = &[
    MenuItem {
        path: paths::CLIENT_REPORTS,
        label: "Reports",
    },
    MenuItem {
        path: paths::CLIENT_MESSAGES,
        label: "Messages",
    },
    MenuItem {
        path: paths::CLIENT_EVENTS,
        label: "Events",
    },
    MenuItem {
        path: paths::CLIENT_CONVERSATIONS,
        label: "Conversation History",
    },
    MenuItem {
        path: paths::CLIENT_SETTINGS,
        label: "Settings",
    },
    MenuItem {
        path: paths::CLIENT_ACCOUNT,
        label: "Account",
    },
];

pub const ADMIN_MENU: &[MenuItem] = &[
    MenuItem {
        path: paths::ADMIN_DASHBOARD,
        label: "Dashboard",
    },
    MenuItem {
        path: paths::ADMIN_USERS,
        label: "Users",
    },
    MenuItem {
        path: paths::ADMIN_SETTINGS,
        label: "Settings",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_entry_pages_and_landing() {
        assert_eq!(resolve("/"), Some(Area::Landing));
        assert_eq!(resolve(""), Some(Area::Landing));
        assert_eq!(resolve("/login"), Some(Area::Entry(EntryPage::Login)));
        assert_eq!(resolve("/login/?next=x"), Some(Area::Entry(EntryPage::Login)));
        assert_eq!(
            resolve("/admin-login"),
            Some(Area::Entry(EntryPage::AdminLogin))
        );
        assert_eq!(resolve("/signup#top"), Some(Area::Entry(EntryPage::Signup)));
    }

    #[test]
    fn portal_prefixes_match_whole_segments() {
        assert_eq!(resolve(paths::CLIENT_REPORTS), Some(Area::ClientPortal));
        assert_eq!(resolve("/client"), Some(Area::ClientPortal));
        assert_eq!(resolve(paths::ADMIN_USERS), Some(Area::AdminPortal));
        assert_eq!(resolve("/administrator"), None);
        assert_eq!(resolve("/clients"), None);
        assert_eq!(resolve("/pricing"), None);
    }

    #[test]
    fn portal_guards() {
        let client = Area::ClientPortal.guard_config().unwrap_or_default();
        assert!(!client.require_admin);
        assert_eq!(client.redirect_to, paths::LOGIN);

        let admin = Area::AdminPortal.guard_config().unwrap_or_default();
        assert!(admin.require_admin);
        assert_eq!(admin.redirect_to, paths::ADMIN_LOGIN);

        assert_eq!(Area::Landing.guard_config(), None);
        assert_eq!(Area::Entry(EntryPage::Login).guard_config(), None);
    }

    #[test]
    fn logout_lands_on_matching_entry() {
        assert_eq!(Area::AdminPortal.login_entry(), EntryPage::AdminLogin);
        assert_eq!(Area::ClientPortal.login_entry(), EntryPage::Login);
    }

    #[test]
    fn dashboards_and_menus() {
        assert_eq!(dashboard_for(Role::Admin), paths::ADMIN_DASHBOARD);
        assert_eq!(dashboard_for(Role::Client), paths::CLIENT_DASHBOARD);
        assert!(
            CLIENT_MENU
                .iter()
                .all(|item| resolve(item.path) == Some(Area::ClientPortal))
        );
        assert!(
            ADMIN_MENU
                .iter()
                .all(|item| resolve(item.path) == Some(Area::AdminPortal))
        );
        assert_eq!(Area::AdminPortal.menu().len(), 3);
    }
}
