//! Role-gated route table of the console front end.

use std::fmt;

use crate::session::{Session, SessionRole};

/// Login page.
pub const LOGIN_PATH: &str = "/login";
/// Operator console.
pub const OPERATOR_PATH: &str = "/operator";
/// Admin dashboard root.
pub const ADMIN_PATH: &str = "/admin";
/// Default admin page.
pub const ADMIN_USERS_PATH: &str = "/admin/users";

/// Pages of the admin dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminPage {
    /// User management.
    Users,
    /// Access log listing.
    Accesses,
    /// Reports.
    Reports,
    /// Settings.
    Settings,
}

/// Something a route can render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    /// Profile picker.
    Login,
    /// Operator console.
    OperatorConsole,
    /// An admin dashboard page.
    Admin(AdminPage),
    /// Unknown path.
    NotFound,
}

/// Result of resolving a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// Show this view.
    Render(View),
    /// Go to another path instead.
    Redirect(&'static str),
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redirect(path) => write!(f, "redirect {path}"),
            Self::Render(View::Login) => f.write_str("render login"),
            Self::Render(View::OperatorConsole) => f.write_str("render operator console"),
            Self::Render(View::Admin(page)) => write!(f, "render admin {page:?}"),
            Self::Render(View::NotFound) => f.write_str("render not found"),
        }
    }
}

fn admin_page(segment: &str) -> Option<AdminPage> {
    match segment {
        "users" => Some(AdminPage::Users),
        "accesses" => Some(AdminPage::Accesses),
        "reports" => Some(AdminPage::Reports),
        "settings" => Some(AdminPage::Settings),
        _ => None,
    }
}

/// Lowercased `path` without query, fragment or trailing slashes.
fn normalize(path: &str) -> String {
    let bare = path.split(['?', '#']).next().unwrap_or_default();
    bare.trim_end_matches('/').to_lowercase()
}

/// Resolve `path` for the given session.
///
/// Matching ignores case and trailing slashes, so `/Operator/` resolves like
/// `/operator`.
#[must_use]
pub fn resolve(path: &str, session: Option<&Session>) -> Navigation {
    let role = session.map(|s| s.role);
    let requested = normalize(path);

    match requested.as_str() {
        "" | "/" => Navigation::Redirect(match role {
            Some(SessionRole::Admin) => ADMIN_PATH,
            Some(SessionRole::Operator) => OPERATOR_PATH,
            None => LOGIN_PATH,
        }),
        LOGIN_PATH => Navigation::Render(View::Login),
        OPERATOR_PATH => match role {
            Some(SessionRole::Operator) => Navigation::Render(View::OperatorConsole),
            _ => Navigation::Redirect(LOGIN_PATH),
        },
        other => match other.strip_prefix(ADMIN_PATH) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                if role != Some(SessionRole::Admin) {
                    return Navigation::Redirect(LOGIN_PATH);
                }
                match rest.trim_matches('/') {
                    "" => Navigation::Redirect(ADMIN_USERS_PATH),
                    segment => Navigation::Render(
                        admin_page(segment).map_or(View::NotFound, View::Admin),
                    ),
                }
            }
            _ => Navigation::Render(View::NotFound),
        },
    }
}
