//! Role-based routing: where a user lands, and what they may open.

use super::AuthState;
use crate::types::{RoleKind, User};

/// Top-level destinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    AdminDashboard,
    TechnicianLots,
    ClientApplications,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::AdminDashboard => "/admin/dashboard",
            Route::TechnicianLots => "/technician/lots",
            Route::ClientApplications => "/client/applications",
        }
    }

    fn for_role(kind: RoleKind) -> Self {
        match kind {
            RoleKind::Admin => Route::AdminDashboard,
            RoleKind::Technician => Route::TechnicianLots,
            RoleKind::Client => Route::ClientApplications,
        }
    }
}

/// First landing route by role priority (admin, technician, client); login
/// when there is no user or no recognized role.
pub fn landing_route(user: Option<&User>) -> Route {
    user.and_then(User::primary_role)
        .map(Route::for_role)
        .unwrap_or(Route::Login)
}

/// Why a signed-in user was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    pub required: Vec<String>,
    pub held: Vec<String>,
    /// Where the manual "back to login" link points.
    pub login: Route,
}

impl AccessDenied {
    pub fn message(&self) -> String {
        let held = if self.held.is_empty() {
            "none".to_string()
        } else {
            self.held.join(", ")
        };
        format!(
            "Access denied: requires one of [{}], you have [{}]",
            self.required.join(", "),
            held
        )
    }
}

/// What a guarded screen should show.
#[derive(Debug, Clone, PartialEq)]
pub enum Guarded<T> {
    /// Session verification still running; show a waiting indicator.
    Waiting,
    /// Nobody is signed in.
    RedirectToLogin,
    /// Signed in but lacking the role. Shown in place, never auto-redirected.
    AccessDenied(AccessDenied),
    Render(T),
}

impl<T> Guarded<T> {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Guarded::Render(_))
    }

    pub fn rendered(self) -> Option<T> {
        match self {
            Guarded::Render(value) => Some(value),
            _ => None,
        }
    }
}

/// Gate `children` on `state`. An empty `required` list admits any signed-in
/// user.
pub fn guard<S, T, F>(state: &AuthState, required: &[S], children: F) -> Guarded<T>
where
    S: AsRef<str>,
    F: FnOnce(&User) -> T,
{
    match state {
        AuthState::Loading => Guarded::Waiting,
        AuthState::Unauthenticated => Guarded::RedirectToLogin,
        AuthState::Authenticated(user) => {
            if required.is_empty() || user.has_role(required) {
                Guarded::Render(children(user))
            } else {
                Guarded::AccessDenied(AccessDenied {
                    required: required.iter().map(|r| r.as_ref().to_string()).collect(),
                    held: user.roles.iter().map(|r| r.name.clone()).collect(),
                    login: Route::Login,
                })
            }
        }
    }
}
