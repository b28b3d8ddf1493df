use crate::{
    routes::{Location, ResolvedRoute, backend::DASHBOARD_PATH},
    session::Session,
};

pub const LOGIN_PATH: &str = "/login";
pub const AUTH_LOGIN_PATH: &str = "/auth/login";
pub const USER_HOME_PATH: &str = "/";
pub const BACKEND_ROOT: &str = "/back";

/// Appended to every route title.
pub const TITLE_SUFFIX: &str = "Mental Health Assistant";

/// GuardDecision
///
/// Outcome of a single guard evaluation. A denial is always a redirect, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    Allow,
    Redirect(Location),
}

/// RouteGuard
///
/// Role-based access control for client-side navigation. Evaluation is synchronous and
/// pure: the same target and session always yield the same decision.
#[derive(Debug, Clone, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn new() -> Self {
        Self
    }

    /// evaluate
    ///
    /// Applies the access rules in precedence order:
    /// 1. auth required, not logged in: login page, with `redirect` = requested full path
    /// 2. logged in, visiting the login page: role home
    /// 3. staff outside the backend: dashboard
    /// 4. staff inside the backend: allow
    /// 5. USER inside the backend: `/`
    /// 6. USER outside the backend: allow
    /// 7. anonymous inside the backend: login page
    /// 8. otherwise: allow
    pub fn evaluate(&self, target: &ResolvedRoute, session: &Session) -> GuardDecision {
        let path = target.path();
        let in_backend = is_backend_path(path);

        if target.descriptor.requires_auth && !session.logged_in {
            tracing::debug!(path, "Auth required, redirecting to login");
            return GuardDecision::Redirect(
                Location::new(LOGIN_PATH).with_query("redirect", &target.full_path()),
            );
        }

        if session.logged_in {
            let home = if session.is_user() {
                USER_HOME_PATH
            } else {
                DASHBOARD_PATH
            };

            if is_login_path(path) {
                return GuardDecision::Redirect(Location::new(home));
            }

            if !session.is_user() {
                return if in_backend {
                    GuardDecision::Allow
                } else {
                    tracing::debug!(path, "Staff session kept inside the backend");
                    GuardDecision::Redirect(Location::new(DASHBOARD_PATH))
                };
            }

            return if in_backend {
                tracing::debug!(path, "USER session denied backend access");
                GuardDecision::Redirect(Location::new(USER_HOME_PATH))
            } else {
                GuardDecision::Allow
            };
        }

        if in_backend {
            return GuardDecision::Redirect(Location::new(LOGIN_PATH));
        }

        GuardDecision::Allow
    }

    /// Page title for the matched route, when it declares one.
    pub fn page_title(&self, target: &ResolvedRoute) -> Option<String> {
        target
            .descriptor
            .title
            .as_ref()
            .map(|title| format!("{} - {}", title, TITLE_SUFFIX))
    }
}

/// `/back` itself or anything below it. `/backup` is not in the backend.
pub fn is_backend_path(path: &str) -> bool {
    path == BACKEND_ROOT
        || path
            .strip_prefix(BACKEND_ROOT)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// The login page is reachable both through the `/login` alias and its real path.
pub fn is_login_path(path: &str) -> bool {
    path == LOGIN_PATH || path == AUTH_LOGIN_PATH
}
