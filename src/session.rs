use std::sync::{Arc, RwLock};

use crate::models::UserInfo;

/// Role
///
/// Role carried by a logged-in session. Anything that is not exactly `USER` is treated as
/// staff by the route guard, so unknown role codes are kept rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
    Other(String),
}

impl Role {
    pub fn from_code(code: &str) -> Self {
        match code {
            "ADMIN" => Role::Admin,
            "USER" => Role::User,
            other => Role::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::Other(code) => code,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Role::User)
    }
}

/// Session
///
/// Snapshot of the authentication state consumed by the route guard.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub logged_in: bool,
    pub role: Option<Role>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            logged_in: false,
            role: None,
        }
    }

    pub fn logged_in(role: Role) -> Self {
        Self {
            logged_in: true,
            role: Some(role),
        }
    }

    /// True only for a logged-in ordinary user.
    pub fn is_user(&self) -> bool {
        self.logged_in && self.role.as_ref().is_some_and(Role::is_user)
    }
}

#[derive(Debug, Clone)]
struct ActiveSession {
    token: String,
    user: UserInfo,
    role: Role,
}

/// SessionStore
///
/// Shared, thread-safe holder of the current login. Written by the login/logout wrappers,
/// read by the API client (bearer token) and by navigation (session snapshot).
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<ActiveSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful login. A missing `roleCode` is treated as an ordinary user.
    pub fn login(&self, token: impl Into<String>, user: UserInfo) {
        let role = user
            .role_code
            .as_deref()
            .map(Role::from_code)
            .unwrap_or(Role::User);
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(ActiveSession {
            token: token.into(),
            user,
            role,
        });
    }

    pub fn logout(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    pub fn snapshot(&self) -> Session {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(active) => Session::logged_in(active.role.clone()),
            None => Session::anonymous(),
        }
    }

    pub fn token(&self) -> Option<String> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|active| active.token.clone())
    }

    pub fn current_user(&self) -> Option<UserInfo> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|active| active.user.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.snapshot().logged_in
    }
}
