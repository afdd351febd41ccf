//! Navigation lock for accounts that must change their password.
//!
//! Once a change is required the lock stays engaged for the session until
//! the password is changed. While engaged, every path except the allowed
//! ones is redirected to the password change path.

use url::form_urlencoded;

use crate::policy::{PasswordState, Policy};

pub const PASSWORD_CHANGE_PATH: &str = "/user/password-change";
pub const LOGOUT_PATH: &str = "/user/logout";

/// Query parameter carrying a one-time password reset token.
pub const RESET_TOKEN_PARAMETER: &str = "pass-reset-token";

pub const CHANGE_REQUIRED_NOTICE: &str = "You need to change your password before continuing.";
pub const EXPIRED_NOTICE: &str = "Your password has expired and must be changed before continuing.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockState {
    #[default]
    Normal,
    ChangeRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Redirect {
        location: String,
        notice: &'static str,
    },
}

/// Per-session lock state.
#[derive(Debug, Clone)]
pub struct NavigationLock {
    state: LockState,
    password_change_path: String,
    allowed_paths: Vec<String>,
    reset_token: Option<String>,
}

impl Default for NavigationLock {
    fn default() -> Self {
        Self {
            state: LockState::Normal,
            password_change_path: PASSWORD_CHANGE_PATH.to_string(),
            allowed_paths: vec![PASSWORD_CHANGE_PATH.to_string(), LOGOUT_PATH.to_string()],
            reset_token: None,
        }
    }
}

impl NavigationLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `path` through while the lock is engaged.
    pub fn with_allowed_path(mut self, path: impl Into<String>) -> Self {
        self.allowed_paths.push(path.into());
        self
    }

    /// Redirects to `path` instead of the default change path. The new
    /// path is always allowed.
    pub fn with_password_change_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !self.allowed_paths.contains(&path) {
            self.allowed_paths.push(path.clone());
        }
        self.password_change_path = path;
        self
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == LockState::ChangeRequired
    }

    pub fn allowed_paths(&self) -> &[String] {
        &self.allowed_paths
    }

    /// Engages the lock, e.g. after logging in through a reset link.
    pub fn require_change(&mut self) {
        self.state = LockState::ChangeRequired;
    }

    /// Engages the lock when the account's password is expired under the
    /// applicable policy. Without a policy nothing expires.
    pub fn observe(&mut self, policy: Option<&Policy>, password: &PasswordState, now: u64) -> LockState {
        if self.state == LockState::Normal {
            let expired = match policy {
                Some(policy) => password.is_expired(policy, now),
                None => password.change_required,
            };
            if expired {
                #[cfg(feature = "tracing")]
                tracing::info!("Password change required, locking navigation");
                self.state = LockState::ChangeRequired;
            }
        }
        self.state
    }

    /// Decides what happens to a request for `path`.
    ///
    /// A reset token seen once is remembered and carried on every later
    /// redirect.
    pub fn intercept(&mut self, path: &str, reset_token: Option<&str>) -> NavigationDecision {
        if !self.is_locked() || self.allowed_paths.iter().any(|allowed| allowed == path) {
            return NavigationDecision::Allow;
        }

        if let Some(token) = reset_token {
            self.reset_token = Some(token.to_string());
        }

        match &self.reset_token {
            Some(token) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(RESET_TOKEN_PARAMETER, token)
                    .finish();
                NavigationDecision::Redirect {
                    location: format!("{}?{}", self.password_change_path, query),
                    notice: CHANGE_REQUIRED_NOTICE,
                }
            }
            None => NavigationDecision::Redirect {
                location: self.password_change_path.clone(),
                notice: EXPIRED_NOTICE,
            },
        }
    }

    /// Releases the lock after a successful password change.
    pub fn password_changed(&mut self) {
        self.state = LockState::Normal;
        self.reset_token = None;
    }
}
