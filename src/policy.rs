//! Role-scoped password policy and password expiry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `expire_seconds` value of a policy whose passwords never expire.
pub const PASSWORD_NO_EXPIRY: u64 = 0;

/// `expire_warn_seconds` value of a policy that never warns.
pub const PASSWORD_NO_WARNING: u64 = 0;

const SECONDS_PER_DAY: u64 = 86_400;

/// Replaced by the expiry time (Unix seconds) in the warning message.
pub const DATE_TIME_PLACEHOLDER: &str = "@date_time";

pub const DEFAULT_EXPIRY_WARNING_MESSAGE: &str =
    "Your password will expire on @date_time, please change your password before it expires.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("The policy role cannot be empty.")]
    EmptyRole,
    #[error("Expiry warning message cannot be empty for expiring passwords.")]
    MissingExpiryWarningMessage,
}

/// Password rule set bound to one role.
///
/// The role is the identity of a policy. When an account has several
/// roles, policies with a higher `priority` win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    role: String,
    #[serde(default = "default_minimum_required_constraints")]
    minimum_required_constraints: u32,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    expire_seconds: u64,
    #[serde(default)]
    expire_warn_seconds: u64,
    #[serde(default = "default_expiry_warning_message")]
    expiry_warning_message: Option<String>,
}

fn default_minimum_required_constraints() -> u32 {
    1
}

fn default_expiry_warning_message() -> Option<String> {
    Some(DEFAULT_EXPIRY_WARNING_MESSAGE.to_string())
}

impl Policy {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            minimum_required_constraints: default_minimum_required_constraints(),
            priority: 0,
            expire_seconds: PASSWORD_NO_EXPIRY,
            expire_warn_seconds: PASSWORD_NO_WARNING,
            expiry_warning_message: default_expiry_warning_message(),
        }
    }

    /// Policies are keyed by role.
    pub fn id(&self) -> &str {
        &self.role
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn minimum_required_constraints(&self) -> u32 {
        self.minimum_required_constraints
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn expire_seconds(&self) -> u64 {
        self.expire_seconds
    }

    pub fn expire_days(&self) -> u64 {
        self.expire_seconds / SECONDS_PER_DAY
    }

    pub fn expire_warn_seconds(&self) -> u64 {
        self.expire_warn_seconds
    }

    pub fn expire_warn_days(&self) -> u64 {
        self.expire_warn_seconds / SECONDS_PER_DAY
    }

    pub fn expiry_warning_message(&self) -> Option<&str> {
        self.expiry_warning_message.as_deref()
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_minimum_required_constraints(mut self, number: u32) -> Self {
        self.minimum_required_constraints = number;
        self
    }

    pub fn with_expiry(mut self, expire_seconds: u64, expire_warn_seconds: u64) -> Self {
        self.set_expire_seconds(expire_seconds);
        self.set_expire_warn_seconds(expire_warn_seconds);
        self
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub fn set_minimum_required_constraints(&mut self, number: u32) {
        self.minimum_required_constraints = number;
    }

    /// Setting 0 makes passwords never expire and drops the warning message.
    pub fn set_expire_seconds(&mut self, seconds: u64) {
        self.expire_seconds = seconds;
        if seconds == PASSWORD_NO_EXPIRY {
            self.expiry_warning_message = None;
        }
    }

    pub fn set_expire_warn_seconds(&mut self, seconds: u64) {
        self.expire_warn_seconds = seconds;
    }

    pub fn set_expiry_warning_message(&mut self, message: Option<String>) -> Result<(), PolicyError> {
        if self.warns_before_expiry() && message.as_deref().is_none_or(str::is_empty) {
            return Err(PolicyError::MissingExpiryWarningMessage);
        }
        self.expiry_warning_message = message;
        Ok(())
    }

    /// Checks a policy built by deserialization.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.role.trim().is_empty() {
            return Err(PolicyError::EmptyRole);
        }
        if self.warns_before_expiry()
            && self.expiry_warning_message.as_deref().is_none_or(str::is_empty)
        {
            return Err(PolicyError::MissingExpiryWarningMessage);
        }
        Ok(())
    }

    fn warns_before_expiry(&self) -> bool {
        self.expire_seconds != PASSWORD_NO_EXPIRY && self.expire_warn_seconds != PASSWORD_NO_WARNING
    }

    /// Whether a password changed at `changed_at` is expired at `now`.
    ///
    /// Timestamps are Unix seconds.
    pub fn is_expired(&self, changed_at: u64, now: u64) -> bool {
        self.expire_seconds != PASSWORD_NO_EXPIRY
            && now.saturating_sub(changed_at) >= self.expire_seconds
    }

    /// Whether the expiry warning should be shown at `now`.
    pub fn show_warning_message(&self, changed_at: u64, now: u64) -> bool {
        self.expire_warn_seconds != PASSWORD_NO_WARNING
            && changed_at
                .saturating_add(self.expire_seconds)
                .saturating_sub(self.expire_warn_seconds)
                < now
    }

    /// The expiry warning with `@date_time` replaced by the expiry time.
    ///
    /// `None` when passwords never expire or there is no message.
    pub fn warning_message(&self, changed_at: u64) -> Option<String> {
        let expires_at = self.expires_at(changed_at)?;
        self.expiry_warning_message
            .as_deref()
            .map(|message| message.replace(DATE_TIME_PLACEHOLDER, &expires_at.to_string()))
    }

    /// When a password changed at `changed_at` expires, `None` if never.
    pub fn expires_at(&self, changed_at: u64) -> Option<u64> {
        (self.expire_seconds != PASSWORD_NO_EXPIRY)
            .then(|| changed_at.saturating_add(self.expire_seconds))
    }
}

/// Password bookkeeping of one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordState {
    /// Unix seconds of the last password change.
    pub changed_at: u64,
    /// Set by an administrator or a password reset to force a change.
    #[serde(default)]
    pub change_required: bool,
}

impl PasswordState {
    pub fn new(changed_at: u64) -> Self {
        Self {
            changed_at,
            change_required: false,
        }
    }

    pub fn with_change_required(mut self, required: bool) -> Self {
        self.change_required = required;
        self
    }

    pub fn is_expired(&self, policy: &Policy, now: u64) -> bool {
        self.change_required || policy.is_expired(self.changed_at, now)
    }

    pub fn show_warning_message(&self, policy: &Policy, now: u64) -> bool {
        policy.show_warning_message(self.changed_at, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = Policy::new("authenticated");
        assert_eq!(policy.id(), "authenticated");
        assert_eq!(policy.minimum_required_constraints(), 1);
        assert_eq!(policy.priority(), 0);
        assert_eq!(policy.expire_seconds(), PASSWORD_NO_EXPIRY);
        assert_eq!(
            policy.expiry_warning_message(),
            Some(DEFAULT_EXPIRY_WARNING_MESSAGE)
        );
    }

    #[test]
    fn test_never_expires() {
        let policy = Policy::new("authenticated");
        let t = 1_700_000_000;
        assert!(!policy.is_expired(t, t + 1_000_000_000));
        assert_eq!(policy.expires_at(t), None);
    }

    #[test]
    fn test_expires_after_expire_seconds() {
        let policy = Policy::new("authenticated").with_expiry(86_400, 0);
        assert!(policy.is_expired(0, 86_401));
        assert!(policy.is_expired(0, 86_400));
        assert!(!policy.is_expired(0, 86_399));
        assert_eq!(policy.expires_at(100), Some(86_500));
    }

    #[test]
    fn test_clock_skew_is_not_expired() {
        let policy = Policy::new("authenticated").with_expiry(10, 0);
        assert!(!policy.is_expired(1_000, 500));
    }

    #[test]
    fn test_change_required_forces_expiry() {
        let policy = Policy::new("authenticated");
        let state = PasswordState::new(100).with_change_required(true);
        assert!(state.is_expired(&policy, 101));
        assert!(!PasswordState::new(100).is_expired(&policy, 101));
    }

    #[test]
    fn test_show_warning_message_window() {
        let policy = Policy::new("authenticated").with_expiry(10 * 86_400, 2 * 86_400);
        // Warning starts strictly after changed_at + 8 days.
        assert!(!policy.show_warning_message(0, 8 * 86_400));
        assert!(policy.show_warning_message(0, 8 * 86_400 + 1));
        let no_warning = Policy::new("authenticated").with_expiry(10 * 86_400, 0);
        assert!(!no_warning.show_warning_message(0, 20 * 86_400));
    }

    #[test]
    fn test_warning_message_fills_expiry_time() {
        let policy = Policy::new("authenticated").with_expiry(86_400, 3_600);
        assert_eq!(
            policy.warning_message(1_000).as_deref(),
            Some("Your password will expire on 87400, please change your password before it expires.")
        );
        assert_eq!(Policy::new("authenticated").warning_message(1_000), None);
    }

    #[test]
    fn test_expire_days_floor() {
        let policy = Policy::new("authenticated").with_expiry(3 * 86_400 + 5, 86_399);
        assert_eq!(policy.expire_days(), 3);
        assert_eq!(policy.expire_warn_days(), 0);
    }

    #[test]
    fn test_zero_expiry_drops_warning_message() {
        let mut policy = Policy::new("authenticated");
        policy.set_expire_seconds(0);
        assert_eq!(policy.expiry_warning_message(), None);
    }

    #[test]
    fn test_warning_message_required_when_warning() {
        let mut policy = Policy::new("authenticated").with_expiry(86_400, 3_600);
        assert_eq!(
            policy.set_expiry_warning_message(Some(String::new())),
            Err(PolicyError::MissingExpiryWarningMessage)
        );
        assert!(policy.set_expiry_warning_message(Some("Soon.".into())).is_ok());
        assert_eq!(policy.expiry_warning_message(), Some("Soon."));
    }

    #[test]
    fn test_validate() {
        assert_eq!(Policy::new(" ").validate(), Err(PolicyError::EmptyRole));
        let policy: Policy = serde_json::from_str(
            r#"{"role": "editor", "expire_seconds": 100, "expire_warn_seconds": 10, "expiry_warning_message": null}"#,
        )
        .unwrap();
        assert_eq!(policy.validate(), Err(PolicyError::MissingExpiryWarningMessage));
        assert!(Policy::new("editor").validate().is_ok());
    }
}
