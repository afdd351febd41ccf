//! Validator-specific settings attached to a constraint.
//!
//! Settings are a flat map of scalar values keyed by setting name, the same
//! shape they take in a policy file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of matching characters a constraint asks for.
pub const MINIMUM_CHARACTERS: &str = "minimum_characters";

/// Whether the special character constraint uses its own character list.
pub const USE_CUSTOM_SPECIAL_CHARACTERS: &str = "use_custom_special_characters";

/// The custom special character list.
pub const SPECIAL_CHARACTERS: &str = "special_characters";

/// A single scalar setting value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Settings map of a constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, SettingValue>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<SettingValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<SettingValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<SettingValue> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reads an integer setting. Numeric text is accepted as well, since
    /// settings typed into a form arrive as strings.
    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            SettingValue::Integer(n) => Some(*n),
            SettingValue::Text(s) => s.trim().parse().ok(),
            SettingValue::Bool(_) => None,
        }
    }

    /// Reads a boolean setting. `1`/`0` and non-empty text are treated the
    /// way checkbox values are submitted.
    pub fn flag(&self, key: &str) -> bool {
        match self.get(key) {
            Some(SettingValue::Bool(b)) => *b,
            Some(SettingValue::Integer(n)) => *n != 0,
            Some(SettingValue::Text(s)) => !s.is_empty() && s != "0",
            None => false,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            SettingValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A settings value rejected when a constraint is configured.
///
/// Every variant names the settings field it belongs to, so a caller can
/// attach the message to the right form element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("The {field} field is required.")]
    Missing { field: &'static str },
    #[error("The {field} field must be a non-zero, positive number.")]
    NotPositive { field: &'static str },
    #[error("Alphanumeric characters are not allowed.")]
    AlphanumericSpecialCharacters,
}

impl SettingsError {
    /// The settings field this error applies to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field } | Self::NotPositive { field } => field,
            Self::AlphanumericSpecialCharacters => SPECIAL_CHARACTERS,
        }
    }
}
