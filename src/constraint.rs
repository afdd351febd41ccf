//! A constraint instance attached to a policy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{SettingValue, Settings, SettingsError, MINIMUM_CHARACTERS};

/// Errors raised while configuring a constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("Constraint type cannot be empty.")]
    EmptyType,
    #[error("Unknown password constraint type: {0}")]
    UnknownType(String),
    #[error("No password policy exists for role: {0}")]
    PolicyNotFound(String),
    #[error("Invalid settings for {constraint_type}: {source}")]
    InvalidSettings {
        constraint_type: String,
        #[source]
        source: SettingsError,
    },
}

/// One rule of a policy: a constraint type, its settings and messages.
///
/// The id is `<policy>.<type>` for unique types and
/// `<policy>.<type>.<uuid>` otherwise. It is assigned when the constraint
/// is created from a definition or saved into a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(default)]
    id: String,
    #[serde(default)]
    policy: String,
    #[serde(rename = "type")]
    constraint_type: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    description_singular: String,
    #[serde(default)]
    description_plural: String,
    #[serde(default)]
    settings: Settings,
}

impl Constraint {
    /// Creates a constraint without an id or descriptions.
    ///
    /// Prefer [`ConstraintDefinition::create`](crate::ConstraintDefinition::create),
    /// which fills both in.
    pub fn new(policy: impl Into<String>, constraint_type: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            policy: policy.into(),
            constraint_type: constraint_type.into(),
            required: false,
            description_singular: String::new(),
            description_plural: String::new(),
            settings: Settings::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Role id of the owning policy.
    pub fn policy(&self) -> &str {
        &self.policy
    }

    pub fn constraint_type(&self) -> &str {
        &self.constraint_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn description_singular(&self) -> &str {
        &self.description_singular
    }

    pub fn description_plural(&self) -> &str {
        &self.description_plural
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// `<type> (<policy>)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.constraint_type, self.policy)
    }

    /// The configured minimum, 1 when unset. Negative values count as 0.
    pub fn minimum_characters(&self) -> u64 {
        self.settings
            .integer(MINIMUM_CHARACTERS)
            .map(|n| u64::try_from(n).unwrap_or(0))
            .unwrap_or(1)
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_setting(mut self, key: &str, value: impl Into<SettingValue>) -> Self {
        self.settings.insert(key, value);
        self
    }

    pub fn with_descriptions(
        mut self,
        singular: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        self.description_singular = singular.into();
        self.description_plural = plural.into();
        self
    }

    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn set_description_singular(&mut self, description: impl Into<String>) {
        self.description_singular = description.into();
    }

    pub fn set_description_plural(&mut self, description: impl Into<String>) {
        self.description_plural = description.into();
    }

    pub(crate) fn set_policy(&mut self, policy: impl Into<String>) {
        self.policy = policy.into();
    }

    /// Generates the id from the owning policy and the type.
    pub(crate) fn assign_id(&mut self, unique: bool) {
        self.id = if unique {
            format!("{}.{}", self.policy, self.constraint_type)
        } else {
            format!("{}.{}.{}", self.policy, self.constraint_type, uuid::Uuid::new_v4())
        };
    }

    /// Whether the current id was generated for the current owner and type.
    pub(crate) fn has_id_for(&self, unique: bool) -> bool {
        let prefix = format!("{}.{}", self.policy, self.constraint_type);
        if unique {
            self.id == prefix
        } else {
            self.id
                .strip_prefix(&prefix)
                .is_some_and(|rest| rest.starts_with('.') && rest.len() > 1)
        }
    }
}
