//! Constraint definition registry.
//!
//! Maps a constraint type id to its validator, its uniqueness flag and its
//! default messages. The built-in table is assembled once from
//! [`ConstraintKind::ALL`].

use std::sync::LazyLock;

use indexmap::IndexMap;

use crate::constraint::Constraint;
use crate::constraints::{describe, missing_characters, ConstraintCheck, ConstraintKind};
use crate::settings::{Settings, SettingsError};

static BUILTIN: LazyLock<ConstraintRegistry> = LazyLock::new(ConstraintRegistry::default);

/// Static description of a constraint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// At most one constraint of this type per policy.
    pub unique: bool,
    /// Validator used to check passwords.
    pub kind: ConstraintKind,
    pub default_description_singular: &'static str,
    pub default_description_plural: &'static str,
}

impl ConstraintDefinition {
    /// A new constraint of this type for `policy`, with default settings,
    /// default descriptions and a generated id.
    pub fn create(&self, policy: impl Into<String>) -> Constraint {
        let mut constraint = Constraint::new(policy, self.id)
            .with_settings(self.kind.default_settings())
            .with_descriptions(
                self.default_description_singular,
                self.default_description_plural,
            );
        constraint.assign_id(self.unique);
        constraint
    }

    pub fn validate_settings(&self, settings: Settings) -> Result<Settings, SettingsError> {
        self.kind.validate_settings(settings)
    }

    /// Checks `password` against `constraint`.
    ///
    /// When characters are missing the message uses the singular
    /// description for exactly one missing character and the plural one,
    /// with the missing count filled in, otherwise.
    pub fn check(&self, password: &str, constraint: &Constraint) -> ConstraintCheck {
        let matched = (self.kind.extractor())(password, constraint.settings());
        let missing = missing_characters(&matched, constraint.minimum_characters());
        let message = (missing > 0)
            .then(|| describe(self.template(constraint, missing), missing, constraint.settings()));
        ConstraintCheck { missing, message }
    }

    /// The requirement as shown before anything has been typed.
    pub fn initial_description(&self, constraint: &Constraint) -> String {
        let minimum = constraint.minimum_characters();
        describe(self.template(constraint, minimum), minimum, constraint.settings())
    }

    fn template<'a>(&'a self, constraint: &'a Constraint, count: u64) -> &'a str {
        let (configured, default) = if count == 1 {
            (
                constraint.description_singular(),
                self.default_description_singular,
            )
        } else {
            (
                constraint.description_plural(),
                self.default_description_plural,
            )
        };
        if configured.is_empty() { default } else { configured }
    }
}

/// Registration table of constraint definitions, keyed by type id.
#[derive(Debug, Clone)]
pub struct ConstraintRegistry {
    definitions: IndexMap<&'static str, ConstraintDefinition>,
}

impl Default for ConstraintRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for kind in ConstraintKind::ALL {
            registry.register(kind.definition());
        }
        registry
    }
}

impl ConstraintRegistry {
    pub fn empty() -> Self {
        Self {
            definitions: IndexMap::new(),
        }
    }

    /// The shared table of built-in definitions.
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Registers a definition, returning the one it replaced.
    pub fn register(&mut self, definition: ConstraintDefinition) -> Option<ConstraintDefinition> {
        self.definitions.insert(definition.id, definition)
    }

    pub fn get(&self, id: &str) -> Option<&ConstraintDefinition> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ConstraintDefinition> {
        self.definitions.values()
    }
}
