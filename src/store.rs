//! Policy store module
//!
//! Holds policies and their constraints in memory and loads them from a
//! JSON policy file.

use std::path::PathBuf;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[cfg(feature = "async")]
use tokio_util::sync::CancellationToken;

use crate::constraint::{Constraint, ConstraintError};
use crate::evaluator::{evaluate_with, ValidationResult};
use crate::policy::{Policy, PolicyError};
use crate::registry::ConstraintRegistry;
use crate::resolver::{
    load_by_role_and_priority, load_multiple_by_role_and_priority, resolve_constraints,
    ResolvedConstraints,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Policy file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read policy file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Policy file is empty")]
    EmptyFile,
    #[error("Malformed policy file: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid policy: {0}")]
    Policy(#[from] PolicyError),
    #[error("Invalid constraint: {0}")]
    Constraint(#[from] ConstraintError),
}

#[derive(Deserialize)]
struct PolicyFile {
    #[serde(default)]
    policies: Vec<PolicyEntry>,
}

#[derive(Deserialize)]
struct PolicyEntry {
    #[serde(flatten)]
    policy: Policy,
    #[serde(default)]
    constraints: Vec<Constraint>,
}

/// Returns the policy file path.
///
/// Priority:
/// 1. Environment variable `PWD_POLICY_PATH`
/// 2. Default path `./assets/policies.json`
pub fn get_policy_path() -> PathBuf {
    std::env::var("PWD_POLICY_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./assets/policies.json"))
}

/// In-memory policies and constraints.
///
/// Constraints are validated against the registry when saved, so anything
/// held here references a known type with valid settings.
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    registry: ConstraintRegistry,
    policies: IndexMap<String, Policy>,
    constraints: IndexMap<String, Constraint>,
}

impl PolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: ConstraintRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    /// Loads the policy file named by [`get_policy_path`].
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_path(get_policy_path())
    }

    /// Loads policies from a JSON policy file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File does not exist
    /// - File cannot be read
    /// - File is empty
    /// - File content is malformed or describes an invalid policy or constraint
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let store = password_policy::PolicyStore::from_path("/etc/myapp/policies.json")?;
    /// ```
    pub fn from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if !path.exists() {
            #[cfg(feature = "tracing")]
            tracing::error!("Policy loading FAILED: FileNotFound {}", path.display());
            return Err(StoreError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;

        if content.trim().is_empty() {
            #[cfg(feature = "tracing")]
            tracing::error!("Policy loading FAILED: Empty file {}", path.display());
            return Err(StoreError::EmptyFile);
        }

        let store = Self::from_json_str(&content)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Policies loaded: {} policies, {} constraints from {:?}",
            store.policies.len(),
            store.constraints.len(),
            path
        );

        Ok(store)
    }

    /// Loads policies from JSON text.
    ///
    /// ```json
    /// { "policies": [ { "role": "editor", "priority": 5,
    ///     "constraints": [ { "type": "number", "settings": { "minimum_characters": 2 } } ] } ] }
    /// ```
    pub fn from_json_str(content: &str) -> Result<Self, StoreError> {
        let file: PolicyFile = serde_json::from_str(content)?;
        let mut store = Self::new();
        for entry in file.policies {
            let role = entry.policy.role().to_string();
            store.save_policy(entry.policy)?;
            for mut constraint in entry.constraints {
                constraint.set_policy(role.clone());
                store.save_constraint(constraint)?;
            }
        }
        Ok(store)
    }

    pub fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    /// Inserts or replaces the policy of its role.
    pub fn save_policy(&mut self, policy: Policy) -> Result<(), PolicyError> {
        policy.validate()?;
        self.policies.insert(policy.id().to_string(), policy);
        Ok(())
    }

    pub fn policy(&self, role: &str) -> Option<&Policy> {
        self.policies.get(role)
    }

    pub fn policies(&self) -> impl Iterator<Item = &Policy> {
        self.policies.values()
    }

    /// Removes a policy together with its constraints.
    pub fn delete_policy(&mut self, role: &str) -> Option<Policy> {
        let policy = self.policies.shift_remove(role)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Deleting password policy {} and {} constraints",
            role,
            self.constraints_for_policy(role).count()
        );

        self.constraints.retain(|_, constraint| constraint.policy() != role);

        Some(policy)
    }

    /// Validates and stores a constraint, returning its id.
    ///
    /// Settings are normalised, empty descriptions are filled from the
    /// definition and an id is generated when the constraint has none for
    /// its policy. Saving a unique type twice replaces the earlier one.
    pub fn save_constraint(&mut self, mut constraint: Constraint) -> Result<String, ConstraintError> {
        let constraint_type = constraint.constraint_type().to_string();
        if constraint_type.trim().is_empty() {
            return Err(ConstraintError::EmptyType);
        }
        let definition = *self
            .registry
            .get(&constraint_type)
            .ok_or_else(|| ConstraintError::UnknownType(constraint_type.clone()))?;
        if !self.policies.contains_key(constraint.policy()) {
            return Err(ConstraintError::PolicyNotFound(constraint.policy().to_string()));
        }

        let settings = definition
            .validate_settings(constraint.settings().clone())
            .map_err(|source| ConstraintError::InvalidSettings {
                constraint_type: constraint_type.clone(),
                source,
            })?;
        constraint.set_settings(settings);

        if constraint.description_singular().is_empty() {
            constraint.set_description_singular(definition.default_description_singular);
        }
        if constraint.description_plural().is_empty() {
            constraint.set_description_plural(definition.default_description_plural);
        }
        if !constraint.has_id_for(definition.unique) {
            constraint.assign_id(definition.unique);
        }

        let id = constraint.id().to_string();

        #[cfg(feature = "tracing")]
        tracing::debug!("Saved password constraint {}", id);

        self.constraints.insert(id.clone(), constraint);
        Ok(id)
    }

    pub fn constraint(&self, id: &str) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    pub fn delete_constraint(&mut self, id: &str) -> Option<Constraint> {
        self.constraints.shift_remove(id)
    }

    /// Constraints owned by one policy, in insertion order.
    pub fn constraints_for_policy<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a Constraint> {
        self.constraints
            .values()
            .filter(move |constraint| constraint.policy() == role)
    }

    pub fn load_by_role_and_priority<S: AsRef<str>>(&self, roles: &[S]) -> Option<&Policy> {
        load_by_role_and_priority(self.policies.values(), roles)
    }

    pub fn load_multiple_by_role_and_priority<S: AsRef<str>>(&self, roles: &[S]) -> Vec<&Policy> {
        load_multiple_by_role_and_priority(self.policies.values(), roles)
    }

    pub fn load_constraints_by_role(&self, role: &str) -> ResolvedConstraints<'_> {
        self.load_constraints_by_roles(&[role])
    }

    pub fn load_constraints_by_roles<S: AsRef<str>>(&self, roles: &[S]) -> ResolvedConstraints<'_> {
        resolve_constraints(self.policies.values(), self.constraints.values(), roles)
    }

    /// Validates a password for an account with `roles`.
    ///
    /// The minimum comes from the highest-priority policy. Without any
    /// policy there is nothing to satisfy and the password passes.
    pub fn evaluate_for_roles<S: AsRef<str>>(
        &self,
        password: &SecretString,
        roles: &[S],
        #[cfg(feature = "async")] token: Option<CancellationToken>,
    ) -> ValidationResult {
        let minimum_required = self
            .load_by_role_and_priority(roles)
            .map(Policy::minimum_required_constraints)
            .unwrap_or(0);
        let constraints = self.load_constraints_by_roles(roles);
        evaluate_with(
            &self.registry,
            password,
            constraints,
            minimum_required,
            #[cfg(feature = "async")]
            token,
        )
    }
}
