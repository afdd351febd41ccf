//! Per-role password policy library
//!
//! This library lets an application attach password policies to roles.
//! A policy holds composable constraints (lower-case, upper-case, number,
//! special character, minimum length), a minimum number of constraints to
//! satisfy, and password expiry settings.
//!
//! When an account has several roles, the constraints of all matching
//! policies are merged: a higher-priority policy's constraint of a given
//! type masks the lower-priority ones of the same type.
//!
//! # Features
//!
//! - `async` (default): Enables cancellable evaluation and channel delivery
//! - `tracing`: Enables logging via tracing crate
//!
//! # Environment Variables
//!
//! - `PWD_POLICY_PATH`: Custom path to the JSON policy file
//!   (default: `./assets/policies.json`)
//!
//! # Example
//!
//! ```rust,no_run
//! use password_policy::PolicyStore;
//! use secrecy::SecretString;
//!
//! // Load policies (call once at startup)
//! let store = PolicyStore::from_env().expect("Failed to load policies");
//!
//! // Validate a password for an account's roles
//! let password = SecretString::new("MyP@ssw0rd!".to_string().into());
//! let roles = ["authenticated", "editor"];
//!
//! #[cfg(feature = "async")]
//! let result = store.evaluate_for_roles(&password, &roles, None);
//!
//! #[cfg(not(feature = "async"))]
//! let result = store.evaluate_for_roles(&password, &roles);
//!
//! for failure in &result.failures {
//!     println!("{failure}");
//! }
//! ```

// Internal modules
mod constraint;
mod constraints;
mod evaluator;
mod lock;
mod policy;
mod registry;
mod resolver;
mod settings;
mod store;

// Public API
pub use constraint::{Constraint, ConstraintError};
pub use constraints::{ConstraintCheck, ConstraintKind, DEFAULT_SPECIAL_CHARACTERS};
pub use evaluator::{evaluate, evaluate_with, ConstraintOutcome, ValidationResult, CANCELLED_MESSAGE};
pub use lock::{
    LockState, NavigationDecision, NavigationLock, CHANGE_REQUIRED_NOTICE, EXPIRED_NOTICE,
    LOGOUT_PATH, PASSWORD_CHANGE_PATH, RESET_TOKEN_PARAMETER,
};
pub use policy::{
    PasswordState, Policy, PolicyError, DATE_TIME_PLACEHOLDER, DEFAULT_EXPIRY_WARNING_MESSAGE,
    PASSWORD_NO_EXPIRY, PASSWORD_NO_WARNING,
};
pub use registry::{ConstraintDefinition, ConstraintRegistry};
pub use resolver::{
    load_by_role_and_priority, load_multiple_by_role_and_priority, resolve_constraints,
    ResolvedConstraints,
};
pub use settings::{
    SettingValue, Settings, SettingsError, MINIMUM_CHARACTERS, SPECIAL_CHARACTERS,
    USE_CUSTOM_SPECIAL_CHARACTERS,
};
pub use store::{get_policy_path, PolicyStore, StoreError};

#[cfg(feature = "async")]
pub use evaluator::evaluate_tx;
