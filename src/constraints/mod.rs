//! Password constraint validators
//!
//! Each validator extracts the characters of the password it cares about.
//! A single minimum-count check then decides whether enough of them are
//! present.

mod lower_case;
mod minimum_length;
mod number;
mod special_character;
mod upper_case;

use std::fmt;

use crate::registry::ConstraintDefinition;
use crate::settings::{Settings, SettingsError, MINIMUM_CHARACTERS};

pub use special_character::DEFAULT_SPECIAL_CHARACTERS;

/// Extracts the matching characters of a password.
pub type Extractor = fn(&str, &Settings) -> String;

/// Placeholder replaced by the number of missing characters.
pub const MINIMUM_CHARACTERS_PLACEHOLDER: &str = "@minimum_characters";

/// Placeholder replaced by the configured special character list.
pub const SPECIAL_CHARACTERS_PLACEHOLDER: &str = "@special_characters";

/// The built-in constraint types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    LowerCase,
    UpperCase,
    Number,
    SpecialCharacter,
    MinimumLength,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 5] = [
        Self::LowerCase,
        Self::UpperCase,
        Self::Number,
        Self::SpecialCharacter,
        Self::MinimumLength,
    ];

    /// Type id as referenced by constraints.
    pub fn id(self) -> &'static str {
        self.definition().id
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Registry entry of this type.
    pub fn definition(self) -> ConstraintDefinition {
        match self {
            Self::LowerCase => lower_case::DEFINITION,
            Self::UpperCase => upper_case::DEFINITION,
            Self::Number => number::DEFINITION,
            Self::SpecialCharacter => special_character::DEFINITION,
            Self::MinimumLength => minimum_length::DEFINITION,
        }
    }

    pub(crate) fn extractor(self) -> Extractor {
        match self {
            Self::LowerCase => lower_case::extract,
            Self::UpperCase => upper_case::extract,
            Self::Number => number::extract,
            Self::SpecialCharacter => special_character::extract,
            Self::MinimumLength => minimum_length::extract,
        }
    }

    /// Settings a freshly created constraint of this type starts with.
    pub fn default_settings(self) -> Settings {
        let settings = Settings::new().with(MINIMUM_CHARACTERS, 1i64);
        match self {
            Self::SpecialCharacter => special_character::default_settings(settings),
            _ => settings,
        }
    }

    /// Checks and normalises settings entered by an administrator.
    pub fn validate_settings(self, settings: Settings) -> Result<Settings, SettingsError> {
        let settings = validate_minimum_characters(settings)?;
        match self {
            Self::SpecialCharacter => special_character::validate_settings(settings),
            _ => Ok(settings),
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Outcome of one constraint against one password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintCheck {
    /// Characters still missing, 0 when the constraint passed.
    pub missing: u64,
    /// Failure message, `None` when the constraint passed.
    pub message: Option<String>,
}

impl ConstraintCheck {
    pub fn passed(&self) -> bool {
        self.missing == 0
    }
}

/// Number of characters missing to reach `minimum`.
///
/// Counts Unicode scalar values, so an empty match simply counts as zero.
pub fn missing_characters(matched: &str, minimum: u64) -> u64 {
    let count = matched.chars().count() as u64;
    minimum.saturating_sub(count)
}

/// Fills the placeholders of a description template.
pub fn describe(template: &str, count: u64, settings: &Settings) -> String {
    let special = settings
        .text(crate::settings::SPECIAL_CHARACTERS)
        .unwrap_or_default();
    template
        .replace(MINIMUM_CHARACTERS_PLACEHOLDER, &count.to_string())
        .replace(SPECIAL_CHARACTERS_PLACEHOLDER, special)
}

fn validate_minimum_characters(settings: Settings) -> Result<Settings, SettingsError> {
    match settings.integer(MINIMUM_CHARACTERS) {
        None => Err(SettingsError::Missing { field: MINIMUM_CHARACTERS }),
        Some(n) if n < 1 => Err(SettingsError::NotPositive { field: MINIMUM_CHARACTERS }),
        Some(n) => Ok(settings.with(MINIMUM_CHARACTERS, n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_round_trips_every_kind() {
        for kind in ConstraintKind::ALL {
            assert_eq!(ConstraintKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(ConstraintKind::from_id("history"), None);
    }

    #[test]
    fn test_missing_characters_empty_match() {
        assert_eq!(missing_characters("", 3), 3);
        assert_eq!(missing_characters("abcd", 3), 0);
        assert_eq!(missing_characters("", 0), 0);
    }

    #[test]
    fn test_missing_characters_counts_scalars() {
        assert_eq!(missing_characters("éé", 3), 1);
    }

    #[test]
    fn test_describe_replaces_placeholders() {
        let settings = Settings::new().with(crate::settings::SPECIAL_CHARACTERS, "&%");
        assert_eq!(
            describe("Add @minimum_characters more of @special_characters.", 2, &settings),
            "Add 2 more of &%."
        );
    }

    #[test]
    fn test_validate_settings_rejects_zero_minimum() {
        let settings = Settings::new().with(MINIMUM_CHARACTERS, 0i64);
        assert_eq!(
            ConstraintKind::Number.validate_settings(settings),
            Err(SettingsError::NotPositive { field: MINIMUM_CHARACTERS })
        );
    }

    #[test]
    fn test_validate_settings_requires_minimum() {
        assert_eq!(
            ConstraintKind::LowerCase.validate_settings(Settings::new()),
            Err(SettingsError::Missing { field: MINIMUM_CHARACTERS })
        );
    }

    #[test]
    fn test_validate_settings_normalises_text_minimum() {
        let settings = Settings::new().with(MINIMUM_CHARACTERS, "5");
        let settings = ConstraintKind::UpperCase.validate_settings(settings).unwrap();
        assert_eq!(
            settings.get(MINIMUM_CHARACTERS),
            Some(&crate::settings::SettingValue::Integer(5))
        );
    }

    #[test]
    fn test_only_special_character_is_not_unique() {
        for kind in ConstraintKind::ALL {
            let def = kind.definition();
            assert_eq!(def.unique, kind != ConstraintKind::SpecialCharacter, "{kind}");
        }
    }
}
