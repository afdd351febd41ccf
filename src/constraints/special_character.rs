//! Special character constraint.
//!
//! Without a custom list every character that is not an ASCII letter or
//! digit is special. With `use_custom_special_characters` set, only the
//! characters of the configured list count.

use crate::registry::ConstraintDefinition;
use crate::settings::{Settings, SettingsError, SPECIAL_CHARACTERS, USE_CUSTOM_SPECIAL_CHARACTERS};

use super::ConstraintKind;

/// The list offered when an administrator switches to a custom list.
pub const DEFAULT_SPECIAL_CHARACTERS: &str = " !\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

pub const DEFINITION: ConstraintDefinition = ConstraintDefinition {
    id: "special_character",
    name: "Special character",
    description: "Checks if the password has at least a specified number of special characters.",
    unique: false,
    kind: ConstraintKind::SpecialCharacter,
    default_description_singular: "Add at least one special character.",
    default_description_plural: "Add @minimum_characters more special characters.",
};

pub fn extract(password: &str, settings: &Settings) -> String {
    if settings.flag(USE_CUSTOM_SPECIAL_CHARACTERS) {
        let special = settings.text(SPECIAL_CHARACTERS).unwrap_or_default();
        password.chars().filter(|c| special.contains(*c)).collect()
    } else {
        password.chars().filter(|c| !c.is_ascii_alphanumeric()).collect()
    }
}

pub(super) fn default_settings(settings: Settings) -> Settings {
    settings.with(USE_CUSTOM_SPECIAL_CHARACTERS, false)
}

/// Drops the custom list when it is switched off, rejects alphanumerics
/// in it otherwise.
pub(super) fn validate_settings(mut settings: Settings) -> Result<Settings, SettingsError> {
    if !settings.flag(USE_CUSTOM_SPECIAL_CHARACTERS) {
        settings.remove(SPECIAL_CHARACTERS);
        settings.insert(USE_CUSTOM_SPECIAL_CHARACTERS, false);
        return Ok(settings);
    }

    let special = settings.text(SPECIAL_CHARACTERS).unwrap_or_default();
    if special.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(SettingsError::AlphanumericSpecialCharacters);
    }
    settings.insert(USE_CUSTOM_SPECIAL_CHARACTERS, true);
    Ok(settings)
}
