//! Minimum length constraint - every character counts.

use crate::registry::ConstraintDefinition;
use crate::settings::Settings;

use super::ConstraintKind;

pub const DEFINITION: ConstraintDefinition = ConstraintDefinition {
    id: "minimum_length",
    name: "Minimum length",
    description: "Checks if the password has at least a specified number of characters of any type.",
    unique: true,
    kind: ConstraintKind::MinimumLength,
    default_description_singular: "Add at least one more character.",
    default_description_plural: "Add @minimum_characters more characters.",
};

pub fn extract(password: &str, _settings: &Settings) -> String {
    password.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::missing_characters;

    #[test]
    fn test_minimum_length_counts_characters_not_bytes() {
        let matched = extract("pässwörd", &Settings::new());
        assert_eq!(missing_characters(&matched, 8), 0);
        assert_eq!(missing_characters(&matched, 10), 2);
    }
}
