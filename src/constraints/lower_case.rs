//! Lower-case constraint - requires a number of `a-z` letters.

use crate::registry::ConstraintDefinition;
use crate::settings::Settings;

use super::ConstraintKind;

pub const DEFINITION: ConstraintDefinition = ConstraintDefinition {
    id: "lower_case",
    name: "Lower-case",
    description: "Checks if the password has at least a specified number of lower-cased characters.",
    unique: true,
    kind: ConstraintKind::LowerCase,
    default_description_singular: "Add at least one lower-cased letter.",
    default_description_plural: "Add @minimum_characters more lower-cased letters.",
};

/// Keeps the ASCII lower-case letters of the password.
pub fn extract(password: &str, _settings: &Settings) -> String {
    password.chars().filter(|c| c.is_ascii_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_case_extract_mixed() {
        assert_eq!(extract("tEStPASSwORD", &Settings::new()), "ttw");
        assert_eq!(extract("TeSTPASSWORD", &Settings::new()), "e");
    }

    #[test]
    fn test_lower_case_extract_none() {
        assert_eq!(extract("TESTPASSWORD", &Settings::new()), "");
        assert_eq!(extract("", &Settings::new()), "");
    }

    #[test]
    fn test_lower_case_ignores_non_ascii() {
        assert_eq!(extract("éàb", &Settings::new()), "b");
    }
}
