//! Upper-case constraint - requires a number of `A-Z` letters.

use crate::registry::ConstraintDefinition;
use crate::settings::Settings;

use super::ConstraintKind;

pub const DEFINITION: ConstraintDefinition = ConstraintDefinition {
    id: "upper_case",
    name: "Upper-case",
    description: "Checks if the password has at least a specified number of upper-cased characters.",
    unique: true,
    kind: ConstraintKind::UpperCase,
    default_description_singular: "Add at least one upper-cased letter.",
    default_description_plural: "Add @minimum_characters more upper-cased letters.",
};

pub fn extract(password: &str, _settings: &Settings) -> String {
    password.chars().filter(|c| c.is_ascii_uppercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_case_extract() {
        assert_eq!(extract("tEStPASSwORD", &Settings::new()), "ESPASSORD");
        assert_eq!(extract("lowercase123!", &Settings::new()), "");
    }
}
