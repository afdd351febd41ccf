//! Number constraint - requires a number of `0-9` digits.

use crate::registry::ConstraintDefinition;
use crate::settings::Settings;

use super::ConstraintKind;

pub const DEFINITION: ConstraintDefinition = ConstraintDefinition {
    id: "number",
    name: "Number",
    description: "Checks if the password has at least a specified number of numbers.",
    unique: true,
    kind: ConstraintKind::Number,
    default_description_singular: "Add at least one number.",
    default_description_plural: "Add @minimum_characters more numbers.",
};

pub fn extract(password: &str, _settings: &Settings) -> String {
    password.chars().filter(|c| c.is_ascii_digit()).collect()
}
