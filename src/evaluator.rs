//! Policy evaluator - checks a password against resolved constraints.

use secrecy::{ExposeSecret, SecretString};

#[cfg(feature = "async")]
use tokio::sync::mpsc;

#[cfg(feature = "async")]
use tokio_util::sync::CancellationToken;

use crate::constraint::Constraint;
use crate::registry::ConstraintRegistry;

/// Reason reported when an evaluation is cancelled midway.
pub const CANCELLED_MESSAGE: &str = "Evaluation cancelled";

/// Result of a single constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintOutcome {
    pub constraint_id: String,
    pub constraint_type: String,
    pub required: bool,
    pub passed: bool,
    pub message: Option<String>,
}

/// Result of evaluating a password against a set of constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Every required constraint passed and enough constraints passed.
    pub passed: bool,
    /// Messages of every failed constraint, in evaluation order.
    pub failures: Vec<String>,
    /// One entry per evaluated constraint.
    pub outcomes: Vec<ConstraintOutcome>,
    /// Number of constraints that passed, required ones included.
    pub passed_count: usize,
    pub cancelled: bool,
}

impl ValidationResult {
    /// Outcomes of required constraints that failed.
    pub fn required_failures(&self) -> impl Iterator<Item = &ConstraintOutcome> {
        self.outcomes.iter().filter(|o| o.required && !o.passed)
    }
}

/// Evaluates a password against constraints using the built-in registry.
///
/// # Arguments
/// * `password` - The candidate password
/// * `constraints` - Resolved constraints, highest priority first
/// * `minimum_required` - How many constraints must pass in total
/// * `token` - Optional cancellation token (async feature only)
///
/// Every constraint is checked, so the result lists all unmet
/// requirements at once.
pub fn evaluate<'a, I>(
    password: &SecretString,
    constraints: I,
    minimum_required: u32,
    #[cfg(feature = "async")] token: Option<CancellationToken>,
) -> ValidationResult
where
    I: IntoIterator<Item = &'a Constraint>,
{
    evaluate_with(
        ConstraintRegistry::builtin(),
        password,
        constraints,
        minimum_required,
        #[cfg(feature = "async")]
        token,
    )
}

/// Same as [`evaluate`] with an explicit registry.
///
/// Constraints whose type is not registered are skipped: they neither
/// pass nor fail.
pub fn evaluate_with<'a, I>(
    registry: &ConstraintRegistry,
    password: &SecretString,
    constraints: I,
    minimum_required: u32,
    #[cfg(feature = "async")] token: Option<CancellationToken>,
) -> ValidationResult
where
    I: IntoIterator<Item = &'a Constraint>,
{
    let pwd = password.expose_secret();
    let mut result = ValidationResult::default();
    let mut required_failed = false;

    for constraint in constraints {
        // Check cancellation before each constraint (async only)
        #[cfg(feature = "async")]
        {
            if let Some(ref t) = token {
                if t.is_cancelled() {
                    result.failures.push(CANCELLED_MESSAGE.to_string());
                    result.cancelled = true;
                    break;
                }
            }
        }

        let Some(definition) = registry.get(constraint.constraint_type()) else {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "Skipping password constraint {} of unknown type {}",
                constraint.id(),
                constraint.constraint_type()
            );
            continue;
        };

        let check = definition.check(pwd, constraint);
        let passed = check.passed();
        if passed {
            result.passed_count += 1;
        } else if constraint.is_required() {
            required_failed = true;
        }
        if let Some(ref message) = check.message {
            result.failures.push(message.clone());
        }
        result.outcomes.push(ConstraintOutcome {
            constraint_id: constraint.id().to_string(),
            constraint_type: constraint.constraint_type().to_string(),
            required: constraint.is_required(),
            passed,
            message: check.message,
        });
    }

    #[cfg(feature = "tracing")]
    {
        if result.outcomes.len() < minimum_required as usize {
            tracing::warn!(
                "Password policy requires {} constraints but only {} apply",
                minimum_required,
                result.outcomes.len()
            );
        }
    }

    result.passed = !result.cancelled
        && !required_failed
        && result.passed_count >= minimum_required as usize;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Password evaluated: passed={} ({} of {} constraints met, {} required)",
        result.passed,
        result.passed_count,
        result.outcomes.len(),
        minimum_required
    );

    result
}

/// Async version that sends the validation result via channel.
///
/// Waits briefly before evaluating so that a caller validating on each
/// keystroke can cancel the token and start over.
#[cfg(feature = "async")]
pub async fn evaluate_tx(
    password: &SecretString,
    constraints: Vec<Constraint>,
    minimum_required: u32,
    token: CancellationToken,
    tx: mpsc::Sender<ValidationResult>,
) {
    use std::time::Duration;

    #[cfg(feature = "tracing")]
    tracing::info!("password validation is about to start...");

    tokio::time::sleep(Duration::from_millis(300)).await;
    let result = evaluate(password, &constraints, minimum_required, Some(token));

    #[cfg(feature = "tracing")]
    if let Err(e) = tx.send(result).await {
        tracing::error!("Failed to send password validation result: {}", e);
    }

    #[cfg(not(feature = "tracing"))]
    let _ = tx.send(result).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintKind;
    use crate::settings::{MINIMUM_CHARACTERS, SPECIAL_CHARACTERS, USE_CUSTOM_SPECIAL_CHARACTERS};

    fn secret(value: &str) -> SecretString {
        SecretString::new(value.to_string().into())
    }

    fn constraint(kind: ConstraintKind, minimum: i64, required: bool) -> Constraint {
        kind.definition()
            .create("authenticated")
            .with_setting(MINIMUM_CHARACTERS, minimum)
            .with_required(required)
    }

    fn run(password: &str, constraints: &[Constraint], minimum_required: u32) -> ValidationResult {
        #[cfg(feature = "async")]
        let result = evaluate(&secret(password), constraints, minimum_required, None);

        #[cfg(not(feature = "async"))]
        let result = evaluate(&secret(password), constraints, minimum_required);

        result
    }

    #[test]
    fn test_lower_case_missing() {
        let constraints = [constraint(ConstraintKind::LowerCase, 3, false)];
        let result = run("TESTPASSWORD", &constraints, 1);
        assert!(!result.passed);
        assert_eq!(result.failures, ["Add 3 more lower-cased letters."]);
    }

    #[test]
    fn test_lower_case_present() {
        let constraints = [constraint(ConstraintKind::LowerCase, 3, false)];
        let result = run("tEStPASSwORD", &constraints, 1);
        assert!(result.passed);
        assert!(result.failures.is_empty());
        assert_eq!(result.passed_count, 1);
    }

    #[test]
    fn test_custom_special_characters() {
        let special = ConstraintKind::SpecialCharacter
            .definition()
            .create("authenticated")
            .with_setting(MINIMUM_CHARACTERS, 3i64)
            .with_setting(USE_CUSTOM_SPECIAL_CHARACTERS, true)
            .with_setting(SPECIAL_CHARACTERS, "&%@$;+");
        let constraints = [special];

        assert!(run("tes&tpas;swor+d", &constraints, 1).passed);

        let result = run("testpassword", &constraints, 1);
        assert!(!result.passed);
        assert_eq!(result.failures, ["Add 3 more special characters."]);
    }

    #[test]
    fn test_minimum_required_not_reached() {
        let constraints = [
            constraint(ConstraintKind::LowerCase, 1, false),
            constraint(ConstraintKind::UpperCase, 1, false),
            constraint(ConstraintKind::Number, 1, false),
        ];
        let result = run("abcDEF", &constraints, 3);
        assert!(!result.passed);
        assert_eq!(result.passed_count, 2);
        assert_eq!(result.failures, ["Add at least one number."]);
    }

    #[test]
    fn test_optional_failure_tolerated_when_minimum_reached() {
        let constraints = [
            constraint(ConstraintKind::LowerCase, 1, false),
            constraint(ConstraintKind::UpperCase, 1, false),
            constraint(ConstraintKind::Number, 1, false),
        ];
        let result = run("abcDEF", &constraints, 2);
        assert!(result.passed);
        assert_eq!(result.passed_count, 2);
        // The unmet optional requirement is still reported.
        assert_eq!(result.failures, ["Add at least one number."]);
    }

    #[test]
    fn test_required_failure_is_fatal() {
        let constraints = [
            constraint(ConstraintKind::LowerCase, 1, false),
            constraint(ConstraintKind::UpperCase, 1, false),
            constraint(ConstraintKind::Number, 2, true),
        ];
        let result = run("abcDEF1", &constraints, 1);
        assert!(!result.passed);
        assert_eq!(result.passed_count, 2);
        let required: Vec<_> = result.required_failures().collect();
        assert_eq!(required.len(), 1);
        assert_eq!(required[0].constraint_id, "authenticated.number");
        assert_eq!(required[0].message.as_deref(), Some("Add at least one number."));
    }

    #[test]
    fn test_all_failures_reported() {
        let constraints = [
            constraint(ConstraintKind::LowerCase, 2, true),
            constraint(ConstraintKind::Number, 2, false),
            constraint(ConstraintKind::MinimumLength, 10, false),
        ];
        let result = run("", &constraints, 3);
        assert!(!result.passed);
        assert_eq!(
            result.failures,
            [
                "Add 2 more lower-cased letters.",
                "Add 2 more numbers.",
                "Add 10 more characters.",
            ]
        );
        assert_eq!(result.outcomes.len(), 3);
    }

    #[test]
    fn test_no_constraints() {
        assert!(run("anything", &[], 0).passed);
        assert!(!run("anything", &[], 1).passed);
    }

    #[test]
    fn test_unknown_type_skipped() {
        let constraints = [
            Constraint::new("authenticated", "history"),
            constraint(ConstraintKind::LowerCase, 1, false),
        ];
        let result = run("abc", &constraints, 1);
        assert!(result.passed);
        assert_eq!(result.outcomes.len(), 1);
        assert!(result.failures.is_empty());
    }
}

#[cfg(all(test, feature = "async"))]
mod async_tests {
    use super::*;
    use crate::constraints::ConstraintKind;
    use crate::settings::MINIMUM_CHARACTERS;

    fn constraints() -> Vec<Constraint> {
        vec![
            ConstraintKind::UpperCase
                .definition()
                .create("authenticated")
                .with_setting(MINIMUM_CHARACTERS, 2i64),
            ConstraintKind::Number.definition().create("authenticated"),
        ]
    }

    #[tokio::test]
    async fn test_evaluate_with_cancellation() {
        let token = CancellationToken::new();
        token.cancel();

        let pwd = SecretString::new("SomePassword123!".to_string().into());
        let result = evaluate(&pwd, &constraints(), 1, Some(token));

        assert!(result.cancelled);
        assert!(!result.passed);
        assert!(result.outcomes.is_empty());
        assert_eq!(result.failures, [CANCELLED_MESSAGE]);
    }

    #[tokio::test]
    async fn test_evaluate_without_cancellation() {
        let token = CancellationToken::new();

        let pwd = SecretString::new("TestPass123!".to_string().into());
        let result = evaluate(&pwd, &constraints(), 2, Some(token));

        assert!(!result.cancelled);
        assert!(result.passed);
    }

    #[tokio::test]
    async fn test_evaluate_tx() {
        let (tx, mut rx) = mpsc::channel(1);
        let token = CancellationToken::new();

        let pwd = SecretString::new("testpass".to_string().into());

        evaluate_tx(&pwd, constraints(), 1, token, tx).await;

        let result = rx.recv().await.expect("Should receive validation result");
        assert!(!result.passed);
        assert_eq!(
            result.failures,
            ["Add 2 more upper-cased letters.", "Add at least one number."]
        );
    }
}
