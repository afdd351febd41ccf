//! Merges the constraints of every policy that applies to a set of roles.
//!
//! Policies are visited from the highest priority down. A constraint type
//! taken from a higher-priority policy masks every constraint of that type
//! in lower-priority policies. Within one policy non-unique types are all
//! kept.

use std::collections::HashSet;

use crate::constraint::Constraint;
use crate::policy::Policy;

/// Resolved constraints in evaluation order, highest priority first.
///
/// Constraints without an id resolve like any other.
pub type ResolvedConstraints<'a> = Vec<&'a Constraint>;

/// Policies of the given roles, highest priority first.
///
/// Ties are broken by role id so the order is stable.
pub fn load_multiple_by_role_and_priority<'a, I, S>(policies: I, roles: &[S]) -> Vec<&'a Policy>
where
    I: IntoIterator<Item = &'a Policy>,
    S: AsRef<str>,
{
    let mut matching: Vec<&Policy> = policies
        .into_iter()
        .filter(|policy| roles.iter().any(|role| role.as_ref() == policy.role()))
        .collect();
    matching.sort_by(|a, b| b.priority().cmp(&a.priority()).then_with(|| a.role().cmp(b.role())));
    matching
}

/// The single highest-priority policy of the given roles.
pub fn load_by_role_and_priority<'a, I, S>(policies: I, roles: &[S]) -> Option<&'a Policy>
where
    I: IntoIterator<Item = &'a Policy>,
    S: AsRef<str>,
{
    load_multiple_by_role_and_priority(policies, roles)
        .into_iter()
        .next()
}

/// Resolves the constraints that apply to an account with `roles`.
///
/// No roles or no matching policy resolves to nothing.
pub fn resolve_constraints<'a, P, C, S>(
    policies: P,
    constraints: C,
    roles: &[S],
) -> ResolvedConstraints<'a>
where
    P: IntoIterator<Item = &'a Policy>,
    C: IntoIterator<Item = &'a Constraint>,
    S: AsRef<str>,
{
    let ordered = load_multiple_by_role_and_priority(policies, roles);
    let mut resolved = ResolvedConstraints::new();
    if ordered.is_empty() {
        return resolved;
    }

    let candidates: Vec<&Constraint> = constraints
        .into_iter()
        .filter(|constraint| ordered.iter().any(|policy| policy.id() == constraint.policy()))
        .collect();

    let mut seen_types: HashSet<&str> = HashSet::new();
    for policy in ordered {
        // Types are committed after the policy's pass so that repeated
        // non-unique types of the same policy do not mask each other.
        let mut accepted_types = HashSet::new();
        for &constraint in candidates.iter().filter(|c| c.policy() == policy.id()) {
            let constraint_type = constraint.constraint_type();
            if !seen_types.contains(constraint_type) {
                accepted_types.insert(constraint_type);
                resolved.push(constraint);
            }
        }
        seen_types.extend(accepted_types);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("Resolved {} password constraints for {} roles", resolved.len(), roles.len());

    resolved
}
