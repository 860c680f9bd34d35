//! Field diff between desired configuration and last observed state
//!
//! The service compares handle and email case-insensitively, so the diff
//! does too; display name is compared exactly. The password is never diffed
//! against a remote value (the service does not echo it): only the local
//! placeholder is consulted. Step order is fixed: email, handle, password,
//! display name. The identity-altering handle change runs after the less
//! disruptive email change, and credential changes run before profile
//! changes, so a single failure strands only the less critical tail.

use crate::mutation::{BlockedChange, Field, Mutation, MutationPlan};
use crate::spec::{AccountSpec, UpdatePolicy};
use crate::state::AccountState;

/// Case-insensitive equality used for handle and email
fn eq_fold(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Compute the ordered mutations needed to align `state` with `spec`
pub fn plan_update(
    spec: &AccountSpec,
    state: &AccountState,
    policy: &UpdatePolicy,
) -> MutationPlan {
    let mut plan = MutationPlan::new();

    if !eq_fold(&spec.email, &state.email) {
        if policy.allow_email_update {
            plan.steps.push(Mutation::SetEmail(spec.email.clone()));
        } else {
            plan.blocked.push(BlockedChange::new(
                Field::Email,
                format!(
                    "email updates are disabled by policy (current: {})",
                    state.email
                ),
            ));
        }
    }

    if !eq_fold(&spec.handle, &state.handle) {
        if policy.allow_handle_update {
            plan.steps.push(Mutation::SetHandle(spec.handle.clone()));
        } else {
            plan.blocked.push(BlockedChange::new(
                Field::Handle,
                format!(
                    "handle updates are disabled by policy (current: {})",
                    state.handle
                ),
            ));
        }
    }

    match spec.password.as_deref() {
        // Empty desired password: stop tracking a previously recorded
        // credential locally. Not a remote mutation.
        Some("") => {
            if state.password.is_some() {
                plan.steps.push(Mutation::ClearPasswordTracking);
            }
        }
        Some(password) => {
            if state.password.as_deref() != Some(password) {
                plan.steps.push(Mutation::SetPassword(password.to_string()));
            }
        }
        None => {}
    }

    if spec.display_name != state.display_name {
        plan.steps
            .push(Mutation::SetDisplayName(spec.display_name.clone()));
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AccountState {
        AccountState::new("did:plc:abc123", "alice.example", "a@example.com")
    }

    #[test]
    fn test_fixed_point_yields_no_mutations() {
        let spec = AccountSpec::new("alice.example", "a@example.com");
        let plan = plan_update(&spec, &state(), &UpdatePolicy::default());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_handle_and_email_compare_case_insensitively() {
        let spec = AccountSpec::new("Alice.Example", "A@Example.COM");
        let plan = plan_update(&spec, &state(), &UpdatePolicy::default());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_display_name_compares_exactly() {
        let current = state().with_display_name("Alice");
        let spec = AccountSpec::new("alice.example", "a@example.com").with_display_name("alice");
        let plan = plan_update(&spec, &current, &UpdatePolicy::default());
        assert_eq!(
            plan.steps,
            vec![Mutation::SetDisplayName(Some("alice".to_string()))]
        );
    }

    #[test]
    fn test_step_order_is_email_handle_password_display_name() {
        let current = state().with_display_name("Alice");
        let spec = AccountSpec::new("bob.example", "b@example.com")
            .with_password("s3cret")
            .with_display_name("Bob");

        let plan = plan_update(&spec, &current, &UpdatePolicy::default());
        assert_eq!(
            plan.steps,
            vec![
                Mutation::SetEmail("b@example.com".to_string()),
                Mutation::SetHandle("bob.example".to_string()),
                Mutation::SetPassword("s3cret".to_string()),
                Mutation::SetDisplayName(Some("Bob".to_string())),
            ]
        );
        assert!(plan.blocked.is_empty());
    }

    #[test]
    fn test_absent_password_is_left_alone() {
        let current = state().with_password("tracked");
        let spec = AccountSpec::new("alice.example", "a@example.com");
        let plan = plan_update(&spec, &current, &UpdatePolicy::default());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_empty_password_clears_tracking_only() {
        let current = state().with_password("tracked");
        let spec = AccountSpec::new("alice.example", "a@example.com").with_password("");
        let plan = plan_update(&spec, &current, &UpdatePolicy::default());
        assert_eq!(plan.steps, vec![Mutation::ClearPasswordTracking]);

        // Nothing to clear when nothing is tracked
        let plan = plan_update(&spec, &state(), &UpdatePolicy::default());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_changed_password_emits_update() {
        let current = state().with_password("old");
        let spec = AccountSpec::new("alice.example", "a@example.com").with_password("new");
        let plan = plan_update(&spec, &current, &UpdatePolicy::default());
        assert_eq!(plan.steps, vec![Mutation::SetPassword("new".to_string())]);
    }

    #[test]
    fn test_locked_policy_blocks_identity_changes() {
        let spec = AccountSpec::new("bob.example", "b@example.com").with_display_name("Bob");
        let plan = plan_update(&spec, &state(), &UpdatePolicy::locked());

        // Display name still flows; identity fields are blocked, not planned
        assert_eq!(
            plan.steps,
            vec![Mutation::SetDisplayName(Some("Bob".to_string()))]
        );
        assert_eq!(plan.blocked.len(), 2);
        assert_eq!(plan.blocked[0].field, Field::Email);
        assert_eq!(plan.blocked[1].field, Field::Handle);
    }

    #[test]
    fn test_permissive_policy_plans_identity_changes() {
        let spec = AccountSpec::new("bob.example", "b@example.com");
        let plan = plan_update(&spec, &state(), &UpdatePolicy::default());
        assert_eq!(
            plan.steps,
            vec![
                Mutation::SetEmail("b@example.com".to_string()),
                Mutation::SetHandle("bob.example".to_string()),
            ]
        );
        assert!(plan.blocked.is_empty());
    }
}
