//! Capability derivation: runs once per person before either engine.
//!
//! Expands compound roles and adds the aggregate tags the rotation
//! generator counts against (`total_soldiers`, `total_command`, ...).
//! Pure data enrichment: no scheduling decisions are made here.

use crate::{config::RolePolicy, model::Person, types::Role};

fn has(roles: &[Role], name: &str) -> bool {
    roles.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn push_missing(roles: &mut Vec<Role>, name: &str) {
    if !has(roles, name) {
        roles.push(name.to_string());
    }
}

/// Finalized, ordered capability set for one person.
///
/// Only commanders in field units pick up soldier duty; officers and
/// the compound role do not.
pub fn derive_capabilities(
    primary: &str,
    secondary: &[Role],
    unit: Option<&str>,
    policy: &RolePolicy,
) -> Vec<Role> {
    let mut roles: Vec<Role> = Vec::new();
    let primary = primary.trim();
    if !primary.is_empty() {
        roles.push(primary.to_string());
    }
    for role in secondary {
        let role = role.trim();
        if !role.is_empty() && !roles.iter().any(|r| r == role) {
            roles.push(role.to_string());
        }
    }

    if has(&roles, &policy.compound_role) {
        push_missing(&mut roles, &policy.officer_role);
        push_missing(&mut roles, &policy.commander_role);
    }

    let in_field = policy.is_field_unit(unit);
    let is_staff = policy.staff_roles.iter().any(|s| has(&roles, s));
    let is_fighter = !is_staff && in_field && policy.fighter_roles.iter().any(|f| has(&roles, f));

    if is_staff {
        push_missing(&mut roles, &policy.staff_extra_role);
        push_missing(&mut roles, &policy.command_aggregate_role);
        if in_field && has(&roles, &policy.commander_role) {
            push_missing(&mut roles, &policy.soldier_role);
            push_missing(&mut roles, &policy.field_role);
            push_missing(&mut roles, &policy.extra_role);
        }
    }

    if is_fighter {
        push_missing(&mut roles, &policy.extra_role);
        push_missing(&mut roles, &policy.field_role);
        push_missing(&mut roles, &policy.soldier_role);
    }

    if !in_field {
        roles.retain(|r| !has(&policy.fighter_roles, r));
    }

    if roles.is_empty() && !primary.is_empty() {
        roles.push(primary.to_string());
    }
    roles
}

/// Apply `derive_capabilities` to a person in place, treating their
/// current capability list as the secondary roles.
pub fn finalize_person(person: &mut Person, policy: &RolePolicy) {
    let secondary: Vec<Role> = person
        .capabilities
        .iter()
        .filter(|r| **r != person.primary_role)
        .cloned()
        .collect();
    person.capabilities =
        derive_capabilities(&person.primary_role, &secondary, person.unit.as_deref(), policy);
}

pub fn finalize_people(people: &mut [Person], policy: &RolePolicy) {
    for person in people.iter_mut() {
        finalize_person(person, policy);
    }
}
