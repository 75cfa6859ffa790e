//! Candidate score for one (person, role) pick on a normal day.
//! Lower is better. Pure: all state arrives through CandidateContext.

use crate::{
    calendar::is_saturday,
    config::{RolePolicy, RotationPolicy},
    model::{Person, PreferenceKind},
};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Everything the score depends on, gathered by the trial builder.
#[derive(Debug, Clone)]
pub struct CandidateContext<'a> {
    pub person:            &'a Person,
    pub date:              NaiveDate,
    /// Assignments so far, plus one on the penultimate day (the closing
    /// day will copy it).
    pub projected_total:   usize,
    /// Unavailable dates inside the campaign.
    pub unavailable_days:  usize,
    pub worked_yesterday:  bool,
    /// Days since the last duty; None if the person has not worked yet.
    pub days_since_last:   Option<i64>,
    pub streak:            u32,
    /// (1-based day in the post-intensive window, duties already worked in it).
    pub post_intensive:    Option<(i64, usize)>,
    /// Times this person already filled this role in the trial.
    pub role_fills:        usize,
    /// Another non-specialist from the same unit is already on duty today.
    pub unit_already_today: bool,
}

/// A lone duty day wedged between two days off is never scheduled.
pub fn is_sandwiched(worked_yesterday: bool, unavailable_tomorrow: bool) -> bool {
    !worked_yesterday && unavailable_tomorrow
}

/// Whether picking `person` for `role` would put a second non-specialist
/// from the same unit on duty today. Specialist roles and the staff unit
/// are exempt.
pub fn is_unit_duplicate(
    person: &Person,
    role: &str,
    units_today: &HashSet<&str>,
    roles: &RolePolicy,
) -> bool {
    !roles.is_specialist(role)
        && !roles.is_staff_unit(person.unit())
        && person.unit().is_some_and(|u| units_today.contains(u))
}

pub fn rotation_score(ctx: &CandidateContext<'_>, policy: &RotationPolicy, jitter: f64) -> f64 {
    let saturday = is_saturday(ctx.date);

    // Workload: the high exponent makes whoever worked least win almost always.
    let mut score = (ctx.projected_total as f64).powi(policy.workload_exponent) * policy.workload_scale;

    // Catch-up for people with fewer available days.
    score -= ctx.unavailable_days as f64 * policy.unavailability_bonus;

    score += jitter;

    for pref in ctx.person.active_preferences(ctx.date) {
        match pref.kind {
            PreferenceKind::PreferWeekend => {
                score += if saturday { -policy.day_preference_major } else { policy.day_preference_minor };
            }
            PreferenceKind::PreferWeekday => {
                score += if saturday { policy.day_preference_major } else { -policy.day_preference_minor };
            }
            _ => {}
        }
    }

    // Weekend pairing: Saturday goes to whoever also worked Friday.
    if saturday {
        score += if ctx.worked_yesterday { -policy.saturday_pairing } else { policy.saturday_pairing };
    }

    if !ctx.worked_yesterday {
        if let Some(days) = ctx.days_since_last {
            if days < 3 {
                score += policy.short_rest_penalty;
            }
            if days == 2 {
                score += policy.single_rest_day_penalty;
            }
            if days < 2 {
                score += policy.no_rest_penalty;
            }
        }
    }

    if !saturday && (1..3).contains(&ctx.streak) {
        score -= policy.short_streak_bonus;
    }

    if let Some((offset, worked)) = ctx.post_intensive {
        // Worked every day of the window so far.
        if offset > 1 && worked as i64 == offset - 1 {
            score += offset as f64 * policy.post_intensive_ramp;
        }
    }

    score += ctx.role_fills as f64 * policy.role_repeat_weight;

    if ctx.unit_already_today {
        score += policy.unit_duplicate_penalty;
    }

    score
}
