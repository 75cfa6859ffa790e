//! Headcount check applied to every finished trial.
//!
//! RULE: Intensive days and the two closing days are never checked.
//! Every other day must meet each requirement's target, boost included.

use crate::{
    calendar::CampaignCalendar,
    requirement::{target_on, Boost, ShiftRequirement},
    roster::Roster,
    types::Role,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// A day on which a role fell short of its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    pub date:     NaiveDate,
    pub role:     Role,
    pub assigned: usize,
    pub target:   u32,
}

/// Every shortfall in calendar order, requirements in declaration order.
pub fn shortfalls(
    roster: &Roster,
    requirements: &[ShiftRequirement],
    calendar: &CampaignCalendar,
    boost: &Boost,
    boosted_role: &str,
) -> Vec<Shortfall> {
    let mut per_day: HashMap<(NaiveDate, &str), usize> = HashMap::new();
    for s in roster.shifts() {
        *per_day.entry((s.date, s.role.as_str())).or_default() += 1;
    }

    let mut found = Vec::new();
    for &day in calendar.days() {
        if calendar.is_exempt(day) {
            continue;
        }
        for req in requirements {
            let target = target_on(req, day, boost, boosted_role);
            let assigned = per_day.get(&(day, req.role.as_str())).copied().unwrap_or(0);
            if assigned < target as usize {
                found.push(Shortfall { date: day, role: req.role.clone(), assigned, target });
            }
        }
    }
    found
}

pub fn first_shortfall(
    roster: &Roster,
    requirements: &[ShiftRequirement],
    calendar: &CampaignCalendar,
    boost: &Boost,
    boosted_role: &str,
) -> Option<Shortfall> {
    shortfalls(roster, requirements, calendar, boost, boosted_role).into_iter().next()
}
