//! Slack-filling post-pass.
//!
//! Field soldiers left with more idle days than the target get extra
//! duty days, added in bursts so each boosted day gains a meaningful
//! group rather than a lone extra.
//!
//! RULES:
//!   - Never touches intensive days or the two closing days.
//!   - A person gains at most one shift per day and never works a day
//!     adjacent to one they already work.
//!   - A day's additions are committed together or not at all.

use crate::{
    calendar::{tomorrow, yesterday, CampaignCalendar},
    config::{RolePolicy, SlackPolicy},
    model::Person,
    roster::{Roster, Shift},
    types::PersonId,
};
use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Extra soldiers added per boosted day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlackReport {
    pub boosted_days: BTreeMap<NaiveDate, usize>,
}

impl SlackReport {
    pub fn total_added(&self) -> usize {
        self.boosted_days.values().sum()
    }
}

struct SlackPerson<'a> {
    person: &'a Person,
    slack:  usize,
}

struct Filler<'a> {
    pool:        Vec<SlackPerson<'a>>,
    assignments: BTreeMap<NaiveDate, BTreeSet<PersonId>>,
    extra_role:  &'a str,
    added:       Vec<Shift>,
}

impl<'a> Filler<'a> {
    fn works(&self, person_id: &str, day: NaiveDate) -> bool {
        self.assignments.get(&day).is_some_and(|set| set.contains(person_id))
    }

    fn can_add(&self, person: &Person, day: NaiveDate) -> bool {
        !person.is_unavailable(day)
            && !self.works(&person.id, day)
            && !self.works(&person.id, yesterday(day))
            && !self.works(&person.id, tomorrow(day))
    }

    fn potential(&self, day: NaiveDate) -> usize {
        self.pool
            .iter()
            .filter(|s| s.slack > 0 && self.can_add(s.person, day))
            .count()
    }

    /// Pool indices of up to `limit` people who could take `day`.
    fn pick(&self, day: NaiveDate, limit: usize) -> Vec<usize> {
        self.pool
            .iter()
            .enumerate()
            .filter(|(_, s)| s.slack > 0 && self.can_add(s.person, day))
            .map(|(i, _)| i)
            .take(limit)
            .collect()
    }

    fn commit(&mut self, day: NaiveDate, picked: &[usize], tag: &str) {
        for &i in picked {
            let entry = &mut self.pool[i];
            entry.slack -= 1;
            let pid = entry.person.id.clone();
            self.assignments.entry(day).or_default().insert(pid.clone());
            self.added.push(Shift::new(format!("{day}-{tag}-{pid}"), day, self.extra_role, pid));
        }
    }
}

/// Add extra shifts for field soldiers with more than `target_idle_days`
/// idle days, at most `max_daily_boost` per day. A zero boost returns the
/// roster unchanged.
pub fn fill_slack(
    roster: Roster,
    people: &[Person],
    calendar: &CampaignCalendar,
    target_idle_days: usize,
    max_daily_boost: usize,
    policy: &SlackPolicy,
    roles: &RolePolicy,
) -> (Roster, SlackReport) {
    let mut report = SlackReport::default();
    if max_daily_boost == 0 {
        return (roster, report);
    }

    let mut pool: Vec<SlackPerson<'_>> = people
        .iter()
        .filter(|p| p.can_fill(&roles.field_role))
        .filter_map(|p| {
            let idle = roster.idle_days(&p.id, calendar);
            (idle > target_idle_days).then(|| SlackPerson { person: p, slack: idle - target_idle_days })
        })
        .collect();
    // Most idle first; stable on input order.
    pool.sort_by(|a, b| b.slack.cmp(&a.slack));
    info!("Slack fill: {} soldiers above {} idle days", pool.len(), target_idle_days);

    let mut filler = Filler {
        pool,
        assignments: roster.assignment_map(),
        extra_role: &roles.extra_role,
        added: Vec::new(),
    };
    let burst_tag = format!("{}_fill_burst", roles.extra_role);
    let fill_tag = format!("{}_fill", roles.extra_role);

    // ── Burst pass: the best few days of each week ──────────────────────────
    for week in calendar.iso_weeks() {
        let mut ranked: Vec<(NaiveDate, usize)> = week.iter().map(|&d| (d, filler.potential(d))).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        for &(day, _) in ranked.iter().take(policy.burst_days_per_week) {
            let picked = filler.pick(day, max_daily_boost);
            if picked.len() >= policy.min_commit {
                filler.commit(day, &picked, &burst_tag);
                report.boosted_days.insert(day, picked.len());
            } else {
                debug!("{day}: burst of {} below commit threshold", picked.len());
            }
        }
    }

    // ── Top-up pass: any eligible day with room left ─────────────────────────
    for &day in calendar.days() {
        if calendar.is_exempt(day) {
            continue;
        }
        let existing = report.boosted_days.get(&day).copied().unwrap_or(0);
        if existing >= max_daily_boost {
            continue;
        }
        let picked = filler.pick(day, max_daily_boost - existing);
        if !picked.is_empty() && existing + picked.len() >= policy.min_commit {
            filler.commit(day, &picked, &fill_tag);
            report.boosted_days.insert(day, existing + picked.len());
        }
    }

    info!(
        "Slack fill boosted {} days with {} extra shifts",
        report.boosted_days.len(),
        filler.added.len()
    );
    let mut roster = roster;
    roster.extend(filler.added);
    (roster, report)
}
