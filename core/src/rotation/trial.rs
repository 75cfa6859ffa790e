//! One randomized construction of a full campaign roster.
//!
//! Days are processed strictly in calendar order:
//!   1. Intensive days: everyone available works, no scoring.
//!   2. Terminal day: copies the previous day's shifts.
//!   3. Normal days: greedy fill, rarest role first, best score wins.
//!
//! RULES:
//!   - At most one shift per person per day.
//!   - A person never works a day they are unavailable.
//!   - All randomness comes from the trial's own TrialRng.

use super::scoring::{is_sandwiched, is_unit_duplicate, rotation_score, CandidateContext};
use super::validity::{first_shortfall, Shortfall};
use crate::{
    calendar::{tomorrow, yesterday, CampaignCalendar},
    config::PolicyConfig,
    model::Person,
    requirement::{target_on, Boost, ShiftRequirement},
    rng::TrialRng,
    roster::{Roster, Shift},
    types::{Role, TrialIndex},
};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A normal day the greedy fill gave up on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayStall {
    pub date:      NaiveDate,
    /// Roles still short when no candidate remained, with the missing count.
    pub remaining: Vec<(Role, u32)>,
}

/// A finished trial with its validity verdict.
#[derive(Debug, Clone, Serialize)]
pub struct TrialOutcome {
    pub trial:     TrialIndex,
    pub roster:    Roster,
    pub shortfall: Option<Shortfall>,
    pub stalls:    Vec<DayStall>,
}

impl TrialOutcome {
    pub fn is_valid(&self) -> bool {
        self.shortfall.is_none()
    }
}

/// Read-only inputs shared by every trial of one generator call.
pub struct TrialInputs<'a> {
    pub people:       &'a [Person],
    pub requirements: &'a [ShiftRequirement],
    pub calendar:     &'a CampaignCalendar,
    pub boost:        &'a Boost,
    pub policy:       &'a PolicyConfig,
}

// ── Per-trial working state ──────────────────────────────────────────────────

struct Ledger {
    shift_counts: Vec<usize>,
    last_worked:  Vec<Option<NaiveDate>>,
    streaks:      Vec<u32>,
    role_fills:   Vec<HashMap<Role, usize>>,
    /// Duties inside the post-intensive window.
    post_window:  Vec<usize>,
}

impl Ledger {
    fn new(n: usize) -> Self {
        Self {
            shift_counts: vec![0; n],
            last_worked:  vec![None; n],
            streaks:      vec![0; n],
            role_fills:   vec![HashMap::new(); n],
            post_window:  vec![0; n],
        }
    }
}

struct DailyNeed<'r> {
    role:      &'r str,
    remaining: u32,
    rarity:    usize,
}

pub struct TrialBuilder<'a> {
    inputs:           &'a TrialInputs<'a>,
    rng:              TrialRng,
    verbose:          bool,
    unavailable_days: Vec<usize>,
    ledger:           Ledger,
    roster:           Roster,
    stalls:           Vec<DayStall>,
}

impl<'a> TrialBuilder<'a> {
    pub fn new(inputs: &'a TrialInputs<'a>, rng: TrialRng, verbose: bool) -> Self {
        let cal = inputs.calendar;
        let unavailable_days = inputs
            .people
            .iter()
            .map(|p| p.unavailable_days_between(cal.first(), cal.last()))
            .collect();
        Self {
            inputs,
            rng,
            verbose,
            unavailable_days,
            ledger: Ledger::new(inputs.people.len()),
            roster: Roster::new(),
            stalls: Vec::new(),
        }
    }

    pub fn run(mut self) -> TrialOutcome {
        let cal = self.inputs.calendar;
        for &day in cal.days() {
            if cal.is_intensive(day) {
                self.intensive_day(day);
            } else if cal.is_terminal(day) {
                self.copy_previous_day(day);
            } else {
                self.normal_day(day);
            }
        }

        let shortfall = first_shortfall(
            &self.roster,
            self.inputs.requirements,
            cal,
            self.inputs.boost,
            &self.inputs.policy.roles.field_role,
        );
        debug!(
            "trial {}: {} shifts, {}",
            self.rng.trial,
            self.roster.len(),
            if shortfall.is_some() { "invalid" } else { "valid" }
        );
        TrialOutcome { trial: self.rng.trial, roster: self.roster, shortfall, stalls: self.stalls }
    }

    fn record(&mut self, idx: usize, day: NaiveDate, role: &str, id: String) {
        let person = &self.inputs.people[idx];
        self.roster.push(Shift::new(id, day, role, person.id.clone()));
        self.ledger.shift_counts[idx] += 1;
        self.ledger.last_worked[idx] = Some(day);
        self.ledger.streaks[idx] += 1;
        *self.ledger.role_fills[idx].entry(role.to_string()).or_default() += 1;
        let window = self.inputs.policy.rotation.post_intensive_window_days;
        if self.inputs.calendar.post_intensive_offset(day, window).is_some() {
            self.ledger.post_window[idx] += 1;
        }
    }

    // ── Intensive period ─────────────────────────────────────────────────────

    fn intensive_role(&self, person: &Person) -> Role {
        let roles = &self.inputs.policy.roles;
        if let Some(role) = person
            .capabilities
            .iter()
            .find(|c| roles.intensive_priority.iter().any(|p| p.eq_ignore_ascii_case(c)))
        {
            return role.clone();
        }
        if person.can_fill(&roles.soldier_role) {
            return roles.soldier_role.clone();
        }
        person
            .capabilities
            .first()
            .cloned()
            .unwrap_or_else(|| roles.intensive_fallback.clone())
    }

    fn intensive_day(&mut self, day: NaiveDate) {
        let inputs = self.inputs;
        for (idx, person) in inputs.people.iter().enumerate() {
            if person.is_unavailable(day) {
                continue;
            }
            let role = self.intensive_role(person);
            let id = format!("{day}-{role}-alat-{}", person.id);
            self.record(idx, day, &role, id);
        }
    }

    // ── Terminal day ─────────────────────────────────────────────────────────

    fn copy_previous_day(&mut self, day: NaiveDate) {
        let prev = yesterday(day);
        let copied: Vec<(String, Role)> = self
            .roster
            .on(prev)
            .map(|s| (s.person_id.clone(), s.role.clone()))
            .collect();
        let inputs = self.inputs;
        let index: HashMap<&str, usize> = inputs
            .people
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.as_str(), i))
            .collect();
        for (pid, role) in copied {
            let Some(&idx) = index.get(pid.as_str()) else { continue };
            let id = format!("{day}-{role}-copy-{pid}");
            self.record(idx, day, &role, id);
        }
    }

    // ── Normal days ──────────────────────────────────────────────────────────

    fn normal_day(&mut self, day: NaiveDate) {
        let inputs = self.inputs;
        let roles = &inputs.policy.roles;
        let policy = &inputs.policy.rotation;
        let prev = yesterday(day);
        let next = tomorrow(day);

        let mut needs: Vec<DailyNeed<'_>> = inputs
            .requirements
            .iter()
            .map(|req| DailyNeed {
                role:      req.role.as_str(),
                remaining: target_on(req, day, inputs.boost, &roles.field_role),
                rarity:    inputs.people.iter().filter(|p| p.can_fill(&req.role)).count(),
            })
            .collect();
        // Stable: equal rarity keeps declaration order.
        needs.sort_by_key(|n| n.rarity);

        for idx in 0..inputs.people.len() {
            if self.ledger.last_worked[idx] != Some(prev) {
                self.ledger.streaks[idx] = 0;
            }
        }

        let available: Vec<usize> = (0..inputs.people.len())
            .filter(|&i| !inputs.people[i].is_unavailable(day))
            .collect();
        let mut on_duty: HashSet<usize> = HashSet::new();
        let mut units_today: HashSet<&str> = HashSet::new();
        let mut counters: HashMap<&str, usize> = HashMap::new();
        let penultimate = inputs.calendar.is_penultimate(day);
        let post_offset = inputs.calendar.post_intensive_offset(day, policy.post_intensive_window_days);

        while needs.iter().any(|n| n.remaining > 0) {
            let mut best: Option<(f64, usize, usize)> = None;

            for (ni, need) in needs.iter().enumerate() {
                if need.remaining == 0 {
                    continue;
                }
                for &idx in &available {
                    if on_duty.contains(&idx) {
                        continue;
                    }
                    let person = &inputs.people[idx];
                    if !person.can_fill(need.role) {
                        continue;
                    }
                    let last = self.ledger.last_worked[idx];
                    let worked_yesterday = last == Some(prev);
                    if is_sandwiched(worked_yesterday, person.is_unavailable(next)) {
                        continue;
                    }

                    let unit_already_today = is_unit_duplicate(person, need.role, &units_today, roles);

                    let ctx = CandidateContext {
                        person,
                        date: day,
                        projected_total: self.ledger.shift_counts[idx] + usize::from(penultimate),
                        unavailable_days: self.unavailable_days[idx],
                        worked_yesterday,
                        days_since_last: last.map(|d| (day - d).num_days()),
                        streak: self.ledger.streaks[idx],
                        post_intensive: post_offset.map(|o| (o, self.ledger.post_window[idx])),
                        role_fills: self.ledger.role_fills[idx].get(need.role).copied().unwrap_or(0),
                        unit_already_today,
                    };
                    let jitter = self.rng.jitter(policy.jitter_amplitude);
                    let score = rotation_score(&ctx, policy, jitter);

                    if best.is_none_or(|(s, _, _)| score < s) {
                        best = Some((score, ni, idx));
                    }
                }
            }

            let Some((_, ni, idx)) = best else {
                let remaining: Vec<(Role, u32)> = needs
                    .iter()
                    .filter(|n| n.remaining > 0)
                    .map(|n| (n.role.to_string(), n.remaining))
                    .collect();
                if self.verbose {
                    warn!("{day}: no candidate left, still short {remaining:?}");
                }
                self.stalls.push(DayStall { date: day, remaining });
                break;
            };

            let role = needs[ni].role;
            let n = counters.entry(role).or_default();
            *n += 1;
            let id = format!("{day}-{role}-{n}-{}", inputs.people[idx].id);
            self.record(idx, day, role, id);

            on_duty.insert(idx);
            if !roles.is_specialist(role) {
                if let Some(unit) = inputs.people[idx].unit() {
                    units_today.insert(unit);
                }
            }
            needs[ni].remaining -= 1;
        }
    }
}
