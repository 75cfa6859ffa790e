//! Candidate ranking: interactive, one role-slot at a time.
//!
//! The ranker owns the caller's slot snapshot for the duration of an
//! assignment session. Each call to `rank_candidates`:
//!   1. Drops people failing a hard filter (capability, already on the
//!      slot, must-vacation date, overlapping duty, insufficient rest)
//!   2. Scores the rest with independent additive terms
//!   3. Returns them ascending by score, ties by person id
//!
//! `commit_assignment` writes the choice back so the next ranking sees it.
//! Single-writer: callers serialize access.

use crate::{
    calendar::is_weekend,
    config::RankingPolicy,
    error::{RotaError, RotaResult},
    model::{Campaign, DutySlot, Person, PreferenceKind},
    types::{PersonId, Role, SlotId},
    vacation::VacationBook,
};
use chrono::{Duration, NaiveDateTime};
use std::collections::{BTreeSet, HashMap};

// ── Derived per-person state ─────────────────────────────────────────────────

/// Slots currently held by one person, as indices into the ranker's snapshot.
#[derive(Debug, Clone, Default)]
pub struct PersonState {
    pub person_id: PersonId,
    slots:         Vec<usize>,
}

impl PersonState {
    fn new(person_id: PersonId) -> Self {
        Self { person_id, slots: Vec::new() }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn total_hours(&self, snapshot: &[DutySlot]) -> f64 {
        self.slots.iter().map(|&i| snapshot[i].duration_hours()).sum()
    }

    pub fn last_end(&self, snapshot: &[DutySlot]) -> Option<NaiveDateTime> {
        self.slots.iter().map(|&i| snapshot[i].end).max()
    }

    pub fn held<'a>(&'a self, snapshot: &'a [DutySlot]) -> impl Iterator<Item = &'a DutySlot> {
        self.slots.iter().map(move |&i| &snapshot[i])
    }

    fn holds(&self, slot_idx: usize) -> bool {
        self.slots.contains(&slot_idx)
    }
}

// ── Scored output ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub person_id:        PersonId,
    pub name:             String,
    pub total_score:      f64,
    pub vacation_penalty: f64,
    pub fairness:         f64,
    pub preference:       f64,
    pub unit_cohesion:    f64,
    pub role_match:       f64,
}

impl ScoredCandidate {
    pub fn on_vacation(&self) -> bool {
        self.vacation_penalty > 0.0
    }

    /// Compact list of the non-zero components.
    pub fn breakdown(&self) -> String {
        let mut parts = Vec::new();
        if self.vacation_penalty > 0.0 {
            parts.push(format!("vacation:{:.0}", self.vacation_penalty));
        }
        parts.push(format!("fairness:{:.1}", self.fairness));
        if self.preference != 0.0 {
            parts.push(format!("pref:{:.1}", self.preference));
        }
        if self.unit_cohesion != 0.0 {
            parts.push(format!("unit:{:.1}", self.unit_cohesion));
        }
        if self.role_match != 0.0 {
            parts.push(format!("role:{:.1}", self.role_match));
        }
        format!("[{}]", parts.join(", "))
    }
}

/// One open (slot, role) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSlot {
    pub slot_id:   SlotId,
    pub role:      Role,
    pub remaining: u32,
}

// ── Ranker ───────────────────────────────────────────────────────────────────

pub struct CandidateRanker {
    people:     Vec<Person>,
    states:     Vec<PersonState>,
    person_idx: HashMap<PersonId, usize>,
    slots:      Vec<DutySlot>,
    slot_idx:   HashMap<SlotId, usize>,
    vacations:  VacationBook,
    campaign:   Campaign,
    policy:     RankingPolicy,
}

impl CandidateRanker {
    /// Build from a snapshot. Existing assignments seed each person's state;
    /// assignments naming unknown people are kept on the slot but ignored here.
    pub fn new(
        people: Vec<Person>,
        vacations: VacationBook,
        campaign: Campaign,
        slots: Vec<DutySlot>,
        policy: RankingPolicy,
    ) -> RotaResult<Self> {
        if let Some(bad) = slots.iter().find(|s| !s.has_valid_window()) {
            return Err(RotaError::InvalidSlotWindow { slot_id: bad.id.clone() });
        }

        let person_idx: HashMap<PersonId, usize> = people
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        let slot_idx: HashMap<SlotId, usize> = slots
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();

        let mut states: Vec<PersonState> =
            people.iter().map(|p| PersonState::new(p.id.clone())).collect();
        for (i, slot) in slots.iter().enumerate() {
            for pid in slot.all_assigned() {
                if let Some(&p) = person_idx.get(&pid) {
                    if !states[p].holds(i) {
                        states[p].slots.push(i);
                    }
                }
            }
        }

        log::debug!(
            "ranker ready: {} people, {} slots, {} vacation days",
            people.len(),
            slots.len(),
            vacations.len()
        );

        Ok(Self {
            people,
            states,
            person_idx,
            slots,
            slot_idx,
            vacations,
            campaign,
            policy,
        })
    }

    pub fn slots(&self) -> &[DutySlot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: &str) -> Option<&DutySlot> {
        self.slot_idx.get(slot_id).map(|&i| &self.slots[i])
    }

    pub fn state(&self, person_id: &str) -> Option<&PersonState> {
        self.person_idx.get(person_id).map(|&i| &self.states[i])
    }

    /// Hand the mutated snapshot back to the caller.
    pub fn into_slots(self) -> Vec<DutySlot> {
        self.slots
    }

    /// Every short (slot, role) among assignable slots, in snapshot order.
    pub fn unfilled_slots(&self) -> Vec<OpenSlot> {
        self.slots
            .iter()
            .filter(|s| s.is_assignable())
            .flat_map(|s| {
                s.unfilled_roles().into_iter().map(|(role, remaining)| OpenSlot {
                    slot_id: s.id.clone(),
                    role,
                    remaining,
                })
            })
            .collect()
    }

    /// Eligible people for `role` on `slot_id`, best first.
    pub fn rank_candidates(
        &self,
        slot_id: &str,
        role: &str,
        excluded: &BTreeSet<PersonId>,
    ) -> RotaResult<Vec<ScoredCandidate>> {
        let &target_idx = self
            .slot_idx
            .get(slot_id)
            .ok_or_else(|| RotaError::UnknownSlot { slot_id: slot_id.to_string() })?;
        let target = &self.slots[target_idx];
        let date = target.date();
        let ratios = self.role_ratio_averages();

        let mut candidates: Vec<ScoredCandidate> = self
            .people
            .iter()
            .zip(&self.states)
            .filter(|(person, state)| {
                person.can_fill(role)
                    && !excluded.contains(&person.id)
                    && !person.must_be_off(date)
                    && !self.has_overlap(state, target)
                    && self.has_enough_rest(person, state, target)
            })
            .map(|(person, state)| self.score(person, state, target, role, excluded, &ratios))
            .collect();

        candidates.sort_by(|a, b| {
            a.total_score
                .total_cmp(&b.total_score)
                .then_with(|| a.person_id.cmp(&b.person_id))
        });
        Ok(candidates)
    }

    /// Record `person_id` under `role` on `slot_id`. Idempotent.
    /// Returns false when the person already held that role on the slot.
    pub fn commit_assignment(&mut self, slot_id: &str, role: &str, person_id: &str) -> RotaResult<bool> {
        let &s = self
            .slot_idx
            .get(slot_id)
            .ok_or_else(|| RotaError::UnknownSlot { slot_id: slot_id.to_string() })?;
        let &p = self
            .person_idx
            .get(person_id)
            .ok_or_else(|| RotaError::UnknownPerson { person_id: person_id.to_string() })?;

        let inserted = self.slots[s].assign(role, person_id);
        if !self.states[p].holds(s) {
            self.states[p].slots.push(s);
        }
        if inserted {
            log::debug!("committed {person_id} as {role} on {slot_id}");
        }
        Ok(inserted)
    }

    // ── Hard filters ─────────────────────────────────────────────────────────

    fn has_overlap(&self, state: &PersonState, target: &DutySlot) -> bool {
        state.held(&self.slots).any(|held| held.overlaps(target))
    }

    /// None when the interval does not fit a `Duration`.
    fn required_rest(&self, prior: &DutySlot, multiplier: f64) -> Option<Duration> {
        let hours = prior.duration_hours().min(self.campaign.rest_cap_hours) * multiplier;
        Duration::try_milliseconds((hours * 3_600_000.0).round() as i64)
    }

    /// `from + rest`, or None when either the rest or the sum overflows.
    fn rested_at(&self, from: NaiveDateTime, prior: &DutySlot, multiplier: f64) -> Option<NaiveDateTime> {
        self.required_rest(prior, multiplier)
            .and_then(|rest| from.checked_add_signed(rest))
    }

    /// Rest before `target` after the latest earlier duty, and rest after
    /// `target` before the earliest later duty. An interval too large to
    /// represent never counts as rested.
    fn has_enough_rest(&self, person: &Person, state: &PersonState, target: &DutySlot) -> bool {
        let prior = state
            .held(&self.slots)
            .filter(|held| held.end <= target.start)
            .max_by_key(|held| held.end);
        if let Some(prior) = prior {
            let multiplier = person.rest_multiplier(target.date());
            match self.rested_at(prior.end, prior, multiplier) {
                Some(ready) if target.start >= ready => {}
                _ => return false,
            }
        }

        let next = state
            .held(&self.slots)
            .filter(|held| held.start >= target.end)
            .min_by_key(|held| held.start);
        if let Some(next) = next {
            let multiplier = person.rest_multiplier(next.date());
            match self.rested_at(target.end, target, multiplier) {
                Some(ready) if next.start >= ready => {}
                _ => return false,
            }
        }
        true
    }

    // ── Soft scoring ─────────────────────────────────────────────────────────

    fn work_rest_ratio(&self, person: &Person, state: &PersonState) -> f64 {
        state.total_hours(&self.slots) / (self.vacations.days_taken(&person.id) as f64 + 1.0)
    }

    /// (sum of ratios, group size) per primary role.
    fn role_ratio_averages(&self) -> HashMap<&str, (f64, usize)> {
        let mut groups: HashMap<&str, (f64, usize)> = HashMap::new();
        for (person, state) in self.people.iter().zip(&self.states) {
            let entry = groups.entry(person.primary_role.as_str()).or_default();
            entry.0 += self.work_rest_ratio(person, state);
            entry.1 += 1;
        }
        groups
    }

    fn fairness(&self, person: &Person, state: &PersonState, ratios: &HashMap<&str, (f64, usize)>) -> f64 {
        let Some(&(sum, count)) = ratios.get(person.primary_role.as_str()) else {
            return 0.0;
        };
        if count <= 1 {
            return 0.0;
        }
        let average = sum / count as f64;
        (average - self.work_rest_ratio(person, state)).max(0.0) * self.policy.fairness_multiplier
    }

    fn preference_score(&self, person: &Person, target: &DutySlot, excluded: &BTreeSet<PersonId>) -> f64 {
        let date = target.date();
        let slot_name = target.name.to_lowercase();
        let weekend = is_weekend(date);
        let names_slot = |fragment: &str| {
            let fragment = fragment.trim().to_lowercase();
            !fragment.is_empty() && slot_name.contains(&fragment)
        };
        let p = &self.policy;

        person
            .active_preferences(date)
            .map(|pref| {
                let w = pref.weight();
                match pref.kind {
                    PreferenceKind::PairWith if excluded.contains(pref.target.trim()) => -p.pair_with_bonus * w,
                    PreferenceKind::AvoidPerson if excluded.contains(pref.target.trim()) => p.avoid_person_penalty * w,
                    PreferenceKind::PreferMission if names_slot(&pref.target) => -p.prefer_mission_bonus * w,
                    PreferenceKind::AvoidMission if names_slot(&pref.target) => p.avoid_mission_penalty * w,
                    PreferenceKind::PreferWeekend if weekend => -p.day_type_bonus * w,
                    PreferenceKind::PreferWeekday if !weekend => -p.day_type_bonus * w,
                    _ => 0.0,
                }
            })
            .sum()
    }

    fn unit_cohesion(&self, person: &Person, excluded: &BTreeSet<PersonId>) -> f64 {
        if excluded.is_empty() {
            return 0.0;
        }
        let same_unit = excluded
            .iter()
            .filter_map(|pid| self.person_idx.get(pid))
            .any(|&i| self.people[i].unit() == person.unit());
        if same_unit { 0.0 } else { self.policy.unit_mix_penalty }
    }

    fn score(
        &self,
        person: &Person,
        state: &PersonState,
        target: &DutySlot,
        role: &str,
        excluded: &BTreeSet<PersonId>,
        ratios: &HashMap<&str, (f64, usize)>,
    ) -> ScoredCandidate {
        let vacation_penalty = if self.vacations.is_on_vacation(&person.id, target.date()) {
            self.policy.vacation_penalty
        } else {
            0.0
        };
        let fairness = self.fairness(person, state, ratios);
        let preference = self.preference_score(person, target, excluded);
        let unit_cohesion = self.unit_cohesion(person, excluded);
        let role_match = if person.primary_role != role {
            self.policy.secondary_role_penalty
        } else {
            0.0
        };

        ScoredCandidate {
            person_id: person.id.clone(),
            name: person.name.clone(),
            total_score: vacation_penalty + fairness + preference + unit_cohesion + role_match,
            vacation_penalty,
            fairness,
            preference,
            unit_cohesion,
            role_match,
        }
    }
}
