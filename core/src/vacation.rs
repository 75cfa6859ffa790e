//! Vacation bookkeeping and time-off suggestions.

use crate::{
    config::PlanningPolicy,
    model::{Campaign, DutySlot, Person, PreferenceKind, Vacation},
    types::PersonId,
};
use chrono::{Days, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// At most one vacation per (person, date). Adding again replaces the description.
#[derive(Debug, Clone, Default)]
pub struct VacationBook {
    entries: BTreeMap<(PersonId, NaiveDate), String>,
}

impl VacationBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Vacation>,
    {
        let mut book = Self::new();
        for v in records {
            book.add(v);
        }
        book
    }

    pub fn add(&mut self, vacation: Vacation) {
        self.entries
            .insert((vacation.person_id, vacation.date), vacation.description);
    }

    /// Returns true if a record was removed.
    pub fn remove(&mut self, person_id: &str, date: NaiveDate) -> bool {
        self.entries.remove(&(person_id.to_string(), date)).is_some()
    }

    pub fn is_on_vacation(&self, person_id: &str, date: NaiveDate) -> bool {
        self.entries.contains_key(&(person_id.to_string(), date))
    }

    pub fn description(&self, person_id: &str, date: NaiveDate) -> Option<&str> {
        self.entries
            .get(&(person_id.to_string(), date))
            .map(String::as_str)
    }

    /// Vacation days taken by one person across the whole book.
    pub fn days_taken(&self, person_id: &str) -> usize {
        self.entries.keys().filter(|(pid, _)| pid == person_id).count()
    }

    pub fn on_date(&self, date: NaiveDate) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|(_, d)| *d == date)
            .map(|(pid, _)| pid.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn records(&self) -> Vec<Vacation> {
        self.entries
            .iter()
            .map(|((pid, date), desc)| Vacation::new(pid.clone(), *date, desc.clone()))
            .collect()
    }
}

/// A person's suitability for time off in a window. Lower is better.
#[derive(Debug, Clone, PartialEq)]
pub struct VacationSuggestion {
    pub person_id: PersonId,
    pub score:     f64,
    pub reasons:   Vec<String>,
}

/// Rank everyone for `days` days off starting at `target_date`.
pub fn suggest_vacations(
    people: &[Person],
    book: &VacationBook,
    slots: &[DutySlot],
    campaign: &Campaign,
    target_date: NaiveDate,
    days: u32,
    policy: &PlanningPolicy,
) -> Vec<VacationSuggestion> {
    let window: Vec<NaiveDate> = (0..days.max(1) as u64)
        .filter_map(|i| target_date.checked_add_days(Days::new(i)))
        .collect();
    let off_in_window =
        |pid: &str| window.iter().any(|d| book.is_on_vacation(pid, *d));

    let slots_in_window: Vec<&DutySlot> = slots
        .iter()
        .filter(|s| window.contains(&s.date()))
        .collect();

    // On-site headcount per primary role, ignoring people off in the window.
    let mut on_site: HashMap<&str, u32> = HashMap::new();
    for p in people {
        if !off_in_window(&p.id) {
            *on_site.entry(p.primary_role.as_str()).or_default() += 1;
        }
    }

    let mut suggestions: Vec<VacationSuggestion> = people
        .iter()
        .map(|person| {
            let mut score = 0.0;
            let mut reasons = Vec::new();
            let already_off = off_in_window(&person.id);

            let role = person.primary_role.as_str();
            let minimum = campaign.on_duty_minimums.get(role).copied().unwrap_or(0);
            let others = on_site.get(role).copied().unwrap_or(0) - u32::from(!already_off);
            if others < minimum {
                score += policy.understaffed_penalty;
                reasons.push(format!("would leave only {others}/{minimum} {role}s"));
            }

            for slot in &slots_in_window {
                if slot.is_assigned(&person.id) {
                    score += policy.assigned_penalty;
                    reasons.push(format!("assigned to {}", slot.name));
                }
            }

            if already_off {
                score += policy.already_off_penalty;
                reasons.push("already on vacation".to_string());
            }

            score += book.days_taken(&person.id) as f64 * policy.per_vacation_taken;

            for pref in &person.preferences {
                if window
                    .iter()
                    .any(|d| pref.names_date(PreferenceKind::PreferVacationDate, *d))
                {
                    score -= policy.preferred_date_bonus * pref.weight();
                    reasons.push(format!("prefers {} off", pref.target.trim()));
                }
            }

            VacationSuggestion { person_id: person.id.clone(), score, reasons }
        })
        .collect();

    suggestions.sort_by(|a, b| {
        a.score
            .total_cmp(&b.score)
            .then_with(|| a.person_id.cmp(&b.person_id))
    });
    suggestions
}
