//! Generated rotation output: one shift per person per worked day.

use crate::{
    calendar::CampaignCalendar,
    model::{Person, Vacation},
    types::{PersonId, Role},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id:        String,
    pub date:      NaiveDate,
    pub role:      Role,
    pub person_id: PersonId,
}

impl Shift {
    pub fn new(id: String, date: NaiveDate, role: impl Into<Role>, person_id: impl Into<PersonId>) -> Self {
        Self { id, date, role: role.into(), person_id: person_id.into() }
    }
}

/// An ordered list of shifts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    shifts: Vec<Shift>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_shifts(shifts: Vec<Shift>) -> Self {
        Self { shifts }
    }

    pub fn push(&mut self, shift: Shift) {
        self.shifts.push(shift);
    }

    pub fn extend(&mut self, shifts: impl IntoIterator<Item = Shift>) {
        self.shifts.extend(shifts);
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn into_shifts(self) -> Vec<Shift> {
        self.shifts
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    pub fn on(&self, date: NaiveDate) -> impl Iterator<Item = &Shift> {
        self.shifts.iter().filter(move |s| s.date == date)
    }

    pub fn count_for(&self, person_id: &str) -> usize {
        self.shifts.iter().filter(|s| s.person_id == person_id).count()
    }

    pub fn role_count_on(&self, date: NaiveDate, role: &str) -> usize {
        self.on(date).filter(|s| s.role == role).count()
    }

    /// Shifts per person. People with no shifts are absent.
    pub fn counts(&self) -> HashMap<&str, usize> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for s in &self.shifts {
            *counts.entry(s.person_id.as_str()).or_default() += 1;
        }
        counts
    }

    /// Who works on each date.
    pub fn assignment_map(&self) -> BTreeMap<NaiveDate, BTreeSet<PersonId>> {
        let mut map: BTreeMap<NaiveDate, BTreeSet<PersonId>> = BTreeMap::new();
        for s in &self.shifts {
            map.entry(s.date).or_default().insert(s.person_id.clone());
        }
        map
    }

    /// Max minus min shift count across `population`. Zero for an empty population.
    pub fn spread<'a, I>(&self, population: I) -> usize
    where
        I: IntoIterator<Item = &'a Person>,
    {
        let counts = self.counts();
        let totals: Vec<usize> = population
            .into_iter()
            .map(|p| counts.get(p.id.as_str()).copied().unwrap_or(0))
            .collect();
        match (totals.iter().max(), totals.iter().min()) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        }
    }

    pub fn idle_days(&self, person_id: &str, calendar: &CampaignCalendar) -> usize {
        calendar.len().saturating_sub(self.count_for(person_id))
    }

    /// Every (person, day) not worked, as vacation records for the caller to persist.
    pub fn rest_day_records(&self, people: &[Person], calendar: &CampaignCalendar) -> Vec<Vacation> {
        let worked = self.assignment_map();
        let mut records = Vec::new();
        for &day in calendar.days() {
            let on_duty = worked.get(&day);
            for p in people {
                if on_duty.is_some_and(|set| set.contains(&p.id)) {
                    continue;
                }
                let description = match p.unit() {
                    Some(unit) => format!("unit_{unit}_rotation"),
                    None => "vacation".to_string(),
                };
                records.push(Vacation::new(p.id.clone(), day, description));
            }
        }
        records
    }
}
