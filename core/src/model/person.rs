use super::preference::{Preference, PreferenceKind};
use crate::types::{PersonId, Role};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A person on the roster with a finalized capability set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id:           PersonId,
    pub name:         String,
    pub primary_role: Role,
    /// Ordered capability set, primary role first. See `roles::derive_capabilities`.
    #[serde(default)]
    pub capabilities: Vec<Role>,
    #[serde(default)]
    pub unit:         Option<String>,
    /// Dates the person cannot work at all.
    #[serde(default)]
    pub unavailable:  BTreeSet<NaiveDate>,
    #[serde(default)]
    pub preferences:  Vec<Preference>,
}

impl Person {
    pub fn new(id: impl Into<PersonId>, name: impl Into<String>, primary_role: impl Into<Role>) -> Self {
        let primary_role = primary_role.into();
        Self {
            id:           id.into(),
            name:         name.into(),
            capabilities: vec![primary_role.clone()],
            primary_role,
            unit:         None,
            unavailable:  BTreeSet::new(),
            preferences:  Vec::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Replace the capability set. The primary role is kept first.
    pub fn with_capabilities<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Role>,
    {
        let mut caps = vec![self.primary_role.clone()];
        for role in roles {
            let role = role.into();
            if !caps.contains(&role) {
                caps.push(role);
            }
        }
        self.capabilities = caps;
        self
    }

    pub fn with_unavailable(mut self, date: NaiveDate) -> Self {
        self.unavailable.insert(date);
        self
    }

    pub fn with_preference(mut self, preference: Preference) -> Self {
        self.preferences.push(preference);
        self
    }

    /// Eligibility follows the finalized capability set only: a primary
    /// role that derivation removed no longer qualifies.
    pub fn can_fill(&self, role: &str) -> bool {
        self.capabilities.iter().any(|r| r == role)
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Preferences active on `date`.
    pub fn active_preferences(&self, date: NaiveDate) -> impl Iterator<Item = &Preference> {
        self.preferences.iter().filter(move |p| p.is_active(date))
    }

    pub fn must_be_off(&self, date: NaiveDate) -> bool {
        self.preferences
            .iter()
            .any(|p| p.names_date(PreferenceKind::MustVacationDate, date))
    }

    /// Unavailable on `date`, either by marker or by a must-vacation-date preference.
    pub fn is_unavailable(&self, date: NaiveDate) -> bool {
        self.unavailable.contains(&date) || self.must_be_off(date)
    }

    /// Distinct unavailable dates inside `[start, end]`.
    pub fn unavailable_days_between(&self, start: NaiveDate, end: NaiveDate) -> usize {
        let mut dates: BTreeSet<NaiveDate> = self.unavailable.range(start..=end).copied().collect();
        for pref in &self.preferences {
            if pref.kind != PreferenceKind::MustVacationDate {
                continue;
            }
            if let Some(date) = pref.target_date() {
                if start <= date && date <= end && pref.is_active(date) {
                    dates.insert(date);
                }
            }
        }
        dates.len()
    }

    /// Multiplier on the required rest interval for a duty on `date`.
    /// The first active, well-formed rest-multiplier preference wins.
    pub fn rest_multiplier(&self, date: NaiveDate) -> f64 {
        self.active_preferences(date)
            .find_map(Preference::rest_multiplier)
            .unwrap_or(1.0)
    }
}

/// Distribute flat preference records onto their people.
/// Records naming an unknown person are returned unattached.
pub fn attach_preferences(people: &mut [Person], preferences: Vec<Preference>) -> Vec<Preference> {
    let index: HashMap<PersonId, usize> = people
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id.clone(), i))
        .collect();
    let mut orphans = Vec::new();
    for pref in preferences {
        match index.get(&pref.person_id) {
            Some(&i) => people[i].preferences.push(pref),
            None => orphans.push(pref),
        }
    }
    orphans
}
