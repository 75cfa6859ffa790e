//! Domain model: the records both engines read.
//!
//! RULE: These are plain snapshot records owned by the caller.
//! Engines mutate only DutySlot assignments, and only through the
//! accessor methods on DutySlot.

mod person;
mod preference;
mod slot;

pub use person::{attach_preferences, Person};
pub use preference::{Preference, PreferenceKind, Priority};
pub use slot::{DutySlot, SlotStatus};

use crate::types::{PersonId, Role};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An explicit day off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacation {
    pub person_id:   PersonId,
    pub date:        NaiveDate,
    #[serde(default)]
    pub description: String,
}

impl Vacation {
    pub fn new(person_id: impl Into<PersonId>, date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            person_id:   person_id.into(),
            date,
            description: description.into(),
        }
    }
}

fn default_rest_cap() -> f64 { 12.0 }

/// Campaign metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub name:             String,
    pub start_date:       NaiveDate,
    pub end_date:         NaiveDate,
    /// Minimum people per primary role that must stay on site.
    #[serde(default)]
    pub on_duty_minimums: BTreeMap<Role, u32>,
    /// Ceiling on the rest interval a single duty can demand.
    #[serde(default = "default_rest_cap")]
    pub rest_cap_hours:   f64,
}

impl Campaign {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date,
            end_date,
            on_duty_minimums: BTreeMap::new(),
            rest_cap_hours: default_rest_cap(),
        }
    }

    pub fn with_rest_cap(mut self, hours: f64) -> Self {
        self.rest_cap_hours = hours;
        self
    }

    pub fn with_minimum(mut self, role: impl Into<Role>, count: u32) -> Self {
        self.on_duty_minimums.insert(role.into(), count);
        self
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
