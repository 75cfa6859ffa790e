//! Campaign-wide role headcount targets for the rotation generator.

use crate::types::Role;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Daily headcount: a fixed number, or one number per weekday (Monday first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Headcount {
    Fixed(u32),
    Weekly([u32; 7]),
}

impl Headcount {
    pub fn on(&self, date: NaiveDate) -> u32 {
        match self {
            Self::Fixed(n) => *n,
            Self::Weekly(per_day) => per_day[date.weekday().num_days_from_monday() as usize],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRequirement {
    pub role:  Role,
    pub count: Headcount,
}

impl ShiftRequirement {
    pub fn fixed(role: impl Into<Role>, count: u32) -> Self {
        Self { role: role.into(), count: Headcount::Fixed(count) }
    }

    pub fn weekly(role: impl Into<Role>, per_day: [u32; 7]) -> Self {
        Self { role: role.into(), count: Headcount::Weekly(per_day) }
    }
}

/// Extra headcount added to one aggregate role on selected dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boost {
    pub amount: u32,
    #[serde(default)]
    pub dates:  BTreeSet<NaiveDate>,
}

impl Boost {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(amount: u32, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self { amount, dates: dates.into_iter().collect() }
    }

    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.amount > 0 && self.dates.contains(&date)
    }
}

/// Target for `req` on `date`, including the boost when `req` is the boosted role.
pub fn target_on(req: &ShiftRequirement, date: NaiveDate, boost: &Boost, boosted_role: &str) -> u32 {
    let base = req.count.on(date);
    if req.role == boosted_role && boost.applies_on(date) {
        base + boost.amount
    } else {
        base
    }
}

/// Drop roles filled by outside personnel.
pub fn internal_requirements(requirements: &[ShiftRequirement], external_prefix: &str) -> Vec<ShiftRequirement> {
    requirements
        .iter()
        .filter(|r| external_prefix.is_empty() || !r.role.starts_with(external_prefix))
        .cloned()
        .collect()
}
