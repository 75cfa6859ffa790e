use crate::types::PersonId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKind {
    RestMultiplier,
    PairWith,
    AvoidPerson,
    PreferMission,
    AvoidMission,
    PreferWeekend,
    PreferWeekday,
    PreferVacationDate,
    MustVacationDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn weight(self) -> f64 {
        match self {
            Self::Low    => 0.5,
            Self::Medium => 1.0,
            Self::High   => 2.0,
        }
    }
}

/// A standing request that nudges (or, for must-vacation-date, forbids) assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub person_id: PersonId,
    #[serde(rename = "type")]
    pub kind:      PreferenceKind,
    /// Type-specific value: a person id, a mission name fragment, a date or a number.
    #[serde(default)]
    pub target:    String,
    #[serde(default)]
    pub priority:  Priority,
    #[serde(default)]
    pub expires:   Option<NaiveDate>,
}

impl Preference {
    pub fn new(person_id: impl Into<PersonId>, kind: PreferenceKind, target: impl Into<String>) -> Self {
        Self {
            person_id: person_id.into(),
            kind,
            target:    target.into(),
            priority:  Priority::Medium,
            expires:   None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn expiring(mut self, expires: NaiveDate) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Active on `date` unless it expired strictly before it.
    pub fn is_active(&self, date: NaiveDate) -> bool {
        self.expires.is_none_or(|exp| date <= exp)
    }

    pub fn weight(&self) -> f64 {
        self.priority.weight()
    }

    /// Parsed multiplier for a rest-multiplier preference.
    /// Malformed or negative targets yield None and have no effect.
    pub fn rest_multiplier(&self) -> Option<f64> {
        if self.kind != PreferenceKind::RestMultiplier {
            return None;
        }
        self.target
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|m| m.is_finite() && *m >= 0.0)
    }

    /// Parsed ISO date target. Unparseable targets yield None.
    pub fn target_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.target.trim(), "%Y-%m-%d").ok()
    }

    /// True when this is an active date preference of `kind` naming `date`.
    pub fn names_date(&self, kind: PreferenceKind, date: NaiveDate) -> bool {
        self.kind == kind && self.is_active(date) && self.target_date() == Some(date)
    }
}
