use crate::types::{PersonId, Role, SlotId};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    #[default]
    #[serde(alias = "tentative", alias = "must")]
    Planned,
    Started,
    Completed,
}

/// A time-bounded duty unit (mission/shift) with role headcounts.
///
/// Assignments are private: every mutation goes through `assign` /
/// `unassign` / `replace_role`, which keep each role's list free of
/// duplicate person ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutySlot {
    pub id:             SlotId,
    pub name:           String,
    pub start:          NaiveDateTime,
    pub end:            NaiveDateTime,
    pub roles_required: BTreeMap<Role, u32>,
    #[serde(default)]
    assignments:        BTreeMap<Role, Vec<PersonId>>,
    #[serde(default)]
    pub status:         SlotStatus,
    /// Assignments carry over into the next day's equivalent slot.
    #[serde(default)]
    pub continuous:     bool,
}

impl DutySlot {
    pub fn new(
        id: impl Into<SlotId>,
        name: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id:             id.into(),
            name:           name.into(),
            start,
            end,
            roles_required: BTreeMap::new(),
            assignments:    BTreeMap::new(),
            status:         SlotStatus::Planned,
            continuous:     false,
        }
    }

    pub fn with_requirement(mut self, role: impl Into<Role>, count: u32) -> Self {
        self.roles_required.insert(role.into(), count);
        self
    }

    pub fn continuous(mut self) -> Self {
        self.continuous = true;
        self
    }

    /// Calendar date the slot belongs to (its start date).
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }

    pub fn has_valid_window(&self) -> bool {
        self.end >= self.start
    }

    /// Half-open interval overlap.
    pub fn overlaps(&self, other: &DutySlot) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }

    pub fn is_assignable(&self) -> bool {
        self.status == SlotStatus::Planned
    }

    /// Add `person_id` under `role`. Returns false if already there.
    pub fn assign(&mut self, role: &str, person_id: &str) -> bool {
        let list = self.assignments.entry(role.to_string()).or_default();
        if list.iter().any(|p| p == person_id) {
            return false;
        }
        list.push(person_id.to_string());
        true
    }

    /// Remove `person_id` from every role.
    pub fn unassign(&mut self, person_id: &str) {
        for list in self.assignments.values_mut() {
            list.retain(|p| p != person_id);
        }
        self.assignments.retain(|_, list| !list.is_empty());
    }

    /// Overwrite one role's list, dropping duplicates.
    pub fn replace_role<I>(&mut self, role: &str, people: I)
    where
        I: IntoIterator<Item = PersonId>,
    {
        let mut list: Vec<PersonId> = Vec::new();
        for pid in people {
            if !list.contains(&pid) {
                list.push(pid);
            }
        }
        if list.is_empty() {
            self.assignments.remove(role);
        } else {
            self.assignments.insert(role.to_string(), list);
        }
    }

    pub fn assigned(&self, role: &str) -> &[PersonId] {
        self.assignments.get(role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn assignments(&self) -> &BTreeMap<Role, Vec<PersonId>> {
        &self.assignments
    }

    pub fn has_assignments(&self) -> bool {
        self.assignments.values().any(|list| !list.is_empty())
    }

    pub fn all_assigned(&self) -> BTreeSet<PersonId> {
        self.assignments.values().flatten().cloned().collect()
    }

    pub fn is_assigned(&self, person_id: &str) -> bool {
        self.assignments.values().flatten().any(|p| p == person_id)
    }

    /// Roles still short of their headcount, with how many are missing.
    pub fn unfilled_roles(&self) -> Vec<(Role, u32)> {
        self.roles_required
            .iter()
            .filter_map(|(role, &count)| {
                let have = self.assigned(role).len() as u32;
                (have < count).then(|| (role.clone(), count - have))
            })
            .collect()
    }

    pub fn is_filled(&self) -> bool {
        self.unfilled_roles().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn assign_is_idempotent() {
        let mut slot = DutySlot::new("m1", "gate", at("2024-06-01 08:00"), at("2024-06-01 20:00"))
            .with_requirement("soldier", 2);
        assert!(slot.assign("soldier", "a"));
        assert!(!slot.assign("soldier", "a"));
        assert_eq!(slot.assigned("soldier"), ["a".to_string()]);
        assert_eq!(slot.unfilled_roles(), vec![("soldier".to_string(), 1)]);
    }

    #[test]
    fn touching_windows_do_not_overlap() {
        let a = DutySlot::new("a", "a", at("2024-06-01 08:00"), at("2024-06-01 20:00"));
        let b = DutySlot::new("b", "b", at("2024-06-01 20:00"), at("2024-06-02 08:00"));
        let c = DutySlot::new("c", "c", at("2024-06-01 19:00"), at("2024-06-01 21:00"));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn legacy_statuses_read_as_planned() {
        let s: SlotStatus = serde_json::from_str("\"tentative\"").unwrap();
        assert_eq!(s, SlotStatus::Planned);
    }

    #[test]
    fn unassign_clears_every_role() {
        let mut slot = DutySlot::new("m1", "gate", at("2024-06-01 08:00"), at("2024-06-01 20:00"));
        slot.assign("soldier", "a");
        slot.assign("driver", "a");
        slot.unassign("a");
        assert!(!slot.has_assignments());
    }
}
