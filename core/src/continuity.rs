//! Continuous slots: carry yesterday's crew into today's equivalent slot.

use crate::{
    calendar::yesterday,
    model::DutySlot,
    types::{PersonId, Role, SlotId},
    vacation::VacationBook,
};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarryOutcome {
    Carried,
    SkippedOnVacation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarryRecord {
    pub slot_id:   SlotId,
    pub from_slot: SlotId,
    pub role:      Role,
    pub person_id: PersonId,
    pub outcome:   CarryOutcome,
}

/// Slot name with a trailing ` - YYYY-MM-DD` removed.
pub fn base_name(name: &str) -> &str {
    if let Some((head, tail)) = name.rsplit_once(" - ") {
        if NaiveDate::parse_from_str(tail.trim(), "%Y-%m-%d").is_ok() {
            return head;
        }
    }
    name
}

fn find_previous(slots: &[DutySlot], today: &DutySlot, prev_date: NaiveDate) -> Option<usize> {
    let base = base_name(&today.name);
    slots.iter().position(|s| {
        s.date() == prev_date
            && base_name(&s.name) == base
            && s.start.time() == today.start.time()
    })
}

/// For each empty continuous slot on `date`, copy the previous day's
/// equivalent slot's assignments, leaving out people on vacation today.
pub fn carry_forward(slots: &mut [DutySlot], vacations: &VacationBook, date: NaiveDate) -> Vec<CarryRecord> {
    let prev_date = yesterday(date);
    let mut records = Vec::new();

    let targets: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.date() == date && s.continuous && s.is_assignable() && !s.has_assignments())
        .map(|(i, _)| i)
        .collect();

    for idx in targets {
        let Some(prev_idx) = find_previous(slots, &slots[idx], prev_date) else {
            continue;
        };
        let carried_over = slots[prev_idx].assignments().clone();
        let from_slot = slots[prev_idx].id.clone();
        let slot_id = slots[idx].id.clone();

        for (role, people) in carried_over {
            let mut kept: Vec<PersonId> = Vec::new();
            for pid in people {
                let outcome = if vacations.is_on_vacation(&pid, date) {
                    log::info!("[continuous] {slot_id}: {pid} on vacation, not carried");
                    CarryOutcome::SkippedOnVacation
                } else {
                    log::info!("[continuous] {slot_id}: carrying {pid} as {role}");
                    kept.push(pid.clone());
                    CarryOutcome::Carried
                };
                records.push(CarryRecord {
                    slot_id: slot_id.clone(),
                    from_slot: from_slot.clone(),
                    role: role.clone(),
                    person_id: pid,
                    outcome,
                });
            }
            slots[idx].replace_role(&role, kept);
        }
    }
    records
}
