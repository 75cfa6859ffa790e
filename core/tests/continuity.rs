//! Continuous slots carry yesterday's crew forward.

use chrono::{NaiveDate, NaiveDateTime};
use rota_core::{
    continuity::{carry_forward, CarryOutcome},
    model::{DutySlot, SlotStatus, Vacation},
    vacation::VacationBook,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn gate(day: &str, hour: &str) -> DutySlot {
    DutySlot::new(
        format!("gate-{day}-{hour}"),
        format!("gate - {day}"),
        at(&format!("{day} {hour}")),
        at(&format!("{day} 23:00")),
    )
    .with_requirement("soldier", 2)
    .continuous()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn crew_is_carried_except_people_on_vacation() {
    let mut yesterday = gate("2024-06-01", "08:00");
    yesterday.assign("soldier", "a");
    yesterday.assign("soldier", "b");
    yesterday.assign("commander", "c");
    let mut slots = vec![yesterday, gate("2024-06-02", "08:00")];
    let book = VacationBook::from_records([Vacation::new("b", d("2024-06-02"), "leave")]);

    let records = carry_forward(&mut slots, &book, d("2024-06-02"));

    let today = &slots[1];
    assert_eq!(today.assigned("soldier"), ["a".to_string()]);
    assert_eq!(today.assigned("commander"), ["c".to_string()]);
    assert_eq!(records.len(), 3);
    let skipped: Vec<&str> = records
        .iter()
        .filter(|r| r.outcome == CarryOutcome::SkippedOnVacation)
        .map(|r| r.person_id.as_str())
        .collect();
    assert_eq!(skipped, vec!["b"]);
    assert!(records.iter().all(|r| r.from_slot == "gate-2024-06-01-08:00"));
}

#[test]
fn slots_that_already_have_people_or_differ_in_start_time_are_untouched() {
    let mut yesterday = gate("2024-06-01", "08:00");
    yesterday.assign("soldier", "a");
    let mut staffed = gate("2024-06-02", "08:00");
    staffed.assign("soldier", "z");
    let mut slots = vec![yesterday, staffed, gate("2024-06-02", "09:00")];

    let records = carry_forward(&mut slots, &VacationBook::new(), d("2024-06-02"));

    assert!(records.is_empty());
    assert_eq!(slots[1].assigned("soldier"), ["z".to_string()]);
    assert!(!slots[2].has_assignments(), "A different start time is a different slot");
}

#[test]
fn non_continuous_or_started_slots_are_skipped() {
    let mut yesterday = gate("2024-06-01", "08:00");
    yesterday.assign("soldier", "a");
    let mut plain = gate("2024-06-02", "08:00");
    plain.continuous = false;
    let mut started = gate("2024-06-02", "08:00");
    started.status = SlotStatus::Started;
    let mut slots = vec![yesterday, plain, started];

    assert!(carry_forward(&mut slots, &VacationBook::new(), d("2024-06-02")).is_empty());
}
