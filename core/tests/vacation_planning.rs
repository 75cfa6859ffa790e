//! Vacation book bookkeeping and time-off suggestions.

use chrono::{NaiveDate, NaiveDateTime};
use rota_core::{
    calendar::CampaignCalendar,
    config::PlanningPolicy,
    model::{Campaign, DutySlot, Person, Preference, PreferenceKind, Vacation},
    roster::{Roster, Shift},
    vacation::{suggest_vacations, VacationBook},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn suggestions_weigh_staffing_assignments_and_history() {
    let people = vec![
        Person::new("medic", "Only Medic", "medic"),
        Person::new("busy", "Busy", "soldier"),
        Person::new("keen", "Keen", "soldier")
            .with_preference(Preference::new("keen", PreferenceKind::PreferVacationDate, "2024-06-11")),
        Person::new("rested", "Rested", "soldier"),
        Person::new("home", "Home", "soldier"),
    ];
    let campaign = Campaign::new("summer", d("2024-06-01"), d("2024-06-30"))
        .with_minimum("medic", 1)
        .with_minimum("soldier", 2);
    let mut patrol = DutySlot::new("p1", "patrol", at("2024-06-10 08:00"), at("2024-06-10 16:00"));
    patrol.assign("soldier", "busy");
    let book = VacationBook::from_records([
        Vacation::new("rested", d("2024-06-01"), "leave"),
        Vacation::new("rested", d("2024-06-02"), "leave"),
        Vacation::new("home", d("2024-06-11"), "leave"),
    ]);
    let policy = PlanningPolicy::default();

    let ranked = suggest_vacations(&people, &book, &[patrol], &campaign, d("2024-06-10"), 2, &policy);
    let order: Vec<&str> = ranked.iter().map(|s| s.person_id.as_str()).collect();
    assert_eq!(order, vec!["keen", "rested", "busy", "medic", "home"]);

    let medic = ranked.iter().find(|s| s.person_id == "medic").unwrap();
    assert_eq!(medic.score, policy.understaffed_penalty);
    assert!(medic.reasons[0].contains("0/1"), "reasons: {:?}", medic.reasons);

    let busy = ranked.iter().find(|s| s.person_id == "busy").unwrap();
    assert_eq!(busy.reasons, vec!["assigned to patrol".to_string()]);
    assert!(
        !ranked.iter().any(|s| s.person_id != "busy" && s.reasons.iter().any(|r| r.starts_with("assigned"))),
        "Only the assigned person carries an assignment reason"
    );
}

#[test]
fn book_counts_and_date_lookups() {
    let mut book = VacationBook::new();
    book.add(Vacation::new("a", d("2024-06-05"), "leave"));
    book.add(Vacation::new("a", d("2024-06-06"), "leave"));
    book.add(Vacation::new("b", d("2024-06-05"), "leave"));

    assert_eq!(book.days_taken("a"), 2);
    assert_eq!(book.on_date(d("2024-06-05")), vec!["a", "b"]);
    assert!(book.is_on_vacation("b", d("2024-06-05")));
    assert!(!book.is_on_vacation("b", d("2024-06-06")));
    assert_eq!(book.records().len(), 3);
}

#[test]
fn rest_days_from_a_roster_become_vacation_records() {
    let people = vec![Person::new("a", "A", "soldier").with_unit("1"), Person::new("x", "X", "soldier")];
    let cal = CampaignCalendar::new(d("2024-01-01"), d("2024-01-03"), None).unwrap();
    let roster = Roster::from_shifts(vec![
        Shift::new("1".into(), d("2024-01-01"), "soldier", "a"),
        Shift::new("2".into(), d("2024-01-03"), "soldier", "a"),
    ]);

    let book = VacationBook::from_records(roster.rest_day_records(&people, &cal));
    assert_eq!(book.len(), 4, "One idle day for a, three for x");
    assert_eq!(book.description("a", d("2024-01-02")), Some("unit_1_rotation"));
    assert_eq!(book.description("x", d("2024-01-01")), Some("vacation"));
}
