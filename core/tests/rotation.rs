//! Rotation generator: day classes, validity, selection and failure reporting.

use chrono::NaiveDate;
use rota_core::{
    calendar::{tomorrow, yesterday, CampaignCalendar},
    config::PolicyConfig,
    model::Person,
    requirement::{target_on, Boost, ShiftRequirement},
    roles::finalize_people,
    roster::{Roster, Shift},
    rotation::{field_population, select_best, RotationGenerator, RotationOutcome, Shortfall},
};
use std::collections::{BTreeSet, HashMap};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn january(special_end: Option<&str>) -> CampaignCalendar {
    CampaignCalendar::new(d("2024-01-01"), d("2024-01-10"), special_end.map(d)).unwrap()
}

/// Field soldiers with finalized capabilities.
fn field_soldiers(n: usize) -> Vec<Person> {
    let mut people: Vec<Person> = (0..n)
        .map(|i| Person::new(format!("s{i}"), format!("Soldier {i}"), "soldier").with_unit("1"))
        .collect();
    finalize_people(&mut people, &PolicyConfig::default().roles);
    people
}

fn scheduled(outcome: RotationOutcome) -> rota_core::rotation::SelectedRotation {
    match outcome {
        RotationOutcome::Scheduled(selected) => selected,
        other => panic!("Expected a schedule, got {other:?}"),
    }
}

fn assert_one_shift_per_person_per_day(roster: &Roster) {
    let mut seen: BTreeSet<(NaiveDate, &str)> = BTreeSet::new();
    for s in roster.shifts() {
        assert!(
            seen.insert((s.date, s.person_id.as_str())),
            "{} has two shifts on {}",
            s.person_id, s.date
        );
    }
}

/// Recount every non-exempt day by hand.
fn manually_valid(roster: &Roster, reqs: &[ShiftRequirement], cal: &CampaignCalendar, boost: &Boost) -> bool {
    cal.days().iter().filter(|d| !cal.is_exempt(**d)).all(|&day| {
        reqs.iter().all(|req| {
            let have = roster.shifts().iter().filter(|s| s.date == day && s.role == req.role).count();
            have >= target_on(req, day, boost, "total_soldiers") as usize
        })
    })
}

// ── Worked example ───────────────────────────────────────────────────────────

#[test]
fn three_soldiers_two_per_day_for_ten_days() {
    let people = field_soldiers(3);
    let reqs = vec![ShiftRequirement::fixed("soldier", 2)];
    let cal = january(None);
    let generator = RotationGenerator::new(PolicyConfig::default());

    let selected = scheduled(generator.generate(&people, &reqs, &cal, &Boost::none(), 8).unwrap());

    assert_eq!(selected.roster.len(), 20, "Two soldiers on each of ten days");
    assert_eq!(selected.valid_trials, 8, "Every trial can meet two of three per day");
    assert_eq!(selected.spread, 1);

    let counts = selected.roster.counts();
    let mut totals: Vec<usize> = people.iter().map(|p| counts.get(p.id.as_str()).copied().unwrap_or(0)).collect();
    totals.sort_unstable();
    assert_eq!(totals, vec![6, 7, 7]);
    assert_one_shift_per_person_per_day(&selected.roster);
}

// ── Day classes ──────────────────────────────────────────────────────────────

#[test]
fn intensive_days_put_everyone_available_on_duty() {
    let people = vec![
        Person::new("cmd", "Commander", "commander").with_capabilities(["soldier"]),
        Person::new("s1", "S1", "soldier"),
        Person::new("s2", "S2", "soldier"),
        Person::new("s3", "S3", "soldier").with_unavailable(d("2024-01-02")),
        Person::new("cook", "Cook", "cook"),
    ];
    let reqs = vec![ShiftRequirement::fixed("soldier", 2)];
    let cal = january(Some("2024-01-03"));
    let generator = RotationGenerator::new(PolicyConfig::default());

    let roster = scheduled(generator.generate(&people, &reqs, &cal, &Boost::none(), 4).unwrap()).roster;

    let on = |day: &str| -> HashMap<String, String> {
        roster.on(d(day)).map(|s| (s.person_id.clone(), s.role.clone())).collect()
    };
    let jan1 = on("2024-01-01");
    assert_eq!(jan1.len(), 5, "All five work on an intensive day");
    assert_eq!(jan1["cmd"], "commander");
    assert_eq!(jan1["s1"], "soldier");
    assert_eq!(jan1["cook"], "cook", "No priority role: first capability");

    let jan2 = on("2024-01-02");
    assert_eq!(jan2.len(), 4);
    assert!(!jan2.contains_key("s3"), "Unavailable people stay home even on intensive days");
    assert!(roster.on(d("2024-01-01")).all(|s| s.id.contains("-alat-")));
}

#[test]
fn intensive_role_without_any_capability_uses_fallback() {
    let mut ghost = Person::new("g", "Ghost", "");
    ghost.capabilities.clear();
    let people = vec![ghost, Person::new("s1", "S1", "soldier"), Person::new("s2", "S2", "soldier")];
    let cal = CampaignCalendar::new(d("2024-01-01"), d("2024-01-04"), Some(d("2024-01-01"))).unwrap();
    let generator = RotationGenerator::new(PolicyConfig::default());
    let outcome = generator.diagnose(&people, &[ShiftRequirement::fixed("soldier", 1)], &cal, &Boost::none(), 0);
    let role = outcome.roster.on(d("2024-01-01")).find(|s| s.person_id == "g").map(|s| s.role.clone());
    assert_eq!(role.as_deref(), Some("on_duty"));
}

#[test]
fn terminal_day_copies_the_day_before() {
    let people = field_soldiers(5);
    let reqs = vec![ShiftRequirement::fixed("soldier", 2)];
    let cal = january(None);
    let generator = RotationGenerator::new(PolicyConfig::default());
    let roster = scheduled(generator.generate(&people, &reqs, &cal, &Boost::none(), 4).unwrap()).roster;

    let crew = |day: &str| -> BTreeSet<(String, String)> {
        roster.on(d(day)).map(|s| (s.person_id.clone(), s.role.clone())).collect()
    };
    assert_eq!(crew("2024-01-10"), crew("2024-01-09"));
    assert!(roster.on(d("2024-01-10")).all(|s| s.id.contains("-copy-")));
}

#[test]
fn unavailable_days_and_sandwiches_are_respected() {
    let mut people = field_soldiers(4);
    people[0].unavailable.insert(d("2024-01-05"));
    people[1].unavailable.insert(d("2024-01-03"));
    people[1].unavailable.insert(d("2024-01-07"));
    let reqs = vec![ShiftRequirement::fixed("soldier", 2)];
    let cal = january(None);
    let generator = RotationGenerator::new(PolicyConfig::default());
    let roster = scheduled(generator.generate(&people, &reqs, &cal, &Boost::none(), 8).unwrap()).roster;

    assert_one_shift_per_person_per_day(&roster);
    let worked: BTreeSet<(String, NaiveDate)> =
        roster.shifts().iter().map(|s| (s.person_id.clone(), s.date)).collect();
    for s in roster.shifts() {
        let person = people.iter().find(|p| p.id == s.person_id).unwrap();
        assert!(!person.is_unavailable(s.date), "{} works on an unavailable day {}", s.person_id, s.date);
        if cal.is_terminal(s.date) || s.date == cal.first() {
            continue;
        }
        if person.is_unavailable(tomorrow(s.date)) {
            assert!(
                worked.contains(&(s.person_id.clone(), yesterday(s.date))),
                "{} has an isolated duty on {} before a day off",
                s.person_id, s.date
            );
        }
    }
}

#[test]
fn roles_dropped_by_derivation_are_never_assigned() {
    let mut people = vec![
        Person::new("hq", "Staff Soldier", "soldier").with_unit("staff").with_capabilities(["mp"]),
        Person::new("s0", "S0", "soldier").with_unit("1"),
        Person::new("s1", "S1", "soldier").with_unit("1"),
        Person::new("s2", "S2", "soldier").with_unit("1"),
    ];
    finalize_people(&mut people, &PolicyConfig::default().roles);
    assert_eq!(people[0].capabilities, vec!["mp".to_string()]);
    assert!(!people[0].can_fill("soldier"));

    let reqs = vec![ShiftRequirement::fixed("soldier", 2)];
    let cal = january(None);
    let generator = RotationGenerator::new(PolicyConfig::default());
    let outcome = generator.diagnose(&people, &reqs, &cal, &Boost::none(), 0);

    assert_eq!(outcome.roster.count_for("hq"), 0, "A staff-unit person lost soldier duty");
    assert!(outcome.is_valid(), "Three field soldiers cover two per day: {:?}", outcome.shortfall);
    let population: Vec<&str> = field_population(&people, "total_soldiers").iter().map(|p| p.id.as_str()).collect();
    assert_eq!(population, vec!["s0", "s1", "s2"]);
}

// ── Requirements ─────────────────────────────────────────────────────────────

#[test]
fn boost_applies_to_field_role_on_boost_dates() {
    let people = field_soldiers(6);
    let reqs = vec![ShiftRequirement::fixed("total_soldiers", 1)];
    let cal = january(None);
    let boost = Boost::new(2, [d("2024-01-03")]);
    let generator = RotationGenerator::new(PolicyConfig::default());
    let roster = scheduled(generator.generate(&people, &reqs, &cal, &boost, 4).unwrap()).roster;

    assert_eq!(roster.role_count_on(d("2024-01-03"), "total_soldiers"), 3);
    assert_eq!(roster.role_count_on(d("2024-01-04"), "total_soldiers"), 1);
}

#[test]
fn weekly_headcount_and_external_roles() {
    let people = field_soldiers(4);
    // Monday first: nobody on Mondays, two on Saturdays.
    let reqs = vec![
        ShiftRequirement::weekly("soldier", [0, 1, 1, 1, 1, 2, 1]),
        ShiftRequirement::fixed("external_guard", 5),
    ];
    let cal = january(None);
    let generator = RotationGenerator::new(PolicyConfig::default());
    let roster = scheduled(generator.generate(&people, &reqs, &cal, &Boost::none(), 4).unwrap()).roster;

    assert_eq!(roster.on(d("2024-01-01")).count(), 0, "2024-01-01 is a Monday");
    assert_eq!(roster.role_count_on(d("2024-01-06"), "soldier"), 2, "2024-01-06 is a Saturday");
    assert!(roster.shifts().iter().all(|s| s.role != "external_guard"));
}

// ── Validity ─────────────────────────────────────────────────────────────────

#[test]
fn validity_verdict_matches_a_manual_recount() {
    let medic = Person::new("m", "Medic", "medic").with_unavailable(d("2024-01-04"));
    let people = vec![medic, Person::new("a", "A", "soldier"), Person::new("b", "B", "soldier")];
    let reqs = vec![ShiftRequirement::fixed("soldier", 1), ShiftRequirement::fixed("medic", 1)];
    let cal = january(None);
    let generator = RotationGenerator::new(PolicyConfig::without_jitter());

    let first = generator.diagnose(&people, &reqs, &cal, &Boost::none(), 0);
    let again = generator.diagnose(&people, &reqs, &cal, &Boost::none(), 7);
    assert_eq!(first.roster, again.roster, "Without jitter the trial index does not matter");

    assert!(!manually_valid(&first.roster, &reqs, &cal, &Boost::none()));
    assert!(!first.is_valid());
    assert_eq!(
        first.shortfall,
        Some(Shortfall { date: d("2024-01-04"), role: "medic".into(), assigned: 0, target: 1 })
    );

    let healthy = vec![
        Person::new("m", "Medic", "medic"),
        Person::new("a", "A", "soldier"),
        Person::new("b", "B", "soldier"),
    ];
    let ok = generator.diagnose(&healthy, &reqs, &cal, &Boost::none(), 0);
    assert!(manually_valid(&ok.roster, &reqs, &cal, &Boost::none()));
    assert!(ok.is_valid(), "Unexpected shortfall: {:?}", ok.shortfall);
}

#[test]
fn infeasible_demand_reports_no_schedule_and_diagnoses_it() {
    let _ = env_logger::builder().is_test(true).try_init();
    let people = field_soldiers(2);
    let reqs = vec![ShiftRequirement::fixed("soldier", 3)];
    let cal = january(None);
    let generator = RotationGenerator::new(PolicyConfig::default());

    let outcome = generator.generate(&people, &reqs, &cal, &Boost::none(), 4).unwrap();
    assert!(!outcome.is_scheduled());
    assert!(matches!(outcome, RotationOutcome::NoFeasibleSchedule { trials: 4, failed: 0 }));

    let report = generator.diagnose(&people, &reqs, &cal, &Boost::none(), 0);
    let miss = report.shortfall.expect("a shortfall");
    assert_eq!((miss.date, miss.role.as_str(), miss.assigned, miss.target), (d("2024-01-01"), "soldier", 2, 3));
    assert_eq!(report.stalls.len(), 9, "Every normal day runs dry");
    assert_eq!(report.stalls[0].remaining, vec![("soldier".to_string(), 1)]);
}

// ── Selection ────────────────────────────────────────────────────────────────

#[test]
fn selection_picks_the_literal_minimum_spread() {
    let people = field_soldiers(3);
    let population = field_population(&people, "total_soldiers");
    assert_eq!(population.len(), 3);

    let roster = |counts: [usize; 3]| {
        let mut shifts = Vec::new();
        for (p, &n) in people.iter().zip(counts.iter()) {
            for day in 0..n {
                let date = d("2024-01-01") + chrono::Days::new(day as u64);
                shifts.push(Shift::new(format!("{date}-{}", p.id), date, "soldier", p.id.clone()));
            }
        }
        Roster::from_shifts(shifts)
    };

    let pool = vec![
        (0, roster([8, 6, 6])),
        (5, roster([7, 7, 6])),
        (2, roster([6, 7, 7])),
        (3, roster([9, 6, 5])),
    ];
    let best = select_best(pool, &population).unwrap();
    assert_eq!(best.spread, 1);
    assert_eq!(best.trial, 2, "Equal spreads go to the lowest trial index");
    assert_eq!(best.valid_trials, 4);

    assert!(select_best(Vec::new(), &population).is_none());
}

#[test]
fn same_seed_gives_same_roster_regardless_of_worker_count() {
    let people = field_soldiers(7);
    let reqs = vec![ShiftRequirement::fixed("soldier", 3)];
    let cal = CampaignCalendar::new(d("2024-01-01"), d("2024-01-21"), Some(d("2024-01-02"))).unwrap();

    let run = |threads: usize| {
        let mut policy = PolicyConfig::default();
        policy.rotation.parallelism = Some(threads);
        let generator = RotationGenerator::new(policy);
        scheduled(generator.generate(&people, &reqs, &cal, &Boost::none(), 12).unwrap())
    };

    let single = run(1);
    let many = run(4);
    assert_eq!(single.trial, many.trial);
    assert_eq!(single.roster, many.roster, "Selection must not depend on completion order");
}
