//! rota-runner: headless rotation runner.
//!
//! Usage:
//!   rota-runner --data-dir ./data
//!   rota-runner --data-dir ./data --trials 500 --seed 12345 --diagnose
//!
//! Reads `{data_dir}/plan.json`, generates a rotation, optionally fills
//! slack, logs a workload summary and prints the shifts as JSON on stdout.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rota_core::{
    calendar::CampaignCalendar,
    config::PolicyConfig,
    model::{attach_preferences, Person, Preference},
    requirement::{Boost, ShiftRequirement},
    roles::finalize_people,
    rotation::{field_population, RotationGenerator, RotationOutcome},
    slack::fill_slack,
};
use std::env;

#[derive(serde::Deserialize)]
struct SlackRequest {
    target_idle_days: usize,
    max_daily_boost:  usize,
}

#[derive(serde::Deserialize)]
struct CampaignPlan {
    start:        NaiveDate,
    end:          NaiveDate,
    #[serde(default)]
    special_end:  Option<NaiveDate>,
    people:       Vec<Person>,
    #[serde(default)]
    preferences:  Vec<Preference>,
    requirements: Vec<ShiftRequirement>,
    #[serde(default)]
    boost:        Boost,
    #[serde(default)]
    slack:        Option<SlackRequest>,
}

#[derive(serde::Serialize)]
struct RunOutput<'a> {
    trial:  u64,
    spread: usize,
    shifts: &'a [rota_core::roster::Shift],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let trials = parse_arg(&args, "--trials", 200usize);
    let seed = args
        .windows(2)
        .find(|w| w[0] == "--seed")
        .and_then(|w| w[1].parse::<u64>().ok());
    let diagnose = args.iter().any(|a| a == "--diagnose");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    let mut policy = PolicyConfig::load(data_dir).unwrap_or_else(|e| {
        log::warn!("{e}; using default policy");
        PolicyConfig::default()
    });
    if let Some(seed) = seed {
        policy.rotation.master_seed = seed;
    }

    let plan_path = format!("{data_dir}/plan.json");
    let content = std::fs::read_to_string(&plan_path).with_context(|| format!("Cannot read {plan_path}"))?;
    let mut plan: CampaignPlan =
        serde_json::from_str(&content).with_context(|| format!("Cannot parse {plan_path}"))?;

    finalize_people(&mut plan.people, &policy.roles);
    for orphan in attach_preferences(&mut plan.people, std::mem::take(&mut plan.preferences)) {
        log::warn!("Preference for unknown person '{}' ignored", orphan.person_id);
    }

    let calendar = CampaignCalendar::new(plan.start, plan.end, plan.special_end)?;
    log::info!(
        "rota-runner: {} people, {} → {} ({} days), {trials} trials, seed {:#x}",
        plan.people.len(),
        plan.start,
        plan.end,
        calendar.len(),
        policy.rotation.master_seed
    );

    let generator = RotationGenerator::new(policy.clone());
    let selected = match generator.generate(&plan.people, &plan.requirements, &calendar, &plan.boost, trials)? {
        RotationOutcome::Scheduled(selected) => selected,
        RotationOutcome::NoFeasibleSchedule { trials, failed } => {
            if diagnose {
                let report = generator.diagnose(&plan.people, &plan.requirements, &calendar, &plan.boost, 0);
                for stall in &report.stalls {
                    log::warn!("  {} still short: {:?}", stall.date, stall.remaining);
                }
            }
            bail!("No feasible schedule in {trials} trials ({failed} failed); rerun with --diagnose");
        }
    };

    let mut roster = selected.roster;
    if let Some(req) = &plan.slack {
        let (filled, report) = fill_slack(
            roster,
            &plan.people,
            &calendar,
            req.target_idle_days,
            req.max_daily_boost,
            &policy.slack,
            &policy.roles,
        );
        for (day, added) in &report.boosted_days {
            log::info!("  {day}: +{added}");
        }
        roster = filled;
    }

    print_summary(&plan.people, &roster, &calendar, &policy);

    let output = RunOutput {
        trial:  selected.trial,
        spread: roster.spread(field_population(&plan.people, &policy.roles.field_role)),
        shifts: roster.shifts(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_summary(
    people: &[Person],
    roster: &rota_core::roster::Roster,
    calendar: &CampaignCalendar,
    policy: &PolicyConfig,
) {
    let counts = roster.counts();
    log::info!("=== WORKLOAD ===");
    for p in field_population(people, &policy.roles.field_role) {
        let worked = counts.get(p.id.as_str()).copied().unwrap_or(0);
        log::info!(
            "  {:<20} {:>3} worked  {:>3} idle",
            p.name,
            worked,
            calendar.len().saturating_sub(worked)
        );
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
