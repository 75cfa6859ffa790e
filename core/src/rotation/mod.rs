//! Randomized rotation generator.
//!
//! Runs many independent trials of the greedy day-by-day construction,
//! keeps the ones that meet every headcount target, and returns the one
//! whose field population has the smallest workload spread.
//!
//! RULES:
//!   - Trials share nothing mutable. Each owns its RNG stream and ledger.
//!   - A trial that panics is logged and dropped, never fatal.
//!   - Ties on spread go to the lowest trial index, so the pick does
//!     not depend on which worker finished first.

pub mod scoring;
pub mod trial;
pub mod validity;

pub use trial::{DayStall, TrialInputs, TrialOutcome};
pub use validity::Shortfall;

use crate::{
    calendar::CampaignCalendar,
    config::PolicyConfig,
    error::{RotaError, RotaResult},
    model::Person,
    requirement::{internal_requirements, Boost, ShiftRequirement},
    rng::RngBank,
    roster::Roster,
    types::TrialIndex,
};
use log::{info, warn};
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use trial::TrialBuilder;

/// The winning trial.
#[derive(Debug, Clone)]
pub struct SelectedRotation {
    pub roster:       Roster,
    pub trial:        TrialIndex,
    /// Max minus min shift count over the field population.
    pub spread:       usize,
    pub valid_trials: usize,
}

#[derive(Debug, Clone)]
pub enum RotationOutcome {
    Scheduled(SelectedRotation),
    /// No trial met every target. `failed` counts trials that panicked.
    NoFeasibleSchedule { trials: usize, failed: usize },
}

impl RotationOutcome {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Scheduled(_))
    }

    pub fn into_roster(self) -> Option<Roster> {
        match self {
            Self::Scheduled(selected) => Some(selected.roster),
            Self::NoFeasibleSchedule { .. } => None,
        }
    }
}

/// People carrying the aggregate field tag. Spread is measured over them.
pub fn field_population<'a>(people: &'a [Person], field_role: &str) -> Vec<&'a Person> {
    people.iter().filter(|p| p.can_fill(field_role)).collect()
}

/// Pick the valid roster with the smallest spread, lowest index on ties.
pub fn select_best(candidates: Vec<(TrialIndex, Roster)>, population: &[&Person]) -> Option<SelectedRotation> {
    let valid_trials = candidates.len();
    candidates
        .into_iter()
        .map(|(trial, roster)| {
            let spread = roster.spread(population.iter().copied());
            (spread, trial, roster)
        })
        .min_by_key(|(spread, trial, _)| (*spread, *trial))
        .map(|(spread, trial, roster)| SelectedRotation { roster, trial, spread, valid_trials })
}

pub struct RotationGenerator {
    policy: PolicyConfig,
}

impl RotationGenerator {
    pub fn new(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Run `trial_count` trials and select the best valid roster.
    /// Requirements for externally staffed roles are ignored.
    pub fn generate(
        &self,
        people: &[Person],
        requirements: &[ShiftRequirement],
        calendar: &CampaignCalendar,
        boost: &Boost,
        trial_count: usize,
    ) -> RotaResult<RotationOutcome> {
        let requirements = internal_requirements(requirements, &self.policy.roles.external_prefix);
        let inputs = TrialInputs {
            people,
            requirements: &requirements,
            calendar,
            boost,
            policy: &self.policy,
        };
        let bank = RngBank::new(self.policy.rotation.master_seed);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.policy.rotation.parallelism.unwrap_or(0))
            .build()
            .map_err(|e| RotaError::TrialPool(e.to_string()))?;

        info!(
            "Generating rotation: {} people, {} days, {} trials",
            people.len(),
            calendar.len(),
            trial_count
        );

        let results: Vec<Option<TrialOutcome>> = pool.install(|| {
            (0..trial_count as TrialIndex)
                .into_par_iter()
                .map(|i| {
                    let run = AssertUnwindSafe(|| TrialBuilder::new(&inputs, bank.for_trial(i), false).run());
                    match catch_unwind(run) {
                        Ok(outcome) => Some(outcome),
                        Err(_) => {
                            warn!("Trial {i} panicked and was discarded");
                            None
                        }
                    }
                })
                .collect()
        });

        let failed = results.iter().filter(|r| r.is_none()).count();
        let valid: Vec<(TrialIndex, Roster)> = results
            .into_iter()
            .flatten()
            .filter(TrialOutcome::is_valid)
            .map(|o| (o.trial, o.roster))
            .collect();

        let population = field_population(people, &self.policy.roles.field_role);
        match select_best(valid, &population) {
            Some(selected) => {
                info!(
                    "Selected trial {} of {} valid: {} shifts, spread {}",
                    selected.trial,
                    selected.valid_trials,
                    selected.roster.len(),
                    selected.spread
                );
                Ok(RotationOutcome::Scheduled(selected))
            }
            None => {
                warn!("No valid schedule found in {trial_count} trials ({failed} failed)");
                Ok(RotationOutcome::NoFeasibleSchedule { trials: trial_count, failed })
            }
        }
    }

    /// Run a single trial with per-day logging of unmet needs.
    pub fn diagnose(
        &self,
        people: &[Person],
        requirements: &[ShiftRequirement],
        calendar: &CampaignCalendar,
        boost: &Boost,
        trial: TrialIndex,
    ) -> TrialOutcome {
        let requirements = internal_requirements(requirements, &self.policy.roles.external_prefix);
        let inputs = TrialInputs {
            people,
            requirements: &requirements,
            calendar,
            boost,
            policy: &self.policy,
        };
        let rng = RngBank::new(self.policy.rotation.master_seed).for_trial(trial);
        let outcome = TrialBuilder::new(&inputs, rng, true).run();
        if let Some(miss) = &outcome.shortfall {
            warn!(
                "Trial {trial}: first shortfall on {} for {} ({} of {})",
                miss.date, miss.role, miss.assigned, miss.target
            );
        }
        outcome
    }
}
