//! Scoring policy: every tunable constant of both engines in one table.
//!
//! RULE: No scoring literal lives outside this file.
//! Engines receive a PolicyConfig (or one of its sections) and read
//! magnitudes from it, so each term can be tuned or zeroed in tests.

use serde::{Deserialize, Serialize};

// ── Candidate ranking ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingPolicy {
    /// Added when the person has a scheduled vacation on the slot's date.
    pub vacation_penalty: f64,
    /// Multiplier on how far a person's work/rest ratio sits below their role average.
    pub fairness_multiplier: f64,
    pub pair_with_bonus: f64,
    pub avoid_person_penalty: f64,
    pub prefer_mission_bonus: f64,
    pub avoid_mission_penalty: f64,
    pub day_type_bonus: f64,
    /// Added when nobody already on the slot shares the person's unit.
    pub unit_mix_penalty: f64,
    /// Added when the role is a secondary capability for the person.
    pub secondary_role_penalty: f64,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            vacation_penalty:       10_000.0,
            fairness_multiplier:    10.0,
            pair_with_bonus:        20.0,
            avoid_person_penalty:   50.0,
            prefer_mission_bonus:   15.0,
            avoid_mission_penalty:  30.0,
            day_type_bonus:         10.0,
            unit_mix_penalty:       5.0,
            secondary_role_penalty: 10.0,
        }
    }
}

// ── Rotation generator ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationPolicy {
    /// Exponent on a person's assignment count. High values force near-equal totals.
    pub workload_exponent: i32,
    pub workload_scale: f64,
    /// Subtracted per unavailable date inside the campaign range.
    pub unavailability_bonus: f64,
    /// Uniform jitter amplitude. 0.0 makes a trial fully deterministic.
    pub jitter_amplitude: f64,
    /// Saturday term of a weekend/weekday preference.
    pub day_preference_major: f64,
    /// Non-Saturday term of a weekend/weekday preference.
    pub day_preference_minor: f64,
    /// Saturday bonus for working Friday too, penalty otherwise.
    pub saturday_pairing: f64,
    /// Rest gap below three days.
    pub short_rest_penalty: f64,
    /// Rest gap of exactly two days (a lone rest day).
    pub single_rest_day_penalty: f64,
    /// Rest gap below two days.
    pub no_rest_penalty: f64,
    /// Subtracted for streaks of 1–2 days on non-Saturdays.
    pub short_streak_bonus: f64,
    /// Per-day ramp in the week after the intensive period.
    pub post_intensive_ramp: f64,
    pub post_intensive_window_days: i64,
    /// Per previous fill of the same role.
    pub role_repeat_weight: f64,
    /// Added when the person's unit is already on duty today.
    pub unit_duplicate_penalty: f64,
    pub master_seed: u64,
    /// Worker count for the trial pool. None uses every available core.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            workload_exponent:          8,
            workload_scale:             1_000_000.0,
            unavailability_bonus:       5_000_000.0,
            jitter_amplitude:           1_000.0,
            day_preference_major:       5_000_000.0,
            day_preference_minor:       100_000.0,
            saturday_pairing:           10_000_000.0,
            short_rest_penalty:         500_000.0,
            single_rest_day_penalty:    2_000_000.0,
            no_rest_penalty:            1_000_000.0,
            short_streak_bonus:         150_000.0,
            post_intensive_ramp:        3_000_000.0,
            post_intensive_window_days: 7,
            role_repeat_weight:         100.0,
            unit_duplicate_penalty:     500_000.0,
            master_seed:                0x5EED_0F_D07A,
            parallelism:                None,
        }
    }
}

// ── Slack filling ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackPolicy {
    /// Days per ISO week picked for a burst of extra duty.
    pub burst_days_per_week: usize,
    /// A day's additions are committed only if the day reaches this many extras.
    pub min_commit: usize,
}

impl Default for SlackPolicy {
    fn default() -> Self {
        Self { burst_days_per_week: 2, min_commit: 3 }
    }
}

// ── Vacation planning ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningPolicy {
    /// Sending the person home would drop their role below the on-site minimum.
    pub understaffed_penalty: f64,
    /// Per slot the person is assigned to inside the window.
    pub assigned_penalty: f64,
    pub already_off_penalty: f64,
    pub per_vacation_taken: f64,
    pub preferred_date_bonus: f64,
}

impl Default for PlanningPolicy {
    fn default() -> Self {
        Self {
            understaffed_penalty: 1_000.0,
            assigned_penalty:     500.0,
            already_off_penalty:  2_000.0,
            per_vacation_taken:   5.0,
            preferred_date_bonus: 10.0,
        }
    }
}

// ── Role vocabulary ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePolicy {
    pub field_units: Vec<String>,
    pub staff_unit: String,
    pub staff_roles: Vec<String>,
    pub fighter_roles: Vec<String>,
    pub specialist_roles: Vec<String>,
    /// Expands into officer + commander.
    pub compound_role: String,
    pub officer_role: String,
    pub commander_role: String,
    pub soldier_role: String,
    pub staff_extra_role: String,
    pub command_aggregate_role: String,
    /// Aggregate tag carried by the rotation-eligible field population.
    pub field_role: String,
    /// Role tag recorded on slack-fill shifts.
    pub extra_role: String,
    /// First match in a person's roles names their intensive-period duty.
    pub intensive_priority: Vec<String>,
    pub intensive_fallback: String,
    pub external_prefix: String,
}

impl Default for RolePolicy {
    fn default() -> Self {
        let strings = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            field_units:            strings(&["1", "2", "3"]),
            staff_unit:             "staff".into(),
            staff_roles:            strings(&["commander", "officer", "samal"]),
            fighter_roles:          strings(&["soldier", "medic", "driver"]),
            specialist_roles:       strings(&["medic", "driver"]),
            compound_role:          "samal".into(),
            officer_role:           "officer".into(),
            commander_role:         "commander".into(),
            soldier_role:           "soldier".into(),
            staff_extra_role:       "staff_extra".into(),
            command_aggregate_role: "total_command".into(),
            field_role:             "total_soldiers".into(),
            extra_role:             "soldier_extra".into(),
            intensive_priority:     strings(&["commander", "officer", "medic", "driver", "mp", "rsp"]),
            intensive_fallback:     "on_duty".into(),
            external_prefix:        "external_".into(),
        }
    }
}

impl RolePolicy {
    pub fn is_field_unit(&self, unit: Option<&str>) -> bool {
        unit.is_some_and(|u| self.field_units.iter().any(|f| f == u))
    }

    pub fn is_staff_unit(&self, unit: Option<&str>) -> bool {
        unit.is_some_and(|u| u.eq_ignore_ascii_case(&self.staff_unit))
    }

    pub fn is_specialist(&self, role: &str) -> bool {
        self.specialist_roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

// ── Whole table ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub ranking: RankingPolicy,
    #[serde(default)]
    pub rotation: RotationPolicy,
    #[serde(default)]
    pub slack: SlackPolicy,
    #[serde(default)]
    pub planning: PlanningPolicy,
    #[serde(default)]
    pub roles: RolePolicy,
}

impl PolicyConfig {
    /// Load from the data/ directory.
    /// In tests, use PolicyConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/policy/scoring_policy.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let policy: PolicyConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(policy)
    }

    /// Default table with jitter switched off. Trials become reproducible
    /// independent of the seed.
    pub fn without_jitter() -> Self {
        let mut policy = Self::default();
        policy.rotation.jitter_amplitude = 0.0;
        policy
    }
}
