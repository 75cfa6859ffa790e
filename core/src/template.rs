//! Mission templates: the daily duty slots a campaign runs.
//!
//! `expand_templates` turns each template into one slot per calendar day
//! (per instance). Ids and names are stable so re-running the expansion
//! over an existing snapshot only adds what is missing, and names end in
//! ` - YYYY-MM-DD` so `continuity::base_name` links a day to the next.

use crate::{
    calendar::CampaignCalendar,
    error::{RotaError, RotaResult},
    model::DutySlot,
    types::{Role, SlotId},
};
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

fn one() -> u32 { 1 }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionTemplate {
    pub template_id:    String,
    pub name:           String,
    pub start_time:     NaiveTime,
    pub duration_hours: f64,
    pub roles_required: BTreeMap<Role, u32>,
    #[serde(default)]
    pub continuous:     bool,
    /// Copies running side by side each day.
    #[serde(default = "one")]
    pub instances:      u32,
    #[serde(default)]
    pub notes:          String,
}

impl MissionTemplate {
    pub fn new(
        template_id: impl Into<String>,
        name: impl Into<String>,
        start_time: NaiveTime,
        duration_hours: f64,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            name: name.into(),
            start_time,
            duration_hours,
            roles_required: BTreeMap::new(),
            continuous: false,
            instances: one(),
            notes: String::new(),
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

    pub fn with_instances(mut self, instances: u32) -> Self {
        self.instances = instances;
        self
    }

    fn duration(&self) -> Option<Duration> {
        if !self.duration_hours.is_finite() || self.duration_hours < 0.0 {
            return None;
        }
        Duration::try_milliseconds((self.duration_hours * 3_600_000.0).round() as i64)
    }

    /// Id and name for instance `n` on campaign day `k` (both 1-based).
    fn label(&self, n: u32, k: usize, date: NaiveDate) -> (SlotId, String) {
        if self.instances > 1 {
            (
                format!("{}_{n}_day{k}", self.template_id),
                format!("{} #{n} - {date}", self.name),
            )
        } else {
            (format!("{}_day{k}", self.template_id), format!("{} - {date}", self.name))
        }
    }
}

/// New slots for every (day, template, instance) whose id is not in
/// `existing_ids`, in day order then template order.
pub fn expand_templates(
    templates: &[MissionTemplate],
    calendar: &CampaignCalendar,
    existing_ids: &HashSet<SlotId>,
) -> RotaResult<Vec<DutySlot>> {
    let mut slots = Vec::new();
    for (i, &date) in calendar.days().iter().enumerate() {
        let k = i + 1;
        for template in templates {
            for n in 1..=template.instances {
                let (id, name) = template.label(n, k, date);
                if existing_ids.contains(&id) {
                    continue;
                }
                let start = date.and_time(template.start_time);
                let end = template
                    .duration()
                    .and_then(|d| start.checked_add_signed(d))
                    .ok_or_else(|| RotaError::InvalidSlotWindow { slot_id: id.clone() })?;

                let mut slot = DutySlot::new(id, name, start, end);
                slot.roles_required = template.roles_required.clone();
                slot.continuous = template.continuous;
                slots.push(slot);
            }
        }
    }
    log::debug!(
        "expanded {} templates over {} days into {} new slots",
        templates.len(),
        calendar.len(),
        slots.len()
    );
    Ok(slots)
}
