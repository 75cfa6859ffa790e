//! Campaign calendar: the day list a rotation is built over.
//!
//! Classifies each day as intensive (all-hands, no scoring), terminal
//! (copies the day before), post-intensive week, or normal.

use crate::error::{RotaError, RotaResult};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignCalendar {
    days:        Vec<NaiveDate>,
    special_end: Option<NaiveDate>,
}

impl CampaignCalendar {
    /// Inclusive range. `special_end` closes the intensive period.
    pub fn new(start: NaiveDate, end: NaiveDate, special_end: Option<NaiveDate>) -> RotaResult<Self> {
        if start > end {
            return Err(RotaError::InvalidDateRange { start, end });
        }
        let days = start.iter_days().take_while(|d| *d <= end).collect();
        Ok(Self { days, special_end })
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first(&self) -> NaiveDate {
        self.days[0]
    }

    pub fn last(&self) -> NaiveDate {
        self.days[self.days.len() - 1]
    }

    pub fn special_end(&self) -> Option<NaiveDate> {
        self.special_end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first() <= date && date <= self.last()
    }

    pub fn is_intensive(&self, date: NaiveDate) -> bool {
        self.special_end.is_some_and(|end| date <= end)
    }

    pub fn is_terminal(&self, date: NaiveDate) -> bool {
        date == self.last()
    }

    pub fn is_penultimate(&self, date: NaiveDate) -> bool {
        self.days.len() >= 2 && date == self.days[self.days.len() - 2]
    }

    /// The two closing days, exempt from validity checks and slack filling.
    pub fn in_closing_block(&self, date: NaiveDate) -> bool {
        self.is_terminal(date) || self.is_penultimate(date)
    }

    /// Days exempt from headcount targets.
    pub fn is_exempt(&self, date: NaiveDate) -> bool {
        self.is_intensive(date) || self.in_closing_block(date)
    }

    /// 1-based offset into the window right after the intensive period,
    /// or None outside it.
    pub fn post_intensive_offset(&self, date: NaiveDate, window_days: i64) -> Option<i64> {
        let end = self.special_end?;
        let offset = (date - end).num_days();
        (1..=window_days).contains(&offset).then_some(offset)
    }

    /// Eligible days grouped by ISO week, in chronological order.
    pub fn iso_weeks(&self) -> Vec<Vec<NaiveDate>> {
        let mut weeks: BTreeMap<(i32, u32), Vec<NaiveDate>> = BTreeMap::new();
        for &day in &self.days {
            if self.is_exempt(day) {
                continue;
            }
            let iso = day.iso_week();
            weeks.entry((iso.year(), iso.week())).or_default().push(day);
        }
        weeks.into_values().collect()
    }
}

pub fn yesterday(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(1)).unwrap_or(date)
}

pub fn tomorrow(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_saturday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sat
}
