use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use crate::types::TaskEntry;

use super::WORK_DAYS;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    /// Hours per date. Always holds the working days of the week, plus any
    /// other date that has entries.
    pub per_day: BTreeMap<NaiveDate, u32>,
    pub week_total: u32,
}

impl Totals {
    pub fn day(&self, date: NaiveDate) -> u32 {
        self.per_day.get(&date).copied().unwrap_or(0)
    }
}

/// The working dates `week_start ..= week_start + 4`.
pub fn work_dates(week_start: NaiveDate) -> Vec<NaiveDate> {
    (0..WORK_DAYS)
        .filter_map(|offset| week_start.checked_add_days(Days::new(offset)))
        .collect()
}

/// Recomputes day and week totals from scratch.
///
/// The week total covers every entry handed in, including entries dated
/// outside the working days. Sums saturate at `u32::MAX`.
pub fn recompute(week_start: NaiveDate, entries: &[TaskEntry]) -> Totals {
    let mut per_day: BTreeMap<NaiveDate, u32> =
        work_dates(week_start).into_iter().map(|d| (d, 0)).collect();
    let mut week_total: u32 = 0;
    for entry in entries {
        let day = per_day.entry(entry.date).or_insert(0);
        *day = day.saturating_add(entry.hours);
        week_total = week_total.saturating_add(entry.hours);
    }
    Totals {
        per_day,
        week_total,
    }
}
