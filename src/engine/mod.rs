//! The entry pipeline: admission check, total recomputation and status
//! derivation. Everything in here is pure; loading and persisting is the
//! caller's job (see `service`).

pub mod aggregator;
pub mod status;
pub mod validator;

pub use aggregator::{Totals, recompute, work_dates};
pub use status::classify;
pub use validator::validate;

use crate::error::{Reject, TimesheetError};
use crate::types::{EntryDraft, EntryId, EntryPatch, TaskEntry, WeekRecord};

/// Maximum hours bookable on one date.
pub const DAILY_CAP: u32 = 8;
/// Hours at which a week counts as completed.
pub const WEEKLY_TARGET: u32 = 40;
pub const WORK_DAYS: u64 = 5;
pub const ALLOWED_HOURS: [u32; 4] = [1, 2, 4, 8];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    Create { id: EntryId, draft: EntryDraft },
    Update { id: EntryId, patch: EntryPatch },
    Delete { id: EntryId },
}

impl Mutation {
    pub fn entry_id(&self) -> &str {
        match self {
            Mutation::Create { id, .. } | Mutation::Update { id, .. } | Mutation::Delete { id } => {
                id
            }
        }
    }
}

/// Result of an admitted mutation, ready to be persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    pub entries: Vec<TaskEntry>,
    pub week: WeekRecord,
    pub totals: Totals,
    /// The created or updated entry; `None` after a delete.
    pub entry: Option<TaskEntry>,
}

/// Applies `mutation` to a copy of `entries` (all entries of `week`) and
/// recomputes the week. On error nothing is returned, so the caller's state
/// stays as it was.
pub fn apply_entry_mutation(
    mutation: Mutation,
    week: &WeekRecord,
    entries: &[TaskEntry],
) -> Result<Applied, TimesheetError> {
    let mut working = entries.to_vec();
    let touched = match mutation {
        Mutation::Create { id, draft } => {
            if entries.iter().any(|e| e.id == id) {
                return Err(Reject::invalid("id", format!("entry {id} already exists")).into());
            }
            let candidate = draft.into_entry(id, week.id.clone());
            check_in_week(week, &candidate)?;
            validate(entries, &candidate, None)?;
            working.push(candidate.clone());
            Some(candidate)
        }
        Mutation::Update { id, patch } => {
            let index = position(entries, &id)?;
            let candidate = patch.apply(&entries[index]);
            check_in_week(week, &candidate)?;
            validate(entries, &candidate, Some(id.as_str()))?;
            working[index] = candidate.clone();
            Some(candidate)
        }
        Mutation::Delete { id } => {
            let index = position(entries, &id)?;
            working.remove(index);
            None
        }
    };

    let (week, totals) = refresh_week(week, &working);
    Ok(Applied {
        entries: working,
        week,
        totals,
        entry: touched,
    })
}

/// Re-derives `total_hours` and `status` of `week` from `entries`.
pub fn refresh_week(week: &WeekRecord, entries: &[TaskEntry]) -> (WeekRecord, Totals) {
    let totals = recompute(week.start_date, entries);
    let refreshed = WeekRecord {
        total_hours: totals.week_total,
        status: classify(totals.week_total),
        ..week.clone()
    };
    (refreshed, totals)
}

fn position(entries: &[TaskEntry], id: &str) -> Result<usize, TimesheetError> {
    entries
        .iter()
        .position(|e| e.id == id)
        .ok_or_else(|| TimesheetError::EntryNotFound(id.to_string()))
}

fn check_in_week(week: &WeekRecord, candidate: &TaskEntry) -> Result<(), Reject> {
    if week.contains(candidate.date) {
        return Ok(());
    }
    Err(Reject::invalid(
        "date",
        format!(
            "{} is outside week {} ({} to {})",
            candidate.date, week.week, week.start_date, week.end_date
        ),
    ))
}
