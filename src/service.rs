/// Host side of the entry pipeline: authorization, loading and persisting
/// around the pure engine. Every week mutation runs inside one store-level
/// `update_week` call, so concurrent writers of the same week serialize.
use chrono::{Datelike, NaiveDate, Weekday};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::Principal;
use crate::dashboard::{self, PageRequest, WeekDetail, WeekFilter, WeekPage};
use crate::engine::{self, Applied, Mutation};
use crate::error::{Reject, TimesheetError};
use crate::store::{TimesheetStore, WeekSnapshot};
use crate::types::{EntryDraft, EntryPatch, TaskEntry, WeekRecord};

pub struct Timesheets<S> {
    store: S,
}

impl<S: TimesheetStore> Timesheets<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load_week(&self, week_id: &str) -> Result<WeekRecord, TimesheetError> {
        self.store
            .load_week(week_id)?
            .ok_or_else(|| TimesheetError::WeekNotFound(week_id.to_string()))
    }

    /// Opens a new, empty week starting on a Monday.
    pub fn create_week(
        &self,
        principal: &Principal,
        start_date: NaiveDate,
    ) -> Result<WeekRecord, TimesheetError> {
        if start_date.weekday() != Weekday::Mon {
            return Err(Reject::invalid(
                "start date",
                format!("{start_date} is a {}, weeks start on Monday", start_date.weekday()),
            )
            .into());
        }
        let week = WeekRecord::new(Uuid::new_v4().to_string(), start_date);
        if !self.store.insert_week(&week)? {
            return Err(
                Reject::invalid("start date", format!("a week starting {start_date} exists")).into(),
            );
        }
        info!(week_id = %week.id, week = week.week, user = principal.email(), "week created");
        Ok(week)
    }

    /// Runs one mutation against a week: load, admit, apply, recompute and
    /// persist, as one exclusive store update.
    pub fn apply(
        &self,
        principal: &Principal,
        week_id: &str,
        mutation: Mutation,
    ) -> Result<Applied, TimesheetError> {
        let entry_id = mutation.entry_id().to_string();
        let applied = self.store.update_week(week_id, |current| {
            let WeekSnapshot { week, entries } =
                current.ok_or_else(|| TimesheetError::WeekNotFound(week_id.to_string()))?;
            debug!(week_id, entries = entries.len(), "week loaded");

            let applied = match engine::apply_entry_mutation(mutation, &week, &entries) {
                Ok(applied) => applied,
                Err(err) => {
                    warn!(week_id, entry_id = %entry_id, reason = %err, "entry mutation rejected");
                    return Err(err);
                }
            };
            let snapshot = WeekSnapshot {
                week: applied.week.clone(),
                entries: applied.entries.clone(),
            };
            Ok::<_, TimesheetError>((Some(snapshot), applied))
        })?;
        info!(
            week_id,
            entry_id = %entry_id,
            user = principal.email(),
            total_hours = applied.week.total_hours,
            status = %applied.week.status,
            "entry mutation applied"
        );
        Ok(applied)
    }

    pub fn add_entry(
        &self,
        principal: &Principal,
        week_id: &str,
        draft: EntryDraft,
    ) -> Result<Applied, TimesheetError> {
        let id = format!("entry-{}", Uuid::new_v4());
        self.apply(principal, week_id, Mutation::Create { id, draft })
    }

    pub fn edit_entry(
        &self,
        principal: &Principal,
        entry_id: &str,
        patch: EntryPatch,
    ) -> Result<Applied, TimesheetError> {
        let entry = self.find_entry(entry_id)?;
        self.apply(
            principal,
            &entry.week_id,
            Mutation::Update {
                id: entry.id,
                patch,
            },
        )
    }

    pub fn delete_entry(
        &self,
        principal: &Principal,
        entry_id: &str,
    ) -> Result<Applied, TimesheetError> {
        let entry = self.find_entry(entry_id)?;
        self.apply(principal, &entry.week_id, Mutation::Delete { id: entry.id })
    }

    /// Re-derives a stored week from its stored entries.
    pub fn recompute_week(
        &self,
        principal: &Principal,
        week_id: &str,
    ) -> Result<WeekRecord, TimesheetError> {
        let (stored, week) = self.store.update_week(week_id, |current| {
            let WeekSnapshot { week: stored, entries } =
                current.ok_or_else(|| TimesheetError::WeekNotFound(week_id.to_string()))?;
            let (week, _) = engine::refresh_week(&stored, &entries);
            let write = (week != stored).then(|| WeekSnapshot {
                week: week.clone(),
                entries,
            });
            Ok::<_, TimesheetError>((write, (stored, week)))
        })?;
        if week != stored {
            info!(
                week_id,
                user = principal.email(),
                before = stored.total_hours,
                after = week.total_hours,
                "week totals repaired"
            );
        }
        Ok(week)
    }

    pub fn find_entry(&self, entry_id: &str) -> Result<TaskEntry, TimesheetError> {
        self.store
            .find_entry(entry_id)?
            .ok_or_else(|| TimesheetError::EntryNotFound(entry_id.to_string()))
    }

    pub fn week(&self, week_id: &str) -> Result<WeekRecord, TimesheetError> {
        self.load_week(week_id)
    }

    pub fn list_weeks(
        &self,
        filter: &WeekFilter,
        request: PageRequest,
    ) -> Result<WeekPage, TimesheetError> {
        let weeks = self.store.load_weeks()?;
        Ok(dashboard::list_weeks(weeks, filter, request)?)
    }

    pub fn week_detail(&self, week_id: &str) -> Result<WeekDetail, TimesheetError> {
        let week = self.load_week(week_id)?;
        let entries = self.store.load_entries(week_id)?;
        Ok(dashboard::week_detail(&week, &entries))
    }
}
