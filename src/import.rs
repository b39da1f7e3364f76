/// Loads the legacy flat JSON files (`weekly-timesheets.json`,
/// `timesheet-entries.json`, `users.json`) into a store.
///
/// Stored totals and statuses from the files are not trusted: every
/// imported week is recomputed from its entries before it is written.
/// Nothing is written unless the whole import passes its checks, and then
/// everything is written in one batch.
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::hash_password;
use crate::engine::{self, ALLOWED_HOURS, DAILY_CAP};
use crate::store::{TimesheetStore, WeekSnapshot};
use crate::types::{TaskEntry, User, WeekId, WeekRecord};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyWeek {
    id: String,
    start_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyEntry {
    id: String,
    timesheet_id: String,
    date: NaiveDate,
    project: String,
    hours: u32,
    #[serde(default)]
    work_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyUser {
    id: String,
    email: String,
    password: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub weeks: usize,
    pub entries: usize,
    pub users: usize,
    /// Entries pointing at a week that is not in the week file.
    pub orphaned: usize,
    /// Entries skipped because their hours are not a bookable amount.
    pub invalid_hours: usize,
    /// Days whose imported hours already exceed the daily cap.
    pub over_cap_days: usize,
}

pub fn import_files(
    store: &impl TimesheetStore,
    weeks_path: &Path,
    entries_path: &Path,
    users_path: Option<&Path>,
) -> Result<ImportSummary> {
    let weeks = read(weeks_path)?;
    let entries = read(entries_path)?;
    let users = users_path.map(read).transpose()?;
    import_legacy(store, &weeks, &entries, users.as_deref())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

pub fn import_legacy(
    store: &impl TimesheetStore,
    weeks_json: &str,
    entries_json: &str,
    users_json: Option<&str>,
) -> Result<ImportSummary> {
    let legacy_weeks: Vec<LegacyWeek> =
        serde_json::from_str(weeks_json).context("parsing weekly timesheets")?;
    let legacy_entries: Vec<LegacyEntry> =
        serde_json::from_str(entries_json).context("parsing timesheet entries")?;
    let legacy_users: Vec<LegacyUser> = match users_json {
        Some(json) => serde_json::from_str(json).context("parsing users")?,
        None => Vec::new(),
    };

    check_weeks(store, &legacy_weeks)?;
    let users = check_users(store, legacy_users)?;

    let mut summary = ImportSummary::default();
    let mut by_week: HashMap<WeekId, Vec<TaskEntry>> = HashMap::new();
    let known: HashSet<&str> = legacy_weeks.iter().map(|w| w.id.as_str()).collect();
    let mut entry_ids = HashSet::new();
    for legacy in legacy_entries {
        if !known.contains(legacy.timesheet_id.as_str()) {
            warn!(entry_id = %legacy.id, week_id = %legacy.timesheet_id, "skipping entry of unknown week");
            summary.orphaned += 1;
            continue;
        }
        if !ALLOWED_HOURS.contains(&legacy.hours) {
            warn!(entry_id = %legacy.id, hours = legacy.hours, "skipping entry with invalid hours");
            summary.invalid_hours += 1;
            continue;
        }
        if !entry_ids.insert(legacy.id.clone()) {
            bail!("entry {} appears more than once", legacy.id);
        }
        if store.find_entry(&legacy.id)?.is_some() {
            bail!("entry {} already exists", legacy.id);
        }
        by_week
            .entry(legacy.timesheet_id.clone())
            .or_default()
            .push(TaskEntry {
                id: legacy.id,
                week_id: legacy.timesheet_id,
                date: legacy.date,
                project: legacy.project,
                work_type: legacy.work_type.filter(|w| !w.is_empty()),
                description: legacy.description.unwrap_or_default(),
                hours: legacy.hours,
            });
    }

    let mut snapshots = Vec::with_capacity(legacy_weeks.len());
    for legacy in legacy_weeks {
        let entries = by_week.remove(&legacy.id).unwrap_or_default();
        let (week, totals) =
            engine::refresh_week(&WeekRecord::new(legacy.id, legacy.start_date), &entries);
        for (date, hours) in &totals.per_day {
            if *hours > DAILY_CAP {
                warn!(week_id = %week.id, %date, hours, "imported day exceeds the daily cap");
                summary.over_cap_days += 1;
            }
        }
        summary.entries += entries.len();
        snapshots.push(WeekSnapshot { week, entries });
    }
    summary.weeks = snapshots.len();
    summary.users = users.len();

    store.save_batch(&snapshots, &users)?;

    info!(
        weeks = summary.weeks,
        entries = summary.entries,
        users = summary.users,
        orphaned = summary.orphaned,
        invalid_hours = summary.invalid_hours,
        "legacy data imported"
    );
    Ok(summary)
}

/// Imported weeks must be new: no id or start date may clash with each other
/// or with a stored week.
fn check_weeks(store: &impl TimesheetStore, legacy_weeks: &[LegacyWeek]) -> Result<()> {
    let stored = store.load_weeks()?;
    let mut ids = HashSet::new();
    let mut starts = HashSet::new();
    for legacy in legacy_weeks {
        if !ids.insert(legacy.id.as_str()) {
            bail!("week {} appears more than once", legacy.id);
        }
        if !starts.insert(legacy.start_date) {
            bail!("more than one week starts on {}", legacy.start_date);
        }
        if let Some(existing) = stored
            .iter()
            .find(|w| w.id == legacy.id || w.start_date == legacy.start_date)
        {
            bail!(
                "week {} ({}) conflicts with stored week {} ({})",
                legacy.id,
                legacy.start_date,
                existing.id,
                existing.start_date
            );
        }
    }
    Ok(())
}

/// A user may replace the stored user with the same id, but may not take an
/// email that belongs to someone else.
fn check_users(store: &impl TimesheetStore, legacy_users: Vec<LegacyUser>) -> Result<Vec<User>> {
    let mut emails = HashSet::new();
    let mut users = Vec::with_capacity(legacy_users.len());
    for legacy in legacy_users {
        if !emails.insert(legacy.email.clone()) {
            bail!("user email {} appears more than once", legacy.email);
        }
        if let Some(existing) = store.find_user_by_email(&legacy.email)? {
            if existing.id != legacy.id {
                bail!("email {} already belongs to user {}", legacy.email, existing.id);
            }
        }
        users.push(User {
            id: legacy.id,
            email: legacy.email,
            name: legacy.name,
            password_hash: hash_password(&legacy.password),
        });
    }
    Ok(users)
}
