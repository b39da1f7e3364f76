use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub type WeekId = String;
pub type EntryId = String;
pub type UserId = String;

/// Projects an entry can be booked against.
pub const PROJECTS: &[&str] = &["Alpha 12", "Beta", "Gamma", "Delta", "Epsilon"];

pub const WORK_TYPES: &[&str] = &[
    "Development",
    "Testing",
    "Design",
    "Documentation",
    "Review",
    "Deployment",
    "Meeting",
    "Support",
];

/// Derived state of a week, see `engine::status::classify`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Completed,
    Incompleted,
    Missing,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Completed => "Completed",
            Status::Incompleted => "Incompleted",
            Status::Missing => "Missing",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "completed" => Ok(Status::Completed),
            "incompleted" => Ok(Status::Incompleted),
            "missing" => Ok(Status::Missing),
            other => Err(format!(
                "unknown status '{other}', expected Completed, Incompleted or Missing"
            )),
        }
    }
}

/// A Monday-to-Friday timesheet. `total_hours` and `status` are derived
/// from the week's entries and only ever written by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRecord {
    pub id: WeekId,
    pub week: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_hours: u32,
    pub status: Status,
}

impl WeekRecord {
    /// A fresh, empty week starting at `start_date`.
    pub fn new(id: WeekId, start_date: NaiveDate) -> Self {
        let end_date = start_date
            .checked_add_days(Days::new(4))
            .unwrap_or(start_date);
        Self {
            id,
            week: start_date.iso_week().week(),
            start_date,
            end_date,
            total_hours: 0,
            status: Status::Missing,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// A single task booked on one day of a week.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEntry {
    pub id: EntryId,
    #[serde(rename = "timesheetId")]
    pub week_id: WeekId,
    pub date: NaiveDate,
    pub project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    pub description: String,
    pub hours: u32,
}

/// The client-supplied part of a new entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub project: String,
    pub work_type: Option<String>,
    pub description: String,
    pub hours: u32,
}

impl EntryDraft {
    pub fn into_entry(self, id: EntryId, week_id: WeekId) -> TaskEntry {
        TaskEntry {
            id,
            week_id,
            date: self.date,
            project: self.project,
            work_type: self.work_type,
            description: self.description,
            hours: self.hours,
        }
    }
}

/// Partial update of an entry; `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub date: Option<NaiveDate>,
    pub project: Option<String>,
    pub work_type: Option<String>,
    pub description: Option<String>,
    pub hours: Option<u32>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        *self == EntryPatch::default()
    }

    /// Merges the patch over `entry`. Id and week never change.
    pub fn apply(&self, entry: &TaskEntry) -> TaskEntry {
        TaskEntry {
            id: entry.id.clone(),
            week_id: entry.week_id.clone(),
            date: self.date.unwrap_or(entry.date),
            project: self.project.clone().unwrap_or_else(|| entry.project.clone()),
            work_type: self.work_type.clone().or_else(|| entry.work_type.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| entry.description.clone()),
            hours: self.hours.unwrap_or(entry.hours),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
}
