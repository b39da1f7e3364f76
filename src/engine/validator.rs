use crate::error::Reject;
use crate::types::{PROJECTS, TaskEntry, WORK_TYPES};

use super::{ALLOWED_HOURS, DAILY_CAP};

/// Admission check for a new or edited entry.
///
/// `existing` are the entries already booked on the candidate's date; any
/// entry on another date is ignored. `exclude_id` names the entry being
/// edited so it is not counted twice.
pub fn validate(
    existing: &[TaskEntry],
    candidate: &TaskEntry,
    exclude_id: Option<&str>,
) -> Result<(), Reject> {
    check_fields(candidate)?;

    let booked = existing
        .iter()
        .filter(|e| e.date == candidate.date)
        .filter(|e| exclude_id != Some(e.id.as_str()))
        .fold(0u32, |sum, e| sum.saturating_add(e.hours));
    let projected = booked.saturating_add(candidate.hours);
    if projected > DAILY_CAP {
        return Err(Reject::DailyCapExceeded {
            date: candidate.date,
            booked,
            projected,
            cap: DAILY_CAP,
        });
    }
    Ok(())
}

pub fn check_fields(candidate: &TaskEntry) -> Result<(), Reject> {
    if candidate.project.trim().is_empty() {
        return Err(Reject::invalid("project", "a project is required"));
    }
    if !PROJECTS.contains(&candidate.project.as_str()) {
        return Err(Reject::invalid(
            "project",
            format!("unknown project '{}'", candidate.project),
        ));
    }
    if let Some(work_type) = &candidate.work_type {
        if !WORK_TYPES.contains(&work_type.as_str()) {
            return Err(Reject::invalid(
                "work type",
                format!("unknown work type '{work_type}'"),
            ));
        }
    }
    if candidate.description.trim().is_empty() {
        return Err(Reject::invalid("description", "a description is required"));
    }
    if !ALLOWED_HOURS.contains(&candidate.hours) {
        return Err(Reject::invalid(
            "hours",
            format!("{} is not one of {:?}", candidate.hours, ALLOWED_HOURS),
        ));
    }
    Ok(())
}
