/// Error types shared by the engine, the service and the stores.
use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{EntryId, WeekId};

/// A business-rule rejection. Rejections are expected outcomes: the
/// mutation that caused one is not applied.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Reject {
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("daily cap exceeded on {date}: {booked} hours booked, {projected} would exceed {cap}")]
    DailyCapExceeded {
        date: NaiveDate,
        booked: u32,
        projected: u32,
        cap: u32,
    },
}

impl Reject {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Reject::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TimesheetError {
    #[error("rejected: {0}")]
    Rejected(#[from] Reject),
    #[error("week {0} not found")]
    WeekNotFound(WeekId),
    #[error("entry {0} not found")]
    EntryNotFound(EntryId),
    #[error("invalid email or password")]
    Unauthorized,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl TimesheetError {
    pub fn rejection(&self) -> Option<&Reject> {
        match self {
            TimesheetError::Rejected(reject) => Some(reject),
            _ => None,
        }
    }
}
