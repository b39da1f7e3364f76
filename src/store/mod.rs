/// Persistence collaborators used by the service. The SQLite store lives in
/// `db`; `MemoryStore` backs tests and throwaway sessions.
mod memory;

use anyhow::Result;

use crate::types::{TaskEntry, User, WeekRecord};

pub use memory::MemoryStore;

/// A week together with its full entry list, in booking order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeekSnapshot {
    pub week: WeekRecord,
    pub entries: Vec<TaskEntry>,
}

pub trait EntryStore {
    /// Entries of a week, in booking order.
    fn load_entries(&self, week_id: &str) -> Result<Vec<TaskEntry>>;
    fn find_entry(&self, entry_id: &str) -> Result<Option<TaskEntry>>;
    /// Replaces every entry of `week_id` with `entries`.
    fn save_entries(&self, week_id: &str, entries: &[TaskEntry]) -> Result<()>;
}

pub trait WeekStore {
    fn load_week(&self, week_id: &str) -> Result<Option<WeekRecord>>;
    fn load_weeks(&self) -> Result<Vec<WeekRecord>>;
    fn save_week(&self, week: &WeekRecord) -> Result<()>;
    /// Inserts a new week unless one with the same start date exists.
    /// Returns `false` when nothing was inserted.
    fn insert_week(&self, week: &WeekRecord) -> Result<bool>;
}

pub trait UserStore {
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn save_user(&self, user: &User) -> Result<()>;
}

pub trait TimesheetStore: EntryStore + WeekStore + UserStore {
    /// Read-modify-write of one week, exclusive against every other writer
    /// of the same backing store (threads and processes alike).
    ///
    /// `update` gets the current snapshot (`None` for an unknown week) and
    /// returns the snapshot to persist, if any, plus a value for the caller.
    /// Nothing is written when `update` fails. `update` must not call back
    /// into the store.
    fn update_week<T, E>(
        &self,
        week_id: &str,
        update: impl FnOnce(Option<WeekSnapshot>) -> Result<(Option<WeekSnapshot>, T), E>,
    ) -> Result<T, E>
    where
        E: From<anyhow::Error>;

    /// Writes all snapshots and users, or none of them.
    fn save_batch(&self, snapshots: &[WeekSnapshot], users: &[User]) -> Result<()>;
}
