/// SQLite-backed store with week, entry and user queries plus migrations.
mod entry;
mod migrations;
mod user;
mod week;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Result, anyhow};
use rusqlite::{Connection, TransactionBehavior};
use tracing::debug;

use crate::store::{EntryStore, TimesheetStore, UserStore, WeekSnapshot, WeekStore};
use crate::types::{TaskEntry, User, WeekRecord};

pub use entry::{query_entries_by_week_id, query_entry_by_id, replace_week_entries};
pub use user::{query_user_by_email, upsert_user};
pub use week::{insert_week, query_week_by_id, query_weeks, upsert_week};

/// How long a writer waits for another connection's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A single SQLite connection shared behind a mutex. Other processes may hold
/// their own connections to the same file; week updates serialize through
/// `BEGIN IMMEDIATE`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Opens (or creates) the SQLite database and runs migrations.
pub fn init(db_path: &Path) -> Result<SqliteStore> {
    debug!(path = %db_path.display(), "opening timesheet database");
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    migrations::run_migrations(&conn)?;
    Ok(SqliteStore::from_connection(conn))
}

/// Returns the default database path inside the user's data directory.
/// Falls back to `./timesheet.db` when no data dir is found.
pub fn default_db_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join("timesheet");
        std::fs::create_dir_all(&app_dir).ok();
        app_dir.join("timesheet.db")
    } else {
        PathBuf::from("timesheet.db")
    }
}

impl SqliteStore {
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }
}

impl EntryStore for SqliteStore {
    fn load_entries(&self, week_id: &str) -> Result<Vec<TaskEntry>> {
        let conn = self.conn()?;
        query_entries_by_week_id(week_id, &conn)
    }

    fn find_entry(&self, entry_id: &str) -> Result<Option<TaskEntry>> {
        let conn = self.conn()?;
        query_entry_by_id(entry_id, &conn)
    }

    fn save_entries(&self, week_id: &str, entries: &[TaskEntry]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        replace_week_entries(week_id, entries, &tx)?;
        tx.commit()?;
        Ok(())
    }
}

impl WeekStore for SqliteStore {
    fn load_week(&self, week_id: &str) -> Result<Option<WeekRecord>> {
        let conn = self.conn()?;
        query_week_by_id(week_id, &conn)
    }

    fn load_weeks(&self) -> Result<Vec<WeekRecord>> {
        let conn = self.conn()?;
        query_weeks(&conn)
    }

    fn save_week(&self, week: &WeekRecord) -> Result<()> {
        let conn = self.conn()?;
        upsert_week(week, &conn)
    }

    fn insert_week(&self, week: &WeekRecord) -> Result<bool> {
        let conn = self.conn()?;
        insert_week(week, &conn)
    }
}

impl UserStore for SqliteStore {
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        query_user_by_email(email, &conn)
    }

    fn save_user(&self, user: &User) -> Result<()> {
        let conn = self.conn()?;
        upsert_user(user, &conn)
    }
}

impl TimesheetStore for SqliteStore {
    fn update_week<T, E>(
        &self,
        week_id: &str,
        update: impl FnOnce(Option<WeekSnapshot>) -> Result<(Option<WeekSnapshot>, T), E>,
    ) -> Result<T, E>
    where
        E: From<anyhow::Error>,
    {
        let mut conn = self.conn()?;
        // Takes the write lock before reading so no other connection can
        // commit between our read and our write.
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(anyhow::Error::from)?;
        let current = match query_week_by_id(week_id, &tx)? {
            Some(week) => Some(WeekSnapshot {
                entries: query_entries_by_week_id(week_id, &tx)?,
                week,
            }),
            None => None,
        };
        // Returning early drops `tx`, which rolls back.
        let (next, value) = update(current)?;
        if let Some(snapshot) = next {
            upsert_week(&snapshot.week, &tx)?;
            replace_week_entries(&snapshot.week.id, &snapshot.entries, &tx)?;
            tx.commit().map_err(anyhow::Error::from)?;
        }
        Ok(value)
    }

    fn save_batch(&self, snapshots: &[WeekSnapshot], users: &[User]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for snapshot in snapshots {
            upsert_week(&snapshot.week, &tx)?;
            replace_week_entries(&snapshot.week.id, &snapshot.entries, &tx)?;
        }
        for user in users {
            upsert_user(user, &tx)?;
        }
        tx.commit()?;
        Ok(())
    }
}
