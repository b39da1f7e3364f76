use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow};

use crate::types::{TaskEntry, User, WeekId, WeekRecord};

use super::{EntryStore, TimesheetStore, UserStore, WeekSnapshot, WeekStore};

/// Lock order is weeks, entries, users.
#[derive(Default)]
pub struct MemoryStore {
    weeks: Mutex<BTreeMap<WeekId, WeekRecord>>,
    entries: Mutex<BTreeMap<WeekId, Vec<TaskEntry>>>,
    users: Mutex<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| anyhow!("memory store lock poisoned"))
}

fn upsert_user(users: &mut Vec<User>, user: &User) {
    match users.iter_mut().find(|u| u.id == user.id) {
        Some(existing) => *existing = user.clone(),
        None => users.push(user.clone()),
    }
}

impl EntryStore for MemoryStore {
    fn load_entries(&self, week_id: &str) -> Result<Vec<TaskEntry>> {
        Ok(lock(&self.entries)?.get(week_id).cloned().unwrap_or_default())
    }

    fn find_entry(&self, entry_id: &str) -> Result<Option<TaskEntry>> {
        Ok(lock(&self.entries)?
            .values()
            .flatten()
            .find(|e| e.id == entry_id)
            .cloned())
    }

    fn save_entries(&self, week_id: &str, entries: &[TaskEntry]) -> Result<()> {
        lock(&self.entries)?.insert(week_id.to_string(), entries.to_vec());
        Ok(())
    }
}

impl WeekStore for MemoryStore {
    fn load_week(&self, week_id: &str) -> Result<Option<WeekRecord>> {
        Ok(lock(&self.weeks)?.get(week_id).cloned())
    }

    fn load_weeks(&self) -> Result<Vec<WeekRecord>> {
        let mut weeks: Vec<WeekRecord> = lock(&self.weeks)?.values().cloned().collect();
        weeks.sort_by_key(|w| w.start_date);
        Ok(weeks)
    }

    fn save_week(&self, week: &WeekRecord) -> Result<()> {
        lock(&self.weeks)?.insert(week.id.clone(), week.clone());
        Ok(())
    }

    fn insert_week(&self, week: &WeekRecord) -> Result<bool> {
        let mut weeks = lock(&self.weeks)?;
        if weeks.values().any(|w| w.start_date == week.start_date) {
            return Ok(false);
        }
        weeks.insert(week.id.clone(), week.clone());
        Ok(true)
    }
}

impl UserStore for MemoryStore {
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(lock(&self.users)?.iter().find(|u| u.email == email).cloned())
    }

    fn save_user(&self, user: &User) -> Result<()> {
        upsert_user(&mut *lock(&self.users)?, user);
        Ok(())
    }
}

impl TimesheetStore for MemoryStore {
    fn update_week<T, E>(
        &self,
        week_id: &str,
        update: impl FnOnce(Option<WeekSnapshot>) -> Result<(Option<WeekSnapshot>, T), E>,
    ) -> Result<T, E>
    where
        E: From<anyhow::Error>,
    {
        let mut weeks = lock(&self.weeks)?;
        let mut entries = lock(&self.entries)?;
        let current = weeks.get(week_id).map(|week| WeekSnapshot {
            week: week.clone(),
            entries: entries.get(week_id).cloned().unwrap_or_default(),
        });
        let (next, value) = update(current)?;
        if let Some(snapshot) = next {
            entries.insert(snapshot.week.id.clone(), snapshot.entries);
            weeks.insert(snapshot.week.id.clone(), snapshot.week);
        }
        Ok(value)
    }

    fn save_batch(&self, snapshots: &[WeekSnapshot], users: &[User]) -> Result<()> {
        let mut weeks = lock(&self.weeks)?;
        let mut entries = lock(&self.entries)?;
        let mut stored_users = lock(&self.users)?;
        for snapshot in snapshots {
            weeks.insert(snapshot.week.id.clone(), snapshot.week.clone());
            entries.insert(snapshot.week.id.clone(), snapshot.entries.clone());
        }
        for user in users {
            upsert_user(&mut stored_users, user);
        }
        Ok(())
    }
}
