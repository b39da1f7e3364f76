/// Task entry queries.
use anyhow::Result;
use rusqlite::{Connection, Row};

use crate::types::TaskEntry;

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<TaskEntry> {
    Ok(TaskEntry {
        id: row.get(0)?,
        week_id: row.get(1)?,
        date: row.get(2)?,
        project: row.get(3)?,
        work_type: row.get(4)?,
        description: row.get(5)?,
        hours: row.get(6)?,
    })
}

pub fn query_entries_by_week_id(week_id: &str, conn: &Connection) -> Result<Vec<TaskEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, week_id, date, project, work_type, description, hours
         FROM entries WHERE week_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map([week_id], entry_from_row)?;
    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

pub fn query_entry_by_id(id: &str, conn: &Connection) -> Result<Option<TaskEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, week_id, date, project, work_type, description, hours
         FROM entries WHERE id = ?1",
    )?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(entry_from_row(row)?))
    } else {
        Ok(None)
    }
}

/// Rewrites the whole entry list of a week. Run inside a transaction.
pub fn replace_week_entries(week_id: &str, entries: &[TaskEntry], conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM entries WHERE week_id = ?1", [week_id])?;
    let mut stmt = conn.prepare(
        "INSERT INTO entries (id, week_id, position, date, project, work_type, description, hours)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for (position, entry) in entries.iter().enumerate() {
        stmt.execute(rusqlite::params![
            entry.id,
            week_id,
            position as i64,
            entry.date,
            entry.project,
            entry.work_type,
            entry.description,
            entry.hours,
        ])?;
    }
    Ok(())
}
