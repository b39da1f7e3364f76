/// Week record queries.
use anyhow::Result;
use rusqlite::{Connection, Row, types::Type};

use crate::types::{Status, WeekRecord};

fn week_from_row(row: &Row<'_>) -> rusqlite::Result<WeekRecord> {
    let status: String = row.get(5)?;
    Ok(WeekRecord {
        id: row.get(0)?,
        week: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        total_hours: row.get(4)?,
        status: status.parse::<Status>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, Type::Text, e.into())
        })?,
    })
}

pub fn query_week_by_id(id: &str, conn: &Connection) -> Result<Option<WeekRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, week, start_date, end_date, total_hours, status FROM weeks WHERE id = ?1",
    )?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(week_from_row(row)?))
    } else {
        Ok(None)
    }
}

pub fn query_weeks(conn: &Connection) -> Result<Vec<WeekRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, week, start_date, end_date, total_hours, status FROM weeks ORDER BY start_date",
    )?;
    let rows = stmt.query_map([], week_from_row)?;
    let mut weeks = Vec::new();
    for row in rows {
        weeks.push(row?);
    }
    Ok(weeks)
}

pub fn upsert_week(week: &WeekRecord, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO weeks (id, week, start_date, end_date, total_hours, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            week = excluded.week,
            start_date = excluded.start_date,
            end_date = excluded.end_date,
            total_hours = excluded.total_hours,
            status = excluded.status",
        rusqlite::params![
            week.id,
            week.week,
            week.start_date,
            week.end_date,
            week.total_hours,
            week.status.as_str(),
        ],
    )?;
    Ok(())
}

/// Inserts `week` unless its start date is already taken. Returns whether a
/// row was written.
pub fn insert_week(week: &WeekRecord, conn: &Connection) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT INTO weeks (id, week, start_date, end_date, total_hours, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(start_date) DO NOTHING",
        rusqlite::params![
            week.id,
            week.week,
            week.start_date,
            week.end_date,
            week.total_hours,
            week.status.as_str(),
        ],
    )?;
    Ok(inserted == 1)
}
