/// Database migrations and schema management.
use anyhow::Result;
use rusqlite::Connection;

/// Creates the schema if it doesn't exist yet.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS weeks (
            id          TEXT    PRIMARY KEY,
            week        INTEGER NOT NULL,
            start_date  TEXT    NOT NULL UNIQUE,
            end_date    TEXT    NOT NULL,
            total_hours INTEGER NOT NULL DEFAULT 0,
            status      TEXT    NOT NULL DEFAULT 'Missing'
        );

        CREATE TABLE IF NOT EXISTS entries (
            id          TEXT    PRIMARY KEY,
            week_id     TEXT    NOT NULL,
            position    INTEGER NOT NULL,
            date        TEXT    NOT NULL,
            project     TEXT    NOT NULL,
            work_type   TEXT,
            description TEXT    NOT NULL,
            hours       INTEGER NOT NULL,
            FOREIGN KEY (week_id) REFERENCES weeks(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS entries_week_id ON entries (week_id, position);

        CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            email         TEXT NOT NULL UNIQUE,
            name          TEXT,
            password_hash TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('weeks', 'entries', 'users')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }
}
