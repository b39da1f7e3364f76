/// User account queries.
use anyhow::Result;
use rusqlite::Connection;

use crate::types::User;

pub fn query_user_by_email(email: &str, conn: &Connection) -> Result<Option<User>> {
    let mut stmt =
        conn.prepare("SELECT id, email, name, password_hash FROM users WHERE email = ?1")?;
    let mut rows = stmt.query([email])?;
    if let Some(row) = rows.next()? {
        Ok(Some(User {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            password_hash: row.get(3)?,
        }))
    } else {
        Ok(None)
    }
}

pub fn upsert_user(user: &User, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, email, name, password_hash) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            email = excluded.email,
            name = excluded.name,
            password_hash = excluded.password_hash",
        (&user.id, &user.email, &user.name, &user.password_hash),
    )?;
    Ok(())
}
