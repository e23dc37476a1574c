//! Snapshot database schema
//!
//! The snapshot store is a SQLite copy of the journalist collection.
//! Only the columns the record file needs are read.

use rusqlite::{params, Connection};

/// Table holding journalist profiles
pub const JOURNALIST_TABLE: &str = "journalists";

/// SQL to create the journalists table
const CREATE_JOURNALISTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS journalists (
    id TEXT PRIMARY KEY,          -- opaque document id
    name TEXT NOT NULL,
    twitter TEXT,                 -- handle, rows without one are not exported
    bio TEXT
)
"#;

/// Rows to export, in insertion order
pub(crate) const SELECT_JOURNALISTS: &str =
    "SELECT name, id, twitter, bio FROM journalists ORDER BY rowid";

/// Create the snapshot schema
pub fn create_snapshot(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(CREATE_JOURNALISTS_TABLE, [])?;
    Ok(())
}

/// Insert one journalist row
pub fn insert_journalist(
    conn: &Connection,
    id: &str,
    name: &str,
    twitter: Option<&str>,
    bio: Option<&str>,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO journalists (id, name, twitter, bio) VALUES (?1, ?2, ?3, ?4)",
        params![id, name, twitter, bio],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_snapshot() {
        let conn = Connection::open_in_memory().unwrap();
        create_snapshot(&conn).unwrap();
        // Idempotent
        create_snapshot(&conn).unwrap();

        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [JOURNALIST_TABLE],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_insert_journalist() {
        let conn = Connection::open_in_memory().unwrap();
        create_snapshot(&conn).unwrap();
        insert_journalist(&conn, "a1", "Ada", Some("ada"), None).unwrap();
        insert_journalist(&conn, "a1", "Ada L.", Some("ada"), None).unwrap();

        let name: String = conn
            .query_row("SELECT name FROM journalists WHERE id = 'a1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(name, "Ada L.");
    }
}
