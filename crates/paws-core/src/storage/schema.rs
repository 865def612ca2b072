//! Table creation and additive column migration for the credential database
//!
//! There is no schema version record. On every open the base table is
//! created if missing, then each optional column is probed through
//! `PRAGMA table_info` and added when absent. Columns are never dropped or
//! renamed, so a database written by an older build opens unchanged.

use std::collections::HashSet;

use rusqlite::{Connection, Transaction};
use tracing::{debug, info};

use crate::error::Result;

/// Name of the credential table
pub const TABLE: &str = "passwords";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS passwords (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    service TEXT NOT NULL,
    username TEXT,
    password_enc TEXT NOT NULL,
    notes TEXT
)";

/// A column added after the base table shipped
#[derive(Debug, Clone, Copy)]
pub struct OptionalColumn {
    pub name: &'static str,
    pub definition: &'static str,
}

/// Optional columns, applied in this order.
///
/// SQLite refuses non-constant defaults in `ADD COLUMN`, so pre-existing rows
/// get an empty string, which reads back as "no timestamp".
pub const OPTIONAL_COLUMNS: &[OptionalColumn] = &[
    OptionalColumn {
        name: "created_at",
        definition: "TEXT NOT NULL DEFAULT ''",
    },
    OptionalColumn {
        name: "updated_at",
        definition: "TEXT NOT NULL DEFAULT ''",
    },
];

/// Ensure the credential table exists and carries every optional column.
///
/// Runs in a single transaction. Returns the names of the columns that were
/// added by this call.
pub fn ensure_schema(conn: &mut Connection) -> Result<Vec<&'static str>> {
    let tx = conn.transaction()?;
    tx.execute(CREATE_TABLE, [])?;

    let existing = column_names(&tx)?;
    let mut added = Vec::new();

    for column in OPTIONAL_COLUMNS {
        if existing.contains(column.name) {
            continue;
        }
        add_column(&tx, column)?;
        added.push(column.name);
    }

    tx.commit()?;

    if added.is_empty() {
        debug!("Schema for '{}' is up to date", TABLE);
    }
    Ok(added)
}

/// Names of the columns currently present on the credential table
pub fn column_names(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("PRAGMA table_info(passwords)")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<HashSet<_>>>()?;
    Ok(names)
}

fn add_column(tx: &Transaction<'_>, column: &OptionalColumn) -> Result<()> {
    let sql = format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        TABLE, column.name, column.definition
    );
    tx.execute(&sql, [])?;
    info!("Added missing column '{}' to '{}'", column.name, TABLE);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_TABLE: &str = "CREATE TABLE passwords (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        service TEXT NOT NULL,
        username TEXT,
        password_enc TEXT NOT NULL,
        notes TEXT
    )";

    #[test]
    fn test_fresh_database_gets_all_columns() {
        let mut conn = Connection::open_in_memory().unwrap();

        let added = ensure_schema(&mut conn).unwrap();
        assert_eq!(added, vec!["created_at", "updated_at"]);

        let columns = column_names(&conn).unwrap();
        for name in ["id", "service", "username", "password_enc", "notes", "created_at", "updated_at"] {
            assert!(columns.contains(name), "missing column {name}");
        }
    }

    #[test]
    fn test_second_run_is_noop() {
        let mut conn = Connection::open_in_memory().unwrap();

        ensure_schema(&mut conn).unwrap();
        let added = ensure_schema(&mut conn).unwrap();

        assert!(added.is_empty());
    }

    #[test]
    fn test_legacy_table_keeps_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute(LEGACY_TABLE, []).unwrap();
        conn.execute(
            "INSERT INTO passwords (service, username, password_enc, notes) VALUES ('github', 'alice', 'tok', 'n')",
            [],
        )
        .unwrap();

        ensure_schema(&mut conn).unwrap();

        let (service, updated_at): (String, String) = conn
            .query_row("SELECT service, updated_at FROM passwords WHERE id = 1", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(service, "github");
        assert_eq!(updated_at, "");
    }

    #[test]
    fn test_partially_migrated_table() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute(LEGACY_TABLE, []).unwrap();
        conn.execute("ALTER TABLE passwords ADD COLUMN created_at TEXT", [])
            .unwrap();

        let added = ensure_schema(&mut conn).unwrap();
        assert_eq!(added, vec!["updated_at"]);
    }
}
