//! SQLite store for users, fragments and login sessions.
//!
//! One connection behind a mutex; table operations live in the submodules as
//! `impl Db` blocks.

mod fragments;
mod search;
mod sessions;
mod users;

pub use sessions::Session;

use chrono::NaiveDate;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::StoreResult;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    pub fn open(path: &str) -> StoreResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        register_functions(&conn)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.create_tables()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn create_tables(&self) -> StoreResult<()> {
        let conn = self.conn();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                register_date TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS fragments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                text TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                date TEXT NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                token TEXT NOT NULL UNIQUE,
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_expiry ON sessions(expires_at);",
        )?;
        Ok(())
    }
}

/// `ulower(text)`: Unicode lowercase. SQLite's own `lower()` only folds ASCII.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "ulower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<String>(0)?.to_lowercase()),
    )
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn date_column(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fragments_types::FragmentDraft;

    #[test]
    fn test_ulower_folds_unicode() {
        let db = Db::open(":memory:").unwrap();
        let folded: String = db
            .conn()
            .query_row("SELECT ulower('ÉTÉ à Paris')", [], |r| r.get(0))
            .unwrap();
        assert_eq!(folded, "été à paris");
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fragments.db");
        let path = path.to_str().unwrap();

        {
            let db = Db::open(path).unwrap();
            db.create_fragment(&FragmentDraft {
                title: "kept".to_string(),
                text: "survives a reopen".to_string(),
                tags: "disk".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            })
            .unwrap();
        }

        let db = Db::open(path).unwrap();
        let all = db.list_fragments().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "kept");
        assert_eq!(all[0].tags, vec!["disk"]);
    }
}
