//! Login session operations

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use fragments_types::User;
use rusqlite::types::Type;
use rusqlite::OptionalExtension;

use super::Db;
use crate::error::StoreResult;

/// A server-side login session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl Db {
    pub fn create_session(&self, user: &User, ttl: Duration) -> StoreResult<Session> {
        let conn = self.conn();
        let token = Self::generate_session_token();
        let created_at = Utc::now();
        let expires_at = created_at + ttl;

        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                &token,
                user.id,
                timestamp(created_at),
                timestamp(expires_at),
            ],
        )?;

        Ok(Session {
            token,
            user_id: user.id,
            username: user.username.clone(),
            expires_at,
        })
    }

    fn generate_session_token() -> String {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        (0..32)
            .map(|_| format!("{:x}", rng.r#gen::<u8>() % 16))
            .collect()
    }

    /// Look up a live session. A hit pushes its expiry `ttl` into the future.
    pub fn validate_session(&self, token: &str, ttl: Duration) -> StoreResult<Option<Session>> {
        let conn = self.conn();
        let now = Utc::now();

        let session = conn
            .query_row(
                "SELECT s.token, s.user_id, u.username, s.expires_at
                 FROM sessions s JOIN users u ON u.id = s.user_id
                 WHERE s.token = ?1 AND s.expires_at > ?2",
                rusqlite::params![token, timestamp(now)],
                |row| {
                    Ok(Session {
                        token: row.get(0)?,
                        user_id: row.get(1)?,
                        username: row.get(2)?,
                        expires_at: timestamp_column(row, 3)?,
                    })
                },
            )
            .optional()?;

        let Some(mut session) = session else {
            return Ok(None);
        };

        let new_expires = now + ttl;
        conn.execute(
            "UPDATE sessions SET expires_at = ?1 WHERE token = ?2",
            rusqlite::params![timestamp(new_expires), token],
        )?;
        session.expires_at = new_expires;
        Ok(Some(session))
    }

    pub fn delete_session(&self, token: &str) -> StoreResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
        Ok(rows_affected > 0)
    }

    pub fn purge_expired_sessions(&self) -> StoreResult<usize> {
        let conn = self.conn();
        let removed = conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            [timestamp(Utc::now())],
        )?;
        Ok(removed)
    }
}

// Fixed-width so stored timestamps compare correctly as text.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
