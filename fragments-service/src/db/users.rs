//! User table operations

use chrono::Local;
use fragments_types::{NewUser, User};
use rusqlite::OptionalExtension;

use super::{date_column, format_date, Db};
use crate::error::{StoreError, StoreResult};

impl Db {
    /// Insert a user dated today. A taken username is a `Conflict("username")`.
    pub fn create_user(&self, new_user: &NewUser) -> StoreResult<User> {
        let conn = self.conn();
        let register_date = Local::now().date_naive();

        conn.execute(
            "INSERT INTO users (name, email, username, password, register_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                &new_user.name,
                &new_user.email,
                &new_user.username,
                &new_user.password_hash,
                format_date(register_date),
            ],
        )
        .map_err(StoreError::unique("username"))?;

        Ok(User {
            id: conn.last_insert_rowid(),
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            username: new_user.username.clone(),
            password: new_user.password_hash.clone(),
            register_date,
        })
    }

    pub fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                "SELECT id, name, email, username, password, register_date
                 FROM users WHERE username = ?1",
                [username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn count_users(&self) -> StoreResult<i64> {
        let conn = self.conn();
        Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?)
    }
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        username: row.get(3)?,
        password: row.get(4)?,
        register_date: date_column(row, 5)?,
    })
}
