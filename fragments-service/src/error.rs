use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A UNIQUE constraint rejected the write. Carries the field name.
    #[error("{0} already exists")]
    Conflict(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Map a constraint violation on `field` to [`StoreError::Conflict`].
    pub fn unique(field: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
        move |err| match &err {
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
                StoreError::Conflict(field)
            }
            _ => StoreError::Sqlite(err),
        }
    }
}
