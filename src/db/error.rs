use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::db::portable_id::IdFormatError;
use crate::models::password::InvalidCredential;

/// Errors surfaced by user storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Malformed identifier: {0}")]
    Format(#[from] IdFormatError),

    #[error(transparent)]
    InvalidCredential(#[from] InvalidCredential),

    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("Required field '{0}' is missing")]
    MissingField(&'static str),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    /// Maps a unique-constraint failure on `username` reported by the engine
    /// to [`StoreError::UsernameTaken`].
    pub(crate) fn from_write(err: DbErr, username: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("username") => {
                Self::UsernameTaken(username.to_string())
            }
            _ => Self::Database(err),
        }
    }
}
