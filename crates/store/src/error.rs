//! Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Lookups that find nothing are not errors: they return `None` or an empty
//! list and leave it to the caller to decide whether absence matters.

use derive_more::{Display, Error};
use exn::ResultExt;

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The database could not be reached or was busy.
    #[display("database error")]
    Database,
    /// A write broke a unique, foreign key or not-null rule of the schema.
    #[display("constraint violation")]
    Constraint,
    #[display("database migration error")]
    Migration,
    /// A stored value could not be converted into its model type.
    #[display("invalid stored data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database)
    }
}

fn classify(err: &sqlx::Error) -> ErrorKind {
    use sqlx::error::ErrorKind as SqlxKind;
    match err.as_database_error().map(|db| db.kind()) {
        Some(
            SqlxKind::UniqueViolation
            | SqlxKind::ForeignKeyViolation
            | SqlxKind::NotNullViolation
            | SqlxKind::CheckViolation,
        ) => ErrorKind::Constraint,
        _ => ErrorKind::Database,
    }
}

/// Raise a `sqlx` failure as [`ErrorKind::Constraint`] or [`ErrorKind::Database`].
pub(crate) trait SqlxResultExt<T> {
    fn or_raise_sqlx(self) -> Result<T>;
}
impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    #[track_caller]
    fn or_raise_sqlx(self) -> Result<T> {
        let kind = self.as_ref().err().map_or(ErrorKind::Database, classify);
        self.or_raise(|| kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Database.to_string(), "database error");
        assert_eq!(ErrorKind::InvalidData("loan date").to_string(), "invalid stored data: loan date");
    }

    #[test]
    fn only_connection_errors_are_retryable() {
        assert!(ErrorKind::Database.is_retryable());
        assert!(!ErrorKind::Constraint.is_retryable());
        assert!(!ErrorKind::Migration.is_retryable());
        assert!(!ErrorKind::InvalidData("title").is_retryable());
    }
}
