//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use shelfmark_store::EntityKind;

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog and report operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// ### Operational Errors
/// Caused by what was asked for; show them to the user and carry on.
/// - [`ErrorKind::NotFound`]
/// - [`ErrorKind::DuplicateBook`]
/// - [`ErrorKind::LoanNotFound`]
/// - [`ErrorKind::NoLoans`]
/// - [`ErrorKind::InvalidInput`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Store`], wrapping a store error that says whether it is retryable
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A book, user, author or genre referenced by name does not exist.
    #[display("{_0} not found: {_1}")]
    NotFound(#[error(not(source))] EntityKind, #[error(not(source))] String),
    /// Another book already has this title.
    #[display("a book titled {_0:?} is already in the catalog")]
    DuplicateBook(#[error(not(source))] String),
    /// The user has no active loan of the book.
    #[display("{user} has not borrowed {title:?}")]
    LoanNotFound { user: String, title: String },
    /// The user has never borrowed anything, so there is nothing to rank.
    #[display("{_0} has no loans")]
    NoLoans(#[error(not(source))] String),
    /// A required title or name was blank.
    #[display("{_0} must not be blank")]
    InvalidInput(#[error(not(source))] &'static str),
    /// The entity store failed underneath the operation.
    #[display("catalog storage error")]
    Store,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Always `false`: a [`ErrorKind::Store`] failure may be a broken schema
    /// rule as easily as a busy database. The store error beneath it in the
    /// tree has its own `is_retryable`.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
