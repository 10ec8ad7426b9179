//! Library catalog operations.
//!
//! [`Catalog`] covers everything that changes what the library holds or who
//! has borrowed what; [`Reports`] answers questions about it. Both sit on a
//! [`shelfmark_store::Repository`] and address books by title and users,
//! authors and genres by name.
//!
//! Authors and genres never need to be created up front: adding or updating
//! a book with a name the catalog has not seen yet creates it. Lending a book
//! to an unknown user registers that user the same way.

mod catalog;
pub mod error;
mod report;
mod tally;

pub use crate::catalog::{BookUpdate, Catalog, Registration};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::report::Reports;
