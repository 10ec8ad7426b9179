//! SQLite entity store for the library catalog.
//!
//! This crate owns every record the catalog knows about and the rules that
//! keep them consistent. Other crates only ever hold ids or short-lived
//! copies handed out by the [`Repository`].
//!
//! # Architecture
//! Five tables, all with integer primary keys:
//! - **Authors** and **Genres**: looked up by name and created on first
//!   reference ("find-or-create"), never deleted.
//! - **Books**: unique by title, each pointing at one author and one genre.
//! - **Users**: unique by name.
//! - **Loans**: one row per active borrow of a book by a user. Returning the
//!   book deletes the row.
//!
//! The generic [`Record`], [`Named`] and [`Draft`] traits describe each table
//! so that the repository can offer one `get_by_id`, `find_or_create`,
//! `insert`, `update`, `delete` and `list_all` for every kind of record.

mod db;
pub mod error;
pub mod models;
mod ops;
mod repo;

pub use crate::db::{DEFAULT_BUSY_TIMEOUT, Database};
pub use crate::models::{Draft, EntityKind, Named, Record};
pub use crate::repo::{Repository, Transaction};
