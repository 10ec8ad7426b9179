//! Traits that let the repository operate on any kind of record.
//!
//! Each table has a plain row type (`sqlx::FromRow`) and a model type. The
//! [`Record`] trait ties the two together and describes the table layout, so
//! the generic operations in [`crate::Repository`] never need per-table SQL.

use crate::error::Result;
use crate::models::EntityKind;
use sqlx::sqlite::SqliteRow;
use std::fmt::Display;

/// A column value bound into an `INSERT` or `UPDATE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(String),
}

/// A persisted record with an integer primary key.
pub trait Record: Sized + Send + Unpin {
    /// Typed primary key.
    type Id: Copy + Display + From<i64> + Into<i64> + Send;
    /// Raw row as read from the table.
    type Row: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin;

    const KIND: EntityKind;
    const TABLE: &'static str;
    /// Every column except `id`, in the order produced by [`Record::values`].
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Self::Id;
    fn values(&self) -> Vec<Value>;
    fn from_row(row: Self::Row) -> Result<Self>;
}

/// A record that is looked up by a unique `name` column.
pub trait Named: Record {
    fn name(&self) -> &str;
}

/// A not-yet-persisted record. Inserting it allocates the id.
pub trait Draft: Send {
    type Record: Record;

    /// Values for [`Record::COLUMNS`], in the same order.
    fn values(&self) -> Vec<Value>;
}
