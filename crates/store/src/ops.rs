//! Connection-level operations.
//!
//! Everything here takes a bare `&mut SqliteConnection` so the same code runs
//! against a pooled connection ([`Repository`](crate::Repository)) or inside
//! an open [`Transaction`](crate::Transaction).
//!
//! Table and column names come from the [`Record`] constants, never from
//! caller input; all caller-supplied values are bound parameters.

use crate::error::{ErrorKind, Result, SqlxResultExt};
use crate::models::{Book, BookDetails, BookJoinRow, Draft, Loan, LoanDetails, LoanJoinRow, Named, NewNamed, Record, UserId, Value};
use exn::ResultExt;
use sqlx::SqliteConnection;

fn select<E: Record>(clause: &str) -> String {
    format!("SELECT id, {} FROM {} {clause} ORDER BY id", E::COLUMNS.join(", "), E::TABLE)
}

pub(crate) async fn get_by_id<E: Record>(conn: &mut SqliteConnection, id: E::Id) -> Result<Option<E>> {
    let id: i64 = id.into();
    let sql = select::<E>("WHERE id = ?");
    let row: Option<E::Row> =
        sqlx::query_as(&sql).bind(id).fetch_optional(&mut *conn).await.or_raise_sqlx()?;
    row.map(E::from_row).transpose()
}

pub(crate) async fn find_by_name<E: Named>(conn: &mut SqliteConnection, name: &str) -> Result<Option<E>> {
    let sql = select::<E>("WHERE name = ?");
    let row: Option<E::Row> =
        sqlx::query_as(&sql).bind(name).fetch_optional(&mut *conn).await.or_raise_sqlx()?;
    row.map(E::from_row).transpose()
}

pub(crate) async fn get_by_title(conn: &mut SqliteConnection, title: &str) -> Result<Option<Book>> {
    let sql = select::<Book>("WHERE title = ?");
    let row: Option<<Book as Record>::Row> =
        sqlx::query_as(&sql).bind(title).fetch_optional(&mut *conn).await.or_raise_sqlx()?;
    row.map(Book::from_row).transpose()
}

pub(crate) async fn list_all<E: Record>(conn: &mut SqliteConnection) -> Result<Vec<E>> {
    let sql = select::<E>("");
    let rows: Vec<E::Row> = sqlx::query_as(&sql).fetch_all(&mut *conn).await.or_raise_sqlx()?;
    rows.into_iter().map(E::from_row).collect()
}

pub(crate) async fn insert<D: Draft>(conn: &mut SqliteConnection, draft: &D) -> Result<D::Record> {
    let columns = <D::Record as Record>::COLUMNS;
    let sql = format!(
        "INSERT INTO {} ({columns}) VALUES ({placeholders}) RETURNING id, {columns}",
        <D::Record as Record>::TABLE,
        columns = columns.join(", "),
        placeholders = vec!["?"; columns.len()].join(", "),
    );
    let mut query = sqlx::query_as::<_, <D::Record as Record>::Row>(&sql);
    for value in draft.values() {
        query = match value {
            Value::Integer(v) => query.bind(v),
            Value::Text(v) => query.bind(v),
        };
    }
    let row = query.fetch_one(&mut *conn).await.or_raise_sqlx()?;
    let record = <D::Record as Record>::from_row(row)?;
    let kind = <D::Record as Record>::KIND;
    tracing::debug!(%kind, id = %record.id(), "inserted record");
    Ok(record)
}

/// Overwrite every column of an existing record. Returns `false` if no row has the record's id.
pub(crate) async fn update<E: Record>(conn: &mut SqliteConnection, record: &E) -> Result<bool> {
    let assignments = E::COLUMNS.iter().map(|column| format!("{column} = ?")).collect::<Vec<_>>().join(", ");
    let sql = format!("UPDATE {} SET {assignments} WHERE id = ?", E::TABLE);
    let mut query = sqlx::query(&sql);
    for value in record.values() {
        query = match value {
            Value::Integer(v) => query.bind(v),
            Value::Text(v) => query.bind(v),
        };
    }
    let id: i64 = record.id().into();
    let result = query.bind(id).execute(&mut *conn).await.or_raise_sqlx()?;
    let kind = E::KIND;
    tracing::debug!(%kind, id, "updated record");
    Ok(result.rows_affected() > 0)
}

/// Delete a record by id. Returns `false` if it was already gone.
pub(crate) async fn delete<E: Record>(conn: &mut SqliteConnection, record: &E) -> Result<bool> {
    let id: i64 = record.id().into();
    let sql = format!("DELETE FROM {} WHERE id = ?", E::TABLE);
    let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await.or_raise_sqlx()?;
    let kind = E::KIND;
    tracing::debug!(%kind, id, "deleted record");
    Ok(result.rows_affected() > 0)
}

/// Returns the record called `name`, inserting it first if there is none.
///
/// Names carry a unique index, so a second call with the same name can never
/// produce a duplicate row.
pub(crate) async fn find_or_create<E: Named>(conn: &mut SqliteConnection, name: &str) -> Result<E> {
    if let Some(existing) = find_by_name::<E>(conn, name).await? {
        return Ok(existing);
    }
    let created = insert(conn, &NewNamed::<E>::new(name)).await?;
    let kind = E::KIND;
    tracing::info!(%kind, id = %created.id(), name, "created record on first reference");
    Ok(created)
}

// =========================================================================
// Joins
// =========================================================================

pub(crate) async fn list_book_details(conn: &mut SqliteConnection) -> Result<Vec<BookDetails>> {
    let rows: Vec<BookJoinRow> = sqlx::query_as(include_str!("../queries/list_book_details.sql"))
        .fetch_all(&mut *conn)
        .await
        .or_raise_sqlx()?;
    Ok(rows.into_iter().map(BookDetails::from).collect())
}

pub(crate) async fn books_by_author(conn: &mut SqliteConnection, author_name: &str) -> Result<Vec<Book>> {
    let rows: Vec<<Book as Record>::Row> = sqlx::query_as(include_str!("../queries/books_by_author.sql"))
        .bind(author_name)
        .fetch_all(&mut *conn)
        .await
        .or_raise_sqlx()?;
    rows.into_iter().map(Book::from_row).collect()
}

pub(crate) async fn count_books_by_author(conn: &mut SqliteConnection, author_name: &str) -> Result<u64> {
    let count: i64 = sqlx::query_scalar(include_str!("../queries/count_books_by_author.sql"))
        .bind(author_name)
        .fetch_one(&mut *conn)
        .await
        .or_raise_sqlx()?;
    u64::try_from(count).or_raise(|| ErrorKind::InvalidData("book count"))
}

pub(crate) async fn list_loan_details(conn: &mut SqliteConnection) -> Result<Vec<LoanDetails>> {
    let rows: Vec<LoanJoinRow> = sqlx::query_as(include_str!("../queries/list_loan_details.sql"))
        .fetch_all(&mut *conn)
        .await
        .or_raise_sqlx()?;
    rows.into_iter().map(LoanDetails::try_from).collect()
}

pub(crate) async fn loan_details_for_user(conn: &mut SqliteConnection, user_id: UserId) -> Result<Vec<LoanDetails>> {
    let rows: Vec<LoanJoinRow> = sqlx::query_as(include_str!("../queries/loan_details_for_user.sql"))
        .bind(i64::from(user_id))
        .fetch_all(&mut *conn)
        .await
        .or_raise_sqlx()?;
    rows.into_iter().map(LoanDetails::try_from).collect()
}

pub(crate) async fn find_loan(conn: &mut SqliteConnection, user_id: UserId, book: &Book) -> Result<Option<Loan>> {
    let row: Option<<Loan as Record>::Row> = sqlx::query_as(include_str!("../queries/find_loan.sql"))
        .bind(i64::from(user_id))
        .bind(i64::from(book.id))
        .fetch_optional(&mut *conn)
        .await
        .or_raise_sqlx()?;
    row.map(Loan::from_row).transpose()
}
