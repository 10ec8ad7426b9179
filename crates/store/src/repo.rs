//! Repository over every catalog record.
//!
//! The same operations exist twice: on [`Repository`], where each call is its
//! own atomic unit against the pool, and on [`Transaction`], where several
//! calls are grouped and only become visible on [`Transaction::commit`].

use crate::Database;
use crate::error::{Result, SqlxResultExt};
use crate::models::{Book, BookDetails, Draft, Loan, LoanDetails, Named, Record, UserId};
use crate::ops;
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool};
use tracing::instrument;

/// Repository for managing authors, genres, books, users and loans.
///
/// # Relationships
///
/// - A book references exactly one author and one genre (by id)
/// - Authors and genres are created on first reference and never deleted
/// - A loan references one user and one book
/// - Deleting a book or a user deletes the loans that reference it
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    async fn acquire(&self) -> Result<PoolConnection<Sqlite>> {
        self.pool.acquire().await.or_raise_sqlx()
    }

    /// Start a unit of work. Nothing written through it is visible to other
    /// connections until it is committed, and dropping it rolls back.
    pub async fn begin(&self) -> Result<Transaction> {
        let tx = self.pool.begin().await.or_raise_sqlx()?;
        Ok(Transaction { tx })
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    pub async fn get_by_id<E: Record>(&self, id: E::Id) -> Result<Option<E>> {
        ops::get_by_id(&mut *self.acquire().await?, id).await
    }

    /// Exact, case-sensitive lookup of an author, genre or user by name.
    pub async fn find_by_name<E: Named>(&self, name: &str) -> Result<Option<E>> {
        ops::find_by_name(&mut *self.acquire().await?, name).await
    }

    pub async fn get_by_title(&self, title: &str) -> Result<Option<Book>> {
        ops::get_by_title(&mut *self.acquire().await?, title).await
    }

    /// The first active loan of `book` by `user_id`, oldest first.
    pub async fn find_loan(&self, user_id: UserId, book: &Book) -> Result<Option<Loan>> {
        ops::find_loan(&mut *self.acquire().await?, user_id, book).await
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// Every record of one kind, in insertion order.
    pub async fn list_all<E: Record>(&self) -> Result<Vec<E>> {
        ops::list_all(&mut *self.acquire().await?).await
    }

    /// Every book with its author and genre, in insertion order.
    pub async fn list_book_details(&self) -> Result<Vec<BookDetails>> {
        ops::list_book_details(&mut *self.acquire().await?).await
    }

    /// Books written by the author with exactly this name.
    pub async fn books_by_author(&self, author_name: &str) -> Result<Vec<Book>> {
        ops::books_by_author(&mut *self.acquire().await?, author_name).await
    }

    pub async fn count_books_by_author(&self, author_name: &str) -> Result<u64> {
        ops::count_books_by_author(&mut *self.acquire().await?, author_name).await
    }

    /// Every active loan with its user and book, oldest first.
    pub async fn list_loan_details(&self) -> Result<Vec<LoanDetails>> {
        ops::list_loan_details(&mut *self.acquire().await?).await
    }

    pub async fn loan_details_for_user(&self, user_id: UserId) -> Result<Vec<LoanDetails>> {
        ops::loan_details_for_user(&mut *self.acquire().await?, user_id).await
    }

    // =========================================================================
    // Writes (each one its own transaction)
    // =========================================================================

    #[instrument(skip(self), fields(kind = %E::KIND))]
    pub async fn find_or_create<E: Named>(&self, name: &str) -> Result<E> {
        let mut tx = self.begin().await?;
        let record = tx.find_or_create(name).await?;
        tx.commit().await?;
        Ok(record)
    }

    pub async fn insert<D: Draft>(&self, draft: &D) -> Result<D::Record> {
        let mut tx = self.begin().await?;
        let record = tx.insert(draft).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// Returns `true` if a record was updated, `false` if its id was not found.
    pub async fn update<E: Record>(&self, record: &E) -> Result<bool> {
        let mut tx = self.begin().await?;
        let updated = tx.update(record).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Returns `true` if a record was deleted, `false` if its id was not found.
    pub async fn delete<E: Record>(&self, record: &E) -> Result<bool> {
        let mut tx = self.begin().await?;
        let deleted = tx.delete(record).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}

/// A unit of work over the catalog.
///
/// Reads through a transaction see its own uncommitted writes.
pub struct Transaction {
    tx: sqlx::Transaction<'static, Sqlite>,
}
impl Transaction {
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await.or_raise_sqlx()
    }

    pub async fn find_by_name<E: Named>(&mut self, name: &str) -> Result<Option<E>> {
        ops::find_by_name(&mut self.tx, name).await
    }

    pub async fn get_by_title(&mut self, title: &str) -> Result<Option<Book>> {
        ops::get_by_title(&mut self.tx, title).await
    }

    pub async fn find_loan(&mut self, user_id: UserId, book: &Book) -> Result<Option<Loan>> {
        ops::find_loan(&mut self.tx, user_id, book).await
    }

    pub async fn find_or_create<E: Named>(&mut self, name: &str) -> Result<E> {
        ops::find_or_create(&mut self.tx, name).await
    }

    pub async fn insert<D: Draft>(&mut self, draft: &D) -> Result<D::Record> {
        ops::insert(&mut self.tx, draft).await
    }

    pub async fn update<E: Record>(&mut self, record: &E) -> Result<bool> {
        ops::update(&mut self.tx, record).await
    }

    pub async fn delete<E: Record>(&mut self, record: &E) -> Result<bool> {
        ops::delete(&mut self.tx, record).await
    }
}
