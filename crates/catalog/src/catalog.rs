//! Catalog mutations.
//!
//! Every operation runs inside a single store transaction and only commits
//! once everything it needs has succeeded. An early return drops the
//! transaction, which rolls back anything created along the way (such as an
//! author that was find-or-created before a duplicate title was noticed).

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use shelfmark_store::models::{Author, Book, Genre, Loan, NewBook, NewLoan, NewNamed, User};
use shelfmark_store::{EntityKind, Repository, Transaction};
use tracing::instrument;

/// Optional changes to apply to a book.
///
/// A field that is `None`, empty or only whitespace leaves the book's current
/// value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}
impl BookUpdate {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    fn given(field: &Option<String>) -> Option<&str> {
        field.as_deref().filter(|value| !value.trim().is_empty())
    }
}

/// Outcome of [`Catalog::add_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// A new user record was created.
    Created(User),
    /// A user with that name was already registered; nothing changed.
    Existing(User),
}
impl Registration {
    pub fn user(&self) -> &User {
        match self {
            Self::Created(user) | Self::Existing(user) => user,
        }
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        exn::bail!(ErrorKind::InvalidInput(field));
    }
    Ok(value)
}

/// Books, users and loans: everything that changes the catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    repo: Repository,
}
impl From<&Repository> for Catalog {
    fn from(repo: &Repository) -> Self {
        Self { repo: repo.clone() }
    }
}
impl Catalog {
    async fn begin(&self) -> Result<Transaction> {
        self.repo.begin().await.or_raise(|| ErrorKind::Store)
    }

    async fn book(tx: &mut Transaction, title: &str) -> Result<Book> {
        tx.get_by_title(title)
            .await
            .or_raise(|| ErrorKind::Store)?
            .ok_or_raise(|| ErrorKind::NotFound(EntityKind::Book, title.to_string()))
    }

    /// Add a new book, creating its author and genre if they are not known yet.
    ///
    /// Fails with [`ErrorKind::DuplicateBook`] if a book with the same title
    /// already exists.
    #[instrument(skip(self))]
    pub async fn add_book(&self, title: &str, author_name: &str, genre_name: &str) -> Result<Book> {
        let title = required("title", title)?;
        let author_name = required("author name", author_name)?;
        let genre_name = required("genre name", genre_name)?;
        let mut tx = self.begin().await?;
        if tx.get_by_title(title).await.or_raise(|| ErrorKind::Store)?.is_some() {
            exn::bail!(ErrorKind::DuplicateBook(title.to_string()));
        }
        let author: Author = tx.find_or_create(author_name).await.or_raise(|| ErrorKind::Store)?;
        let genre: Genre = tx.find_or_create(genre_name).await.or_raise(|| ErrorKind::Store)?;
        let book = tx.insert(&NewBook::new(title, &author, &genre)).await.or_raise(|| ErrorKind::Store)?;
        tx.commit().await.or_raise(|| ErrorKind::Store)?;
        tracing::info!(id = %book.id, title, "added book");
        Ok(book)
    }

    /// Change a book's title, author and/or genre in one write.
    #[instrument(skip(self))]
    pub async fn update_book(&self, title: &str, changes: &BookUpdate) -> Result<Book> {
        let mut tx = self.begin().await?;
        let mut book = Self::book(&mut tx, title).await?;
        if let Some(new_title) = BookUpdate::given(&changes.title)
            && new_title != book.title
        {
            if tx.get_by_title(new_title).await.or_raise(|| ErrorKind::Store)?.is_some() {
                exn::bail!(ErrorKind::DuplicateBook(new_title.to_string()));
            }
            book.title = new_title.to_string();
        }
        if let Some(name) = BookUpdate::given(&changes.author) {
            let author: Author = tx.find_or_create(name).await.or_raise(|| ErrorKind::Store)?;
            book.author_id = author.id;
        }
        if let Some(name) = BookUpdate::given(&changes.genre) {
            let genre: Genre = tx.find_or_create(name).await.or_raise(|| ErrorKind::Store)?;
            book.genre_id = genre.id;
        }
        tx.update(&book).await.or_raise(|| ErrorKind::Store)?;
        tx.commit().await.or_raise(|| ErrorKind::Store)?;
        tracing::info!(id = %book.id, title = %book.title, "updated book");
        Ok(book)
    }

    /// Remove a book. Any active loans of it are removed with it.
    #[instrument(skip(self))]
    pub async fn delete_book(&self, title: &str) -> Result<Book> {
        let mut tx = self.begin().await?;
        let book = Self::book(&mut tx, title).await?;
        tx.delete(&book).await.or_raise(|| ErrorKind::Store)?;
        tx.commit().await.or_raise(|| ErrorKind::Store)?;
        tracing::info!(id = %book.id, title, "deleted book");
        Ok(book)
    }

    /// Register a user, or return the existing one with that name.
    #[instrument(skip(self))]
    pub async fn add_user(&self, name: &str) -> Result<Registration> {
        let name = required("user name", name)?;
        let mut tx = self.begin().await?;
        if let Some(existing) = tx.find_by_name::<User>(name).await.or_raise(|| ErrorKind::Store)? {
            return Ok(Registration::Existing(existing));
        }
        let user = tx.insert(&NewNamed::<User>::new(name)).await.or_raise(|| ErrorKind::Store)?;
        tx.commit().await.or_raise(|| ErrorKind::Store)?;
        tracing::info!(id = %user.id, name, "added user");
        Ok(Registration::Created(user))
    }

    /// Remove a user and their active loans.
    #[instrument(skip(self))]
    pub async fn remove_user(&self, name: &str) -> Result<User> {
        let mut tx = self.begin().await?;
        let user = tx
            .find_by_name::<User>(name)
            .await
            .or_raise(|| ErrorKind::Store)?
            .ok_or_raise(|| ErrorKind::NotFound(EntityKind::User, name.to_string()))?;
        tx.delete(&user).await.or_raise(|| ErrorKind::Store)?;
        tx.commit().await.or_raise(|| ErrorKind::Store)?;
        tracing::info!(id = %user.id, name, "removed user");
        Ok(user)
    }

    /// Lend a book to a user, registering the user first if needed.
    ///
    /// Nothing stops the same book being lent out more than once at a time.
    #[instrument(skip(self))]
    pub async fn loan_book(&self, user_name: &str, book_title: &str) -> Result<Loan> {
        let user_name = required("user name", user_name)?;
        let book_title = required("title", book_title)?;
        let mut tx = self.begin().await?;
        let user: User = tx.find_or_create(user_name).await.or_raise(|| ErrorKind::Store)?;
        let book = Self::book(&mut tx, book_title).await?;
        let loan = tx.insert(&NewLoan::now(&user, &book)).await.or_raise(|| ErrorKind::Store)?;
        tx.commit().await.or_raise(|| ErrorKind::Store)?;
        tracing::info!(id = %loan.id, user = user_name, title = book_title, "loaned book");
        Ok(loan)
    }

    /// Return a borrowed book by deleting the user's oldest loan of it.
    #[instrument(skip(self))]
    pub async fn return_book(&self, user_name: &str, book_title: &str) -> Result<Loan> {
        let mut tx = self.begin().await?;
        let user = tx
            .find_by_name::<User>(user_name)
            .await
            .or_raise(|| ErrorKind::Store)?
            .ok_or_raise(|| ErrorKind::NotFound(EntityKind::User, user_name.to_string()))?;
        let book = Self::book(&mut tx, book_title).await?;
        let loan = tx.find_loan(user.id, &book).await.or_raise(|| ErrorKind::Store)?.ok_or_raise(|| {
            ErrorKind::LoanNotFound { user: user_name.to_string(), title: book_title.to_string() }
        })?;
        tx.delete(&loan).await.or_raise(|| ErrorKind::Store)?;
        tx.commit().await.or_raise(|| ErrorKind::Store)?;
        tracing::info!(id = %loan.id, user = user_name, title = book_title, "returned book");
        Ok(loan)
    }
}
