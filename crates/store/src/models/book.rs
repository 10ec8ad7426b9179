use crate::error::Result;
use crate::models::{Author, AuthorId, Draft, EntityKind, Genre, GenreId, Record, Value};
use derive_more::{Display, From, Into};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
pub struct BookId(i64);

/// A catalogued book.
///
/// The title is the natural key: no two books share one. Author and genre are
/// referenced by id only; use [`BookDetails`] when the names are needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author_id: AuthorId,
    pub genre_id: GenreId,
}

#[derive(sqlx::FromRow)]
pub struct BookRow {
    id: i64,
    title: String,
    author_id: i64,
    genre_id: i64,
}

impl Record for Book {
    type Id = BookId;
    type Row = BookRow;

    const KIND: EntityKind = EntityKind::Book;
    const TABLE: &'static str = "books";
    const COLUMNS: &'static [&'static str] = &["title", "author_id", "genre_id"];

    fn id(&self) -> Self::Id {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Integer(self.author_id.into()),
            Value::Integer(self.genre_id.into()),
        ]
    }

    fn from_row(row: BookRow) -> Result<Self> {
        Ok(Self {
            id: BookId(row.id),
            title: row.title,
            author_id: AuthorId::from(row.author_id),
            genre_id: GenreId::from(row.genre_id),
        })
    }
}

/// A book that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author_id: AuthorId,
    pub genre_id: GenreId,
}
impl NewBook {
    pub fn new(title: impl Into<String>, author: &Author, genre: &Genre) -> Self {
        Self { title: title.into(), author_id: author.id, genre_id: genre.id }
    }
}
impl Draft for NewBook {
    type Record = Book;

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Integer(self.author_id.into()),
            Value::Integer(self.genre_id.into()),
        ]
    }
}

/// A book joined with its author and genre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetails {
    pub book: Book,
    pub author: Author,
    pub genre: Genre,
}

/// Row shape of `books JOIN authors JOIN genres`.
///
/// Column names are aliased in the query so the three tables don't collide.
#[derive(sqlx::FromRow)]
pub(crate) struct BookJoinRow {
    pub(crate) book_id: i64,
    pub(crate) title: String,
    pub(crate) author_id: i64,
    pub(crate) author_name: String,
    pub(crate) genre_id: i64,
    pub(crate) genre_name: String,
}
impl From<BookJoinRow> for BookDetails {
    fn from(row: BookJoinRow) -> Self {
        let author = Author { id: AuthorId::from(row.author_id), name: row.author_name };
        let genre = Genre { id: GenreId::from(row.genre_id), name: row.genre_name };
        let book = Book { id: BookId(row.book_id), title: row.title, author_id: author.id, genre_id: genre.id };
        Self { book, author, genre }
    }
}
