use crate::error::Result;
use crate::models::{Draft, EntityKind, Named, Record, Value};
use derive_more::{Display, From, Into};
use std::marker::PhantomData;

#[derive(sqlx::FromRow)]
pub struct NamedRow {
    id: i64,
    name: String,
}

macro_rules! named_record {
    ($(#[$meta:meta])* $model:ident, $id:ident, $kind:ident, $table:literal) => {
        #[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
        pub struct $id(i64);

        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $model {
            pub id: $id,
            pub name: String,
        }

        impl Record for $model {
            type Id = $id;
            type Row = NamedRow;

            const KIND: EntityKind = EntityKind::$kind;
            const TABLE: &'static str = $table;
            const COLUMNS: &'static [&'static str] = &["name"];

            fn id(&self) -> Self::Id {
                self.id
            }

            fn values(&self) -> Vec<Value> {
                vec![Value::Text(self.name.clone())]
            }

            fn from_row(row: NamedRow) -> Result<Self> {
                Ok(Self { id: $id(row.id), name: row.name })
            }
        }

        impl Named for $model {
            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

named_record!(
    /// A book author, created on first reference by name.
    Author,
    AuthorId,
    Author,
    "authors"
);
named_record!(
    /// A genre, created on first reference by name.
    Genre,
    GenreId,
    Genre,
    "genres"
);
named_record!(
    /// A library member who borrows books.
    User,
    UserId,
    User,
    "users"
);

/// An author, genre or user that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNamed<E> {
    pub name: String,
    kind: PhantomData<fn() -> E>,
}
impl<E: Named> NewNamed<E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: PhantomData }
    }
}
impl<E: Named> Draft for NewNamed<E> {
    type Record = E;

    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_model() {
        let row = NamedRow { id: 7, name: "Ursula K. Le Guin".to_string() };
        let author = Author::from_row(row).unwrap();
        assert_eq!(author.id, AuthorId::from(7));
        assert_eq!(author.name(), "Ursula K. Le Guin");
        assert_eq!(i64::from(author.id()), 7);
    }

    #[test]
    fn test_draft_values_match_columns() {
        let draft = NewNamed::<Genre>::new("Fantasy");
        assert_eq!(draft.values().len(), Genre::COLUMNS.len());
        assert_eq!(draft.values(), vec![Value::Text("Fantasy".to_string())]);
    }
}
