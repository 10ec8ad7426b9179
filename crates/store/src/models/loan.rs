use crate::error::{Error, ErrorKind, Result};
use crate::models::{Book, BookDetails, BookId, BookJoinRow, Draft, EntityKind, Record, User, UserId, Value};
use derive_more::{Display, From, Into};
use exn::ResultExt;
use time::UtcDateTime;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
pub struct LoanId(i64);

/// An active borrow of a book by a user.
///
/// Returning the book deletes the loan; no history is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub id: LoanId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub loaned_at: UtcDateTime,
}

#[derive(sqlx::FromRow)]
pub struct LoanRow {
    id: i64,
    user_id: i64,
    book_id: i64,
    loaned_at: i64,
}

fn from_timestamp(seconds: i64) -> Result<UtcDateTime> {
    UtcDateTime::from_unix_timestamp(seconds).or_raise(|| ErrorKind::InvalidData("loan date"))
}

impl Record for Loan {
    type Id = LoanId;
    type Row = LoanRow;

    const KIND: EntityKind = EntityKind::Loan;
    const TABLE: &'static str = "loans";
    const COLUMNS: &'static [&'static str] = &["user_id", "book_id", "loaned_at"];

    fn id(&self) -> Self::Id {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.user_id.into()),
            Value::Integer(self.book_id.into()),
            Value::Integer(self.loaned_at.unix_timestamp()),
        ]
    }

    fn from_row(row: LoanRow) -> Result<Self> {
        Ok(Self {
            id: LoanId(row.id),
            user_id: UserId::from(row.user_id),
            book_id: BookId::from(row.book_id),
            loaned_at: from_timestamp(row.loaned_at)?,
        })
    }
}

/// A loan that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub user_id: UserId,
    pub book_id: BookId,
    pub loaned_at: UtcDateTime,
}
impl NewLoan {
    /// A loan of `book` to `user`, starting now.
    pub fn now(user: &User, book: &Book) -> Self {
        Self { user_id: user.id, book_id: book.id, loaned_at: UtcDateTime::now() }
    }
}
impl Draft for NewLoan {
    type Record = Loan;

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.user_id.into()),
            Value::Integer(self.book_id.into()),
            Value::Integer(self.loaned_at.unix_timestamp()),
        ]
    }
}

/// A loan joined with its user and the borrowed book's details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanDetails {
    pub loan: Loan,
    pub user: User,
    pub book: BookDetails,
}

#[derive(sqlx::FromRow)]
pub(crate) struct LoanJoinRow {
    loan_id: i64,
    loaned_at: i64,
    user_id: i64,
    user_name: String,
    #[sqlx(flatten)]
    book: BookJoinRow,
}
impl TryFrom<LoanJoinRow> for LoanDetails {
    type Error = Error;
    fn try_from(row: LoanJoinRow) -> Result<Self> {
        let user = User { id: UserId::from(row.user_id), name: row.user_name };
        let book = BookDetails::from(row.book);
        let loan = Loan {
            id: LoanId(row.loan_id),
            user_id: user.id,
            book_id: book.book.id,
            loaned_at: from_timestamp(row.loaned_at)?,
        };
        Ok(Self { loan, user, book })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_model() {
        let now = UtcDateTime::now();
        let row = LoanRow { id: 1, user_id: 2, book_id: 3, loaned_at: now.unix_timestamp() };
        let loan = Loan::from_row(row).unwrap();
        assert_eq!(loan.book_id, BookId::from(3));
        // Converting to a Unix timestamp (measured in seconds) inherently strips the nanoseconds component.
        assert_eq!(loan.loaned_at, now.replace_nanosecond(0).unwrap());
    }

    #[test]
    fn test_invalid_timestamp() {
        let row = LoanRow { id: 1, user_id: 2, book_id: 3, loaned_at: i64::MAX };
        let err = Loan::from_row(row).unwrap_err();
        assert_eq!(&*err, &ErrorKind::InvalidData("loan date"));
    }
}
