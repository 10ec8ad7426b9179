mod book;
mod kind;
mod loan;
mod named;
mod record;

pub(crate) use self::book::BookJoinRow;
pub use self::book::{Book, BookDetails, BookId, NewBook};
pub use self::kind::EntityKind;
pub(crate) use self::loan::LoanJoinRow;
pub use self::loan::{Loan, LoanDetails, LoanId, NewLoan};
pub use self::named::{Author, AuthorId, Genre, GenreId, NewNamed, User, UserId};
pub use self::record::{Draft, Named, Record, Value};
