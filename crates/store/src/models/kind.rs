use derive_more::Display;

/// The five kinds of record held by the store.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    #[display("author")]
    Author,
    #[display("genre")]
    Genre,
    #[display("book")]
    Book,
    #[display("user")]
    User,
    #[display("loan")]
    Loan,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EntityKind::Author, "author")]
    #[case(EntityKind::Genre, "genre")]
    #[case(EntityKind::Book, "book")]
    #[case(EntityKind::User, "user")]
    #[case(EntityKind::Loan, "loan")]
    fn test_display(#[case] kind: EntityKind, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }
}
