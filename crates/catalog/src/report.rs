//! Read-only queries over the catalog.

use crate::error::{ErrorKind, Result};
use crate::tally::first_max;
use exn::{OptionExt, ResultExt};
use shelfmark_store::models::{Author, Book, BookDetails, Genre, LoanDetails, User};
use shelfmark_store::{EntityKind, Repository};
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct Reports {
    repo: Repository,
}
impl From<&Repository> for Reports {
    fn from(repo: &Repository) -> Self {
        Self { repo: repo.clone() }
    }
}
impl Reports {
    async fn user(&self, name: &str) -> Result<User> {
        self.repo
            .find_by_name::<User>(name)
            .await
            .or_raise(|| ErrorKind::Store)?
            .ok_or_raise(|| ErrorKind::NotFound(EntityKind::User, name.to_string()))
    }

    /// Books written by the named author, in the order they were added.
    ///
    /// An author nobody has heard of simply has no books.
    pub async fn books_by_author(&self, author_name: &str) -> Result<Vec<Book>> {
        self.repo.books_by_author(author_name).await.or_raise(|| ErrorKind::Store)
    }

    /// How many books the named author has in the catalog.
    pub async fn book_count_by_author(&self, author_name: &str) -> Result<u64> {
        self.repo.count_books_by_author(author_name).await.or_raise(|| ErrorKind::Store)
    }

    /// Everything the user currently has on loan, oldest loan first.
    pub async fn loans_for_user(&self, user_name: &str) -> Result<Vec<LoanDetails>> {
        let user = self.user(user_name).await?;
        self.repo.loan_details_for_user(user.id).await.or_raise(|| ErrorKind::Store)
    }

    /// The author the user has the most active loans of, with that count.
    ///
    /// When several authors share the highest count, the one whose book the
    /// user borrowed first wins.
    #[instrument(skip(self))]
    pub async fn favorite_author(&self, user_name: &str) -> Result<(Author, u64)> {
        let loans = self.loans_for_user(user_name).await?;
        first_max(loans.into_iter().map(|details| details.book.author))
            .ok_or_raise(|| ErrorKind::NoLoans(user_name.to_string()))
    }

    /// The genre with the most active loans across all users.
    ///
    /// Returns `None` when nothing is on loan. Ties go to the genre of the
    /// oldest loan among the tied genres.
    #[instrument(skip(self))]
    pub async fn most_popular_genre(&self) -> Result<Option<(Genre, u64)>> {
        let loans = self.all_loans().await?;
        Ok(first_max(loans.into_iter().map(|details| details.book.genre)))
    }

    pub async fn all_books(&self) -> Result<Vec<BookDetails>> {
        self.repo.list_book_details().await.or_raise(|| ErrorKind::Store)
    }

    pub async fn all_loans(&self) -> Result<Vec<LoanDetails>> {
        self.repo.list_loan_details().await.or_raise(|| ErrorKind::Store)
    }

    pub async fn all_users(&self) -> Result<Vec<User>> {
        self.repo.list_all::<User>().await.or_raise(|| ErrorKind::Store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BookUpdate, Catalog};
    use shelfmark_store::Database;

    async fn setup() -> (Catalog, Reports) {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        (Catalog::from(&repo), Reports::from(&repo))
    }

    #[tokio::test]
    async fn test_books_by_author() {
        let (catalog, reports) = setup().await;
        catalog.add_book("Foundation", "Asimov", "SciFi").await.unwrap();
        catalog.add_book("Emma", "Austen", "Classics").await.unwrap();
        catalog.add_book("I, Robot", "Asimov", "SciFi").await.unwrap();
        let titles: Vec<String> =
            reports.books_by_author("Asimov").await.unwrap().into_iter().map(|book| book.title).collect();
        assert_eq!(titles, vec!["Foundation", "I, Robot"]);
        assert_eq!(reports.book_count_by_author("Asimov").await.unwrap(), 2);
        assert!(reports.books_by_author("Nobody").await.unwrap().is_empty());
        assert_eq!(reports.book_count_by_author("Nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_follows_author_change() {
        let (catalog, reports) = setup().await;
        catalog.add_book("Dune", "Herbert", "SciFi").await.unwrap();
        assert_eq!(reports.book_count_by_author("Herbert").await.unwrap(), 1);
        catalog.update_book("Dune", &BookUpdate::default().author("Asimov")).await.unwrap();
        assert_eq!(reports.book_count_by_author("Herbert").await.unwrap(), 0);
        assert_eq!(reports.book_count_by_author("Asimov").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_loans_for_user() {
        let (catalog, reports) = setup().await;
        catalog.add_book("Dune", "Herbert", "SciFi").await.unwrap();
        catalog.add_book("Emma", "Austen", "Classics").await.unwrap();
        catalog.loan_book("paul", "Emma").await.unwrap();
        catalog.loan_book("paul", "Dune").await.unwrap();
        catalog.loan_book("jessica", "Dune").await.unwrap();
        let loans = reports.loans_for_user("paul").await.unwrap();
        let titles: Vec<&str> = loans.iter().map(|details| details.book.book.title.as_str()).collect();
        assert_eq!(titles, vec!["Emma", "Dune"]);
        assert_eq!(loans[0].book.author.name, "Austen");
        assert_eq!(loans[0].book.genre.name, "Classics");
        assert!(loans.iter().all(|details| details.user.name == "paul"));
    }

    #[tokio::test]
    async fn test_loans_for_unknown_user() {
        let (_catalog, reports) = setup().await;
        let err = reports.loans_for_user("nobody").await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::NotFound(EntityKind::User, "nobody".to_string()));
    }

    #[tokio::test]
    async fn test_favorite_author() {
        let (catalog, reports) = setup().await;
        catalog.add_book("Foundation", "Asimov", "SciFi").await.unwrap();
        catalog.add_book("I, Robot", "Asimov", "SciFi").await.unwrap();
        catalog.add_book("Emma", "Austen", "Classics").await.unwrap();
        for title in ["Foundation", "I, Robot", "Emma"] {
            catalog.loan_book("U", title).await.unwrap();
        }
        let (author, count) = reports.favorite_author("U").await.unwrap();
        assert_eq!(author.name, "Asimov");
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_favorite_author_tie_keeps_first_borrowed() {
        let (catalog, reports) = setup().await;
        catalog.add_book("Emma", "Austen", "Classics").await.unwrap();
        catalog.add_book("Dune", "Herbert", "SciFi").await.unwrap();
        catalog.loan_book("U", "Dune").await.unwrap();
        catalog.loan_book("U", "Emma").await.unwrap();
        let (author, count) = reports.favorite_author("U").await.unwrap();
        assert_eq!(author.name, "Herbert");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_favorite_author_without_loans() {
        let (catalog, reports) = setup().await;
        catalog.add_user("U").await.unwrap();
        let err = reports.favorite_author("U").await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::NoLoans("U".to_string()));
        let err = reports.favorite_author("nobody").await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::NotFound(EntityKind::User, "nobody".to_string()));
    }

    #[tokio::test]
    async fn test_most_popular_genre() {
        let (catalog, reports) = setup().await;
        assert_eq!(reports.most_popular_genre().await.unwrap(), None);
        catalog.add_book("Emma", "Austen", "Classics").await.unwrap();
        catalog.add_book("Dune", "Herbert", "SciFi").await.unwrap();
        catalog.loan_book("a", "Emma").await.unwrap();
        catalog.loan_book("b", "Dune").await.unwrap();
        catalog.loan_book("c", "Dune").await.unwrap();
        let (genre, count) = reports.most_popular_genre().await.unwrap().unwrap();
        assert_eq!(genre.name, "SciFi");
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_listings() {
        let (catalog, reports) = setup().await;
        catalog.add_book("Dune", "Herbert", "SciFi").await.unwrap();
        catalog.add_user("alia").await.unwrap();
        catalog.loan_book("paul", "Dune").await.unwrap();
        let books = reports.all_books().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].author.name, "Herbert");
        let users: Vec<String> = reports.all_users().await.unwrap().into_iter().map(|user| user.name).collect();
        assert_eq!(users, vec!["alia", "paul"]);
        let loans = reports.all_loans().await.unwrap();
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].user.name, "paul");
    }
}
