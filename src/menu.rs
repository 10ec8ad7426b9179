//! The interactive numbered menu.
//!
//! Reads one answer per line from any async reader and writes prompts and
//! results to any writer, so the whole loop can be driven from tests with a
//! byte slice and a `Vec<u8>`.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelfmark_catalog::{BookUpdate, Catalog, Registration, Reports};
use std::fmt::Write as _;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    AddBook,
    UpdateBook,
    ViewUsers,
    AddUser,
    RemoveUser,
    DeleteBook,
    LoanBook,
    ReturnBook,
    ViewBooks,
    ViewLoans,
    BooksByAuthor,
    BooksByUser,
    FavoriteAuthor,
    PopularGenre,
    CountByAuthor,
    Exit,
}

impl Command {
    const ALL: [(&'static str, Command); 16] = [
        ("1", Self::AddBook),
        ("2", Self::UpdateBook),
        ("3", Self::ViewUsers),
        ("4", Self::AddUser),
        ("5", Self::RemoveUser),
        ("6", Self::DeleteBook),
        ("7", Self::LoanBook),
        ("8", Self::ReturnBook),
        ("9", Self::ViewBooks),
        ("10", Self::ViewLoans),
        ("11", Self::BooksByAuthor),
        ("12", Self::BooksByUser),
        ("13", Self::FavoriteAuthor),
        ("14", Self::PopularGenre),
        ("15", Self::CountByAuthor),
        ("0", Self::Exit),
    ];

    pub fn parse(choice: &str) -> Option<Self> {
        let choice = choice.trim();
        if choice.eq_ignore_ascii_case("exit") || choice.eq_ignore_ascii_case("quit") {
            return Some(Self::Exit);
        }
        Self::ALL.iter().find(|(key, _)| *key == choice).map(|(_, command)| *command)
    }

    fn label(self) -> &'static str {
        match self {
            Self::AddBook => "Add a book",
            Self::UpdateBook => "Update a book",
            Self::ViewUsers => "View users",
            Self::AddUser => "Add a user",
            Self::RemoveUser => "Remove a user",
            Self::DeleteBook => "Delete a book",
            Self::LoanBook => "Loan a book",
            Self::ReturnBook => "Return a book",
            Self::ViewBooks => "View books",
            Self::ViewLoans => "View loans",
            Self::BooksByAuthor => "Books by author",
            Self::BooksByUser => "Books borrowed by a user",
            Self::FavoriteAuthor => "A user's favorite author",
            Self::PopularGenre => "Most popular genre",
            Self::CountByAuthor => "Number of books by an author",
            Self::Exit => "Exit",
        }
    }

    /// Questions asked, in order, before the command can run.
    fn prompts(self) -> &'static [&'static str] {
        match self {
            Self::AddBook => &["Title", "Author", "Genre"],
            Self::UpdateBook => &[
                "Title of the book to update",
                "New title (empty to keep)",
                "New author (empty to keep)",
                "New genre (empty to keep)",
            ],
            Self::AddUser | Self::RemoveUser => &["User name"],
            Self::DeleteBook => &["Title"],
            Self::LoanBook | Self::ReturnBook => &["User name", "Title"],
            Self::BooksByAuthor | Self::CountByAuthor => &["Author"],
            Self::BooksByUser | Self::FavoriteAuthor => &["User name"],
            Self::ViewUsers | Self::ViewBooks | Self::ViewLoans | Self::PopularGenre | Self::Exit => &[],
        }
    }
}

pub struct Menu<R, W> {
    input: R,
    output: W,
    catalog: Catalog,
    reports: Reports,
}

impl<R, W> Menu<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, output: W, catalog: Catalog, reports: Reports) -> Self {
        Self { input, output, catalog, reports }
    }

    /// Show the menu and run commands until the user exits or input ends.
    ///
    /// A failing command is reported and the loop carries on; only terminal
    /// I/O errors end it early.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.show_menu()?;
            let Some(choice) = self.ask("Choose an option").await? else {
                break;
            };
            let Some(command) = Command::parse(&choice) else {
                self.say(&format!("Unknown option {choice:?}, please choose a number from the menu.\n"))?;
                continue;
            };
            if command == Command::Exit {
                break;
            }
            let mut answers = Vec::with_capacity(command.prompts().len());
            for prompt in command.prompts() {
                let Some(answer) = self.ask(prompt).await? else {
                    return self.say("\n");
                };
                answers.push(answer);
            }
            let text = match self.execute(command, &answers).await {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(?command, error = ?err, "command failed");
                    format!("Error: {err}\n")
                },
            };
            self.say(&text)?;
        }
        self.say("Goodbye.\n")
    }

    fn say(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).or_raise(|| ErrorKind::Io)?;
        self.output.flush().or_raise(|| ErrorKind::Io)
    }

    fn show_menu(&mut self) -> Result<()> {
        let mut text = String::from("\nLibrary menu (0, exit or quit to leave)\n");
        for (key, command) in Command::ALL {
            _ = writeln!(text, "{key:>3}. {}", command.label());
        }
        self.say(&text)
    }

    /// Prompt for one line. Returns `None` once input is exhausted.
    async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        self.say(&format!("{prompt}: "))?;
        let mut line = Vec::new();
        let read = self.input.read_until(b'\n', &mut line).await.or_raise(|| ErrorKind::Io)?;
        if read == 0 {
            return Ok(None);
        }
        // Bytes that are not UTF-8 become U+FFFD instead of ending the session.
        Ok(Some(String::from_utf8_lossy(&line).trim().to_string()))
    }

    async fn execute(&self, command: Command, answers: &[String]) -> shelfmark_catalog::Result<String> {
        let arg = |i: usize| answers.get(i).map(String::as_str).unwrap_or_default();
        let mut out = String::new();
        match command {
            Command::AddBook => {
                let book = self.catalog.add_book(arg(0), arg(1), arg(2)).await?;
                _ = writeln!(out, "Added {:?}.", book.title);
            },
            Command::UpdateBook => {
                let changes = BookUpdate::default().title(arg(1)).author(arg(2)).genre(arg(3));
                let book = self.catalog.update_book(arg(0), &changes).await?;
                _ = writeln!(out, "Updated {:?}.", book.title);
            },
            Command::ViewUsers => {
                let users = self.reports.all_users().await?;
                if users.is_empty() {
                    out.push_str("No users registered.\n");
                }
                for user in users {
                    _ = writeln!(out, "{:>4}. {}", user.id, user.name);
                }
            },
            Command::AddUser => match self.catalog.add_user(arg(0)).await? {
                Registration::Created(user) => {
                    _ = writeln!(out, "Registered {}.", user.name);
                },
                Registration::Existing(user) => {
                    _ = writeln!(out, "{} is already registered.", user.name);
                },
            },
            Command::RemoveUser => {
                let user = self.catalog.remove_user(arg(0)).await?;
                _ = writeln!(out, "Removed {}.", user.name);
            },
            Command::DeleteBook => {
                let book = self.catalog.delete_book(arg(0)).await?;
                _ = writeln!(out, "Deleted {:?}.", book.title);
            },
            Command::LoanBook => {
                self.catalog.loan_book(arg(0), arg(1)).await?;
                _ = writeln!(out, "Loaned {:?} to {}.", arg(1), arg(0));
            },
            Command::ReturnBook => {
                self.catalog.return_book(arg(0), arg(1)).await?;
                _ = writeln!(out, "{} returned {:?}.", arg(0), arg(1));
            },
            Command::ViewBooks => {
                let books = self.reports.all_books().await?;
                if books.is_empty() {
                    out.push_str("The catalog is empty.\n");
                }
                for details in books {
                    _ = writeln!(out, "{:?} by {} ({})", details.book.title, details.author.name, details.genre.name);
                }
            },
            Command::ViewLoans => {
                let loans = self.reports.all_loans().await?;
                if loans.is_empty() {
                    out.push_str("Nothing is on loan.\n");
                }
                for details in loans {
                    _ = writeln!(
                        out,
                        "{}: {:?} by {}, since {}",
                        details.user.name,
                        details.book.book.title,
                        details.book.author.name,
                        details.loan.loaned_at.date(),
                    );
                }
            },
            Command::BooksByAuthor => {
                let books = self.reports.books_by_author(arg(0)).await?;
                if books.is_empty() {
                    _ = writeln!(out, "No books by {}.", arg(0));
                }
                for book in books {
                    _ = writeln!(out, "{:?}", book.title);
                }
            },
            Command::BooksByUser => {
                let loans = self.reports.loans_for_user(arg(0)).await?;
                if loans.is_empty() {
                    _ = writeln!(out, "{} has nothing on loan.", arg(0));
                }
                for details in loans {
                    _ = writeln!(
                        out,
                        "{:?} by {} ({}), since {}",
                        details.book.book.title,
                        details.book.author.name,
                        details.book.genre.name,
                        details.loan.loaned_at.date(),
                    );
                }
            },
            Command::FavoriteAuthor => {
                let (author, count) = self.reports.favorite_author(arg(0)).await?;
                _ = writeln!(out, "{}'s favorite author is {} ({count} on loan).", arg(0), author.name);
            },
            Command::PopularGenre => match self.reports.most_popular_genre().await? {
                Some((genre, count)) => {
                    _ = writeln!(out, "Most popular genre: {} ({count} on loan).", genre.name);
                },
                None => out.push_str("Nothing is on loan.\n"),
            },
            Command::CountByAuthor => {
                let count = self.reports.book_count_by_author(arg(0)).await?;
                _ = writeln!(out, "{} has {count} book(s) in the catalog.", arg(0));
            },
            Command::Exit => {},
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use shelfmark_store::{Database, Repository};

    async fn run(input: &str) -> String {
        run_bytes(input.as_bytes()).await
    }

    async fn run_bytes(input: &[u8]) -> String {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        let mut output = Vec::new();
        {
            let mut menu = Menu::new(input, &mut output, Catalog::from(&repo), Reports::from(&repo));
            menu.run().await.unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[rstest]
    #[case("1", Some(Command::AddBook))]
    #[case(" 15 ", Some(Command::CountByAuthor))]
    #[case("0", Some(Command::Exit))]
    #[case("QUIT", Some(Command::Exit))]
    #[case("exit", Some(Command::Exit))]
    #[case("16", None)]
    #[case("add", None)]
    #[case("", None)]
    fn test_parse_command(#[case] choice: &str, #[case] expected: Option<Command>) {
        assert_eq!(Command::parse(choice), expected);
    }

    #[tokio::test]
    async fn test_exit_immediately() {
        let output = run("0\n").await;
        assert!(output.contains("Library menu"));
        assert!(output.ends_with("Goodbye.\n"));
    }

    #[tokio::test]
    async fn test_end_of_input_exits() {
        let output = run("").await;
        assert!(output.ends_with("Goodbye.\n"));
        // Input ending halfway through a command's questions also just stops.
        let output = run("1\nDune\n").await;
        assert!(!output.contains("Added"));
    }

    #[tokio::test]
    async fn test_unknown_option_reprompts() {
        let output = run("42\nquit\n").await;
        assert!(output.contains("Unknown option \"42\""));
        assert_eq!(output.matches("Library menu").count(), 2);
    }

    #[tokio::test]
    async fn test_add_loan_and_report() {
        let output = run(concat!(
            "1\nDune\nFrank Herbert\nScience Fiction\n",
            "7\npaul\nDune\n",
            "12\npaul\n",
            "13\npaul\n",
            "14\n",
            "15\nFrank Herbert\n",
            "0\n",
        ))
        .await;
        assert!(output.contains("Added \"Dune\"."));
        assert!(output.contains("Loaned \"Dune\" to paul."));
        assert!(output.contains("\"Dune\" by Frank Herbert (Science Fiction), since "));
        assert!(output.contains("paul's favorite author is Frank Herbert (1 on loan)."));
        assert!(output.contains("Most popular genre: Science Fiction (1 on loan)."));
        assert!(output.contains("Frank Herbert has 1 book(s) in the catalog."));
    }

    #[tokio::test]
    async fn test_errors_do_not_stop_the_loop() {
        let output = run("1\nDune\nHerbert\nSciFi\n1\nDune\nHerbert\nSciFi\n8\npaul\nDune\n9\n0\n").await;
        assert!(output.contains("Error: a book titled \"Dune\" is already in the catalog"));
        assert!(output.contains("Error: user not found: paul"));
        assert!(output.contains("\"Dune\" by Herbert (SciFi)"));
        assert!(output.ends_with("Goodbye.\n"));
    }

    #[tokio::test]
    async fn test_update_keeps_empty_fields() {
        let output = run("1\nDune\nHerbert\nSciFi\n2\nDune\n\nAsimov\n\n9\n15\nHerbert\n0\n").await;
        assert!(output.contains("Updated \"Dune\"."));
        assert!(output.contains("\"Dune\" by Asimov (SciFi)"));
        assert!(output.contains("Herbert has 0 book(s) in the catalog."));
    }

    #[tokio::test]
    async fn test_invalid_utf8_answer_keeps_the_loop_going() {
        let output = run_bytes(b"4\n\xffalia\n3\n0\n").await;
        assert!(output.contains("Registered \u{fffd}alia."));
        assert!(output.contains("\u{fffd}alia\n"));
        assert!(output.ends_with("Goodbye.\n"));
    }

    #[tokio::test]
    async fn test_menu_says_how_to_leave() {
        let output = run("0\n").await;
        assert!(output.contains("Library menu (0, exit or quit to leave)"));
    }

    #[tokio::test]
    async fn test_loan_listings_return_and_delete() {
        let output = run(concat!(
            "1\nDune\nHerbert\nSciFi\n",
            "1\nChildren of Dune\nHerbert\nSciFi\n",
            "7\npaul\nDune\n",
            "10\n",
            "11\nHerbert\n",
            "11\nNobody\n",
            "8\npaul\nDune\n",
            "10\n",
            "6\nChildren of Dune\n",
            "6\nChildren of Dune\n",
            "9\n",
            "0\n",
        ))
        .await;
        assert!(output.contains("paul: \"Dune\" by Herbert, since "));
        assert!(output.contains("\"Dune\"\n\"Children of Dune\"\n"));
        assert!(output.contains("No books by Nobody."));
        assert!(output.contains("paul returned \"Dune\"."));
        assert!(output.contains("Nothing is on loan."));
        assert!(output.contains("Deleted \"Children of Dune\"."));
        assert!(output.contains("Error: book not found: Children of Dune"));
        assert!(output.contains("\"Dune\" by Herbert (SciFi)"));
        assert!(!output.contains("\"Children of Dune\" by Herbert (SciFi)"));
    }

    #[tokio::test]
    async fn test_users() {
        let output = run("4\nalia\n4\nalia\n3\n5\nalia\n3\n0\n").await;
        assert!(output.contains("Registered alia."));
        assert!(output.contains("alia is already registered."));
        assert!(output.contains("Removed alia."));
        assert!(output.contains("No users registered."));
    }
}
