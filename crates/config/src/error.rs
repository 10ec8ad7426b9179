use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A configuration source could not be read, or held a value of the wrong type.
    #[display("could not load configuration")]
    Load,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Configuration is read once at start-up; a broken file stays broken.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
