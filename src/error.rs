use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    #[display("could not install the log subscriber")]
    Logging,
    #[display("could not open the catalog database")]
    Database,
    /// Reading the next answer or writing to the terminal failed.
    #[display("terminal I/O error")]
    Io,
}
