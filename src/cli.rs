use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Keep track of a small library's books, borrowers and loans.
#[derive(Debug, Parser)]
#[command(name = "shelfmark", version, about)]
pub struct Cli {
    /// SQLite file to use instead of the configured one
    #[arg(long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Extra TOML configuration file, layered over the user's config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (repeat for more)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// The log filter to use when `SHELFMARK_LOG` is not set.
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => configured,
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}
