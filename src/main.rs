use clap::Parser;
use exn::ResultExt;
use shelfmark_catalog::{Catalog, Reports};
use shelfmark_config::Config;
use shelfmark_store::{Database, Repository};
use std::path::Path;
use std::time::Duration;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use crate::menu::Menu;

mod cli;
mod error;
mod menu;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("shelfmark: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    init_tracing(cli.log_level(&config.log.level))?;

    let busy_timeout = config.database.busy_timeout();
    let path = cli.database.unwrap_or(config.database.path);
    let db = open_catalog(&path, busy_timeout).await?;

    let repo = Repository::from(&db);
    let mut menu =
        Menu::new(BufReader::new(tokio::io::stdin()), std::io::stdout(), Catalog::from(&repo), Reports::from(&repo));
    let result = menu.run().await;
    db.close().await;
    result
}

/// Open the catalog at `path`, creating its directory first if needed.
async fn open_catalog(path: &Path, busy_timeout: Duration) -> Result<Database> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Database)?;
    }
    let db = Database::connect(path, busy_timeout).await.or_raise(|| ErrorKind::Database)?;
    tracing::info!(path = %path.display(), "catalog opened");
    Ok(db)
}

/// Log to stderr so that the menu on stdout stays readable.
///
/// `SHELFMARK_LOG` takes precedence over the configured level and the
/// verbosity flags.
fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_env("SHELFMARK_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    if tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init().is_err() {
        exn::bail!(ErrorKind::Logging);
    }
    Ok(())
}
