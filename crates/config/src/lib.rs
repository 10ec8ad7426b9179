//! Layered configuration for shelfmark.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `<config dir>/shelfmark/config.toml` (platform config directory)
//! 3. An explicit TOML file, if one is given (`--config`)
//! 4. `SHELFMARK_*` environment variables, with `__` between sections
//!    (`SHELFMARK_DATABASE__PATH` sets `database.path`)
//!
//! `SHELFMARK_LOG` is left alone here: it is read directly as a log filter.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "SHELFMARK_";
const DATABASE_FILE: &str = "library.db";
const CONFIG_FILE: &str = "config.toml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "shelfmark")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file holding the catalog. Created on first use.
    pub path: PathBuf,
    /// How long to wait on a locked database before giving up.
    pub busy_timeout_ms: u64,
}
impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = match project_dirs() {
            Some(dirs) => dirs.data_dir().join(DATABASE_FILE),
            None => PathBuf::from(DATABASE_FILE),
        };
        Self { path, busy_timeout_ms: 1500 }
    }
}
impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogConfig {
    /// Default `tracing` filter directive, e.g. `warn` or `shelfmark_catalog=debug`.
    pub level: String,
}
impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "warn".to_string() }
    }
}

impl Config {
    /// Load configuration from every source, with `extra` layered above the
    /// user's config file.
    ///
    /// A missing user config file is skipped. An explicit file must exist,
    /// and a malformed file of either kind is an error.
    pub fn load(extra: Option<&Path>) -> Result<Self> {
        if let Some(path) = extra
            && !path.is_file()
        {
            exn::bail!(ErrorKind::Load);
        }
        let config: Self = Self::figment(extra).extract().or_raise(|| ErrorKind::Load)?;
        tracing::debug!(database = %config.database.path.display(), "loaded configuration");
        Ok(config)
    }

    /// Build the provider chain without extracting it.
    pub fn figment(extra: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = Self::user_config_path()
            && path.exists()
        {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = extra {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["log"]).split("__"))
    }

    /// Path of the per-user config file, if the platform has a config directory.
    pub fn user_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database.path.file_name().unwrap(), DATABASE_FILE);
        assert_eq!(config.database.busy_timeout(), Duration::from_millis(1500));
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "shelfmark.toml",
                r#"
                [database]
                path = "/srv/library/catalog.db"

                [log]
                level = "debug"
                "#,
            )?;
            let config = Config::load(Some(Path::new("shelfmark.toml"))).unwrap();
            assert_eq!(config.database.path, PathBuf::from("/srv/library/catalog.db"));
            // Keys absent from the file keep their defaults.
            assert_eq!(config.database.busy_timeout_ms, 1500);
            assert_eq!(config.log.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_env_beats_file() {
        Jail::expect_with(|jail| {
            jail.create_file("shelfmark.toml", "[database]\nbusy_timeout_ms = 250\n")?;
            jail.set_env("SHELFMARK_DATABASE__BUSY_TIMEOUT_MS", "5000");
            let config = Config::load(Some(Path::new("shelfmark.toml"))).unwrap();
            assert_eq!(config.database.busy_timeout_ms, 5000);
            Ok(())
        });
    }

    #[test]
    fn test_log_filter_variable_is_ignored() {
        Jail::expect_with(|jail| {
            jail.set_env("SHELFMARK_LOG", "shelfmark_store=trace");
            let config = Config::load(None).unwrap();
            assert_eq!(config.log.level, "warn");
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert_eq!(&*err, &ErrorKind::Load);
    }

    #[test]
    fn test_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database]\nbusy_timeout_ms = \"soon\"\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(&*err, &ErrorKind::Load);
        assert!(!err.is_retryable());
    }
}
