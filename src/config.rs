//! Where the catalog lives on disk. Everything hangs off a single data
//! directory beneath the user's home so backups are a matter of copying one
//! folder.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".songbook-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "songbook.sqlite";
/// Subdirectory receiving exported track files.
const EXPORT_DIR_NAME: &str = "exports";
/// Log file used while the terminal UI owns the screen.
const LOG_FILE_NAME: &str = "songbook.log";
/// Environment variable that relocates the whole data directory.
pub const HOME_ENV: &str = "SONGBOOK_HOME";

/// Resolved filesystem locations for one run of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
    pub log_path: PathBuf,
}

impl AppConfig {
    /// Lay out every path beneath `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            export_dir: data_dir.join(EXPORT_DIR_NAME),
            log_path: data_dir.join(LOG_FILE_NAME),
            data_dir,
        }
    }

    /// Resolve the data directory from `SONGBOOK_HOME`, falling back to
    /// `~/.songbook-manager`.
    pub fn resolve() -> Result<Self> {
        match env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => Ok(Self::with_data_dir(PathBuf::from(dir))),
            _ => {
                let base_dirs =
                    BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
                Ok(Self::with_data_dir(base_dirs.home_dir().join(DATA_DIR_NAME)))
            }
        }
    }

    /// Point the database somewhere else while keeping the other locations.
    pub fn with_db_path(mut self, db_path: impl AsRef<Path>) -> Self {
        self.db_path = db_path.as_ref().to_path_buf();
        self
    }

    /// Create the data and export directories if they are missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).context("failed to create data directory")?;
        fs::create_dir_all(&self.export_dir).context("failed to create export directory")?;
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("failed to create database directory")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_the_data_dir() {
        let config = AppConfig::with_data_dir("/tmp/sb");
        assert_eq!(config.db_path, PathBuf::from("/tmp/sb/songbook.sqlite"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/sb/exports"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/sb/songbook.log"));
    }

    #[test]
    fn db_override_keeps_other_paths() {
        let config = AppConfig::with_data_dir("/tmp/sb").with_db_path("/elsewhere/x.sqlite");
        assert_eq!(config.db_path, PathBuf::from("/elsewhere/x.sqlite"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/sb/exports"));
    }
}
