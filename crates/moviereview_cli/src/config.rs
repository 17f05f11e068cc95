//! Process configuration.
//!
//! # Responsibility
//! - Resolve database and logging settings from flags, environment, and `.env`.
//!
//! # Invariants
//! - Flags win over environment variables; unset values fall back to
//!   defaults under the system temp directory.

use clap::Args;
use moviereview_core::default_log_level;
use std::path::PathBuf;

const DEFAULT_DB_FILE: &str = "moviereview.sqlite3";
const DEFAULT_LOG_DIR: &str = "moviereview-logs";

#[derive(Debug, Clone, Default, Args)]
pub struct AppConfig {
    /// SQLite database file
    #[arg(long, env = "MOVIEREVIEW_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, env = "MOVIEREVIEW_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, env = "MOVIEREVIEW_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR))
    }
}
