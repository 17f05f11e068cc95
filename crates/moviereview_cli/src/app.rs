//! Application lifecycle.
//!
//! # Responsibility
//! - Bring up logging and storage once per process.
//! - Hand out request handlers bound to the open connection.
//! - Close storage explicitly on shutdown.
//!
//! # Invariants
//! - Logging is initialized before the database is opened.
//! - `stop` consumes the app; no handler can outlive it.

use crate::config::AppConfig;
use log::{error, info};
use moviereview_core::db::{open_db, DbError};
use moviereview_core::{init_logging, LoggingError, RepoError, SqliteReviewRepository};
use moviereview_rpc::{ReviewRpcHandler, RpcStatus};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug)]
pub enum AppError {
    Logging(LoggingError),
    Db(DbError),
    Repo(RepoError),
    Rpc(RpcStatus),
    Output(serde_json::Error),
    Close(rusqlite::Error),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "logging: {err}"),
            Self::Db(err) => write!(f, "database: {err}"),
            Self::Repo(err) => write!(f, "repository: {err}"),
            Self::Rpc(status) => write!(f, "{status}"),
            Self::Output(err) => write!(f, "output: {err}"),
            Self::Close(err) => write!(f, "failed to close database: {err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Rpc(status) => Some(status),
            Self::Output(err) => Some(err),
            Self::Close(err) => Some(err),
        }
    }
}

impl From<LoggingError> for AppError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RpcStatus> for AppError {
    fn from(value: RpcStatus) -> Self {
        Self::Rpc(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Running application: an open, migrated database connection.
pub struct App {
    conn: Connection,
}

impl App {
    /// Initializes logging, then opens and migrates the configured database.
    pub fn start(config: &AppConfig) -> AppResult<Self> {
        let log_dir = config.log_dir();
        init_logging(config.log_level(), &log_dir.to_string_lossy())?;

        let db_path = config.db_path();
        let conn = open_db(&db_path).map_err(|err| {
            error!(
                "event=app_start module=app status=error db_path={} error={err}",
                db_path.display()
            );
            err
        })?;
        Ok(Self::with_connection(conn, Some(db_path)))
    }

    /// Wraps an already bootstrapped connection.
    pub fn with_connection(conn: Connection, db_path: Option<PathBuf>) -> Self {
        match db_path {
            Some(path) => info!(
                "event=app_start module=app status=ok db_path={}",
                path.display()
            ),
            None => info!("event=app_start module=app status=ok db_path=:memory:"),
        }
        Self { conn }
    }

    pub fn handler(&self) -> AppResult<ReviewRpcHandler<SqliteReviewRepository<'_>>> {
        let repo = SqliteReviewRepository::try_new(&self.conn)?;
        Ok(ReviewRpcHandler::from_repository(repo))
    }

    /// Closes the database connection.
    pub fn stop(self) -> AppResult<()> {
        info!("event=app_stop module=app status=start");
        match self.conn.close() {
            Ok(()) => {
                info!("event=app_stop module=app status=ok");
                Ok(())
            }
            Err((_, err)) => {
                error!("event=app_stop module=app status=error error={err}");
                Err(AppError::Close(err))
            }
        }
    }
}
