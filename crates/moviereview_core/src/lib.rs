//! Core domain logic for the movie review service.
//! This crate is the single source of truth for review invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::review::{
    Review, ReviewFilter, ReviewId, ReviewUpdateData, ReviewValidationError, MAX_RATING,
    MIN_RATING,
};
pub use repo::review_repo::{RepoError, RepoResult, ReviewRepository, SqliteReviewRepository};
pub use service::review_service::{ReviewService, ReviewServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
