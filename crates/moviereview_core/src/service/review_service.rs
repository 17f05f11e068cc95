//! Review use-case service.
//!
//! # Responsibility
//! - Enforce review invariants before any storage write.
//! - Apply soft-delete visibility to every read path.
//! - Orchestrate repository calls into the inbound review contract.
//!
//! # Invariants
//! - Validation failures never reach the repository.
//! - Deleted reviews are reported as `NotFound` by every read and write.
//! - At most one active review per `(user_id, movie_id)`; the storage-level
//!   unique index backs the non-atomic check performed here.

use crate::model::review::{
    now_epoch_ms, validate_comment, validate_rating, Review, ReviewFilter, ReviewId,
    ReviewUpdateData, ReviewValidationError,
};
use crate::repo::review_repo::{RepoError, ReviewRepository};
use log::{debug, error};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ReviewServiceError>;

/// Service error for review use-cases.
#[derive(Debug)]
pub enum ReviewServiceError {
    /// Review is missing or soft-deleted.
    NotFound(ReviewId),
    /// User already has an active review for this movie.
    AlreadyExists,
    InvalidRating(i32),
    EmptyComment,
    /// Required field is empty.
    InvalidInput(&'static str),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ReviewServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "review not found: {id}"),
            Self::AlreadyExists => write!(f, "user has already reviewed this movie"),
            Self::InvalidRating(value) => {
                write!(f, "rating must be between 1 and 5, got {value}")
            }
            Self::EmptyComment => write!(f, "comment cannot be empty"),
            Self::InvalidInput(field) => write!(f, "invalid input data: `{field}` is required"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReviewServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ReviewServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::AlreadyExists => Self::AlreadyExists,
            other => Self::Repo(other),
        }
    }
}

impl From<ReviewValidationError> for ReviewServiceError {
    fn from(value: ReviewValidationError) -> Self {
        match value {
            ReviewValidationError::InvalidRating(rating) => Self::InvalidRating(rating),
            ReviewValidationError::EmptyComment => Self::EmptyComment,
            ReviewValidationError::InvalidInput(field) => Self::InvalidInput(field),
        }
    }
}

/// Review service facade over repository implementations.
pub struct ReviewService<R: ReviewRepository> {
    repo: R,
}

impl<R: ReviewRepository> ReviewService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and persists a new review.
    ///
    /// # Contract
    /// - Invalid input fails without touching storage.
    /// - An active review for the same pair fails with `AlreadyExists`.
    /// - Returned review carries the storage-assigned id.
    pub fn create(&self, mut review: Review) -> ServiceResult<Review> {
        review.validate()?;

        if self
            .repo
            .check_user_review_exists(&review.user_id, &review.movie_id)?
        {
            return Err(ReviewServiceError::AlreadyExists);
        }

        let now = now_epoch_ms();
        review.created_at = now;
        review.updated_at = now;
        review.is_deleted = false;

        let created = self.repo.create(&review).map_err(|err| {
            log_failure("review_create", None, &err);
            err
        })?;
        debug!(
            "event=review_create module=service status=ok review_id={}",
            created.id
        );
        Ok(created)
    }

    /// Gets one active review by id.
    pub fn get_by_id(&self, id: &str) -> ServiceResult<Review> {
        self.load_active(id)
    }

    /// Lists all active reviews, newest first.
    pub fn get_all(&self) -> ServiceResult<Vec<Review>> {
        self.find_active(&ReviewFilter::default())
    }

    /// Lists active reviews written by `user_id`, newest first.
    pub fn get_by_user_id(&self, user_id: &str) -> ServiceResult<Vec<Review>> {
        self.find_active(&ReviewFilter::by_user(user_id))
    }

    /// Lists active reviews for `movie_id`, newest first.
    pub fn get_by_movie_id(&self, movie_id: &str) -> ServiceResult<Vec<Review>> {
        self.find_active(&ReviewFilter::by_movie(movie_id))
    }

    /// Applies a partial update to an active review.
    ///
    /// # Contract
    /// - Missing or deleted review fails with `NotFound`.
    /// - Present `rating`/`comment` are validated before any write.
    /// - Returns the review as stored after the write.
    pub fn update_by_id(&self, id: &str, update: &ReviewUpdateData) -> ServiceResult<Review> {
        self.load_active(id)?;

        if let Some(rating) = update.rating {
            validate_rating(rating)?;
        }
        if let Some(comment) = update.comment.as_deref() {
            validate_comment(comment)?;
        }

        let updated = self.repo.update(id, update).map_err(|err| {
            log_failure("review_update", Some(id), &err);
            err
        })?;
        debug!("event=review_update module=service status=ok review_id={id}");
        Ok(updated)
    }

    /// Soft-deletes an active review.
    ///
    /// Deleting an already deleted review reports `NotFound`.
    pub fn delete_by_id(&self, id: &str) -> ServiceResult<Review> {
        self.load_active(id)?;

        let deleted = self
            .repo
            .update(id, &ReviewUpdateData::mark_deleted())
            .map_err(|err| {
                log_failure("review_delete", Some(id), &err);
                err
            })?;
        debug!("event=review_delete module=service status=ok review_id={id}");
        Ok(deleted)
    }

    /// Mean rating of active reviews for `movie_id`; `0.0` when none.
    pub fn get_movie_average_rating(&self, movie_id: &str) -> ServiceResult<f64> {
        Ok(self.repo.get_average_rating(movie_id)?)
    }

    fn load_active(&self, id: &str) -> ServiceResult<Review> {
        let review = self.repo.find_by_id(id)?;
        if review.is_deleted {
            return Err(ReviewServiceError::NotFound(id.to_string()));
        }
        Ok(review)
    }

    fn find_active(&self, filter: &ReviewFilter) -> ServiceResult<Vec<Review>> {
        let reviews = self.repo.find(filter)?;
        Ok(retain_active(reviews))
    }
}

fn retain_active(mut reviews: Vec<Review>) -> Vec<Review> {
    reviews.retain(Review::is_active);
    reviews
}

fn log_failure(event: &str, review_id: Option<&str>, err: &RepoError) {
    error!(
        "event={event} module=service status=error review_id={} error={err}",
        review_id.unwrap_or("-")
    );
}
