//! Review domain model.
//!
//! # Responsibility
//! - Define the canonical review record and its query/update descriptors.
//! - Own field-level validation shared by create and update paths.
//!
//! # Invariants
//! - `rating` is within `MIN_RATING..=MAX_RATING`.
//! - `comment`, `user_id` and `movie_id` are non-empty.
//! - `is_deleted` is the source of truth for tombstone state.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque review identifier as seen above the repository boundary.
pub type ReviewId = String;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Canonical review record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Storage-assigned identifier. Empty until persisted.
    pub id: ReviewId,
    pub user_id: String,
    pub movie_id: String,
    /// Star rating, 1-5.
    pub rating: i32,
    pub comment: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
    /// Soft delete tombstone.
    pub is_deleted: bool,
}

/// Field-level validation failures for reviews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewValidationError {
    InvalidRating(i32),
    EmptyComment,
    /// Carries the name of the missing field.
    InvalidInput(&'static str),
}

impl Display for ReviewValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRating(value) => write!(
                f,
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {value}"
            ),
            Self::EmptyComment => write!(f, "comment cannot be empty"),
            Self::InvalidInput(field) => write!(f, "invalid input data: `{field}` is required"),
        }
    }
}

impl Error for ReviewValidationError {}

impl Review {
    /// Creates an unsaved review with empty id and zero timestamps.
    pub fn new(
        user_id: impl Into<String>,
        movie_id: impl Into<String>,
        rating: i32,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            id: ReviewId::new(),
            user_id: user_id.into(),
            movie_id: movie_id.into(),
            rating,
            comment: comment.into(),
            created_at: 0,
            updated_at: 0,
            is_deleted: false,
        }
    }

    /// Validates writable fields.
    ///
    /// Checks run in order rating, comment, ids; the first failure wins.
    pub fn validate(&self) -> Result<(), ReviewValidationError> {
        validate_rating(self.rating)?;
        validate_comment(&self.comment)?;
        if self.user_id.is_empty() {
            return Err(ReviewValidationError::InvalidInput("user_id"));
        }
        if self.movie_id.is_empty() {
            return Err(ReviewValidationError::InvalidInput("movie_id"));
        }
        Ok(())
    }

    /// Marks this review as softly deleted.
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Returns whether this review is visible to readers.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

pub fn validate_rating(rating: i32) -> Result<(), ReviewValidationError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ReviewValidationError::InvalidRating(rating));
    }
    Ok(())
}

pub fn validate_comment(comment: &str) -> Result<(), ReviewValidationError> {
    if comment.is_empty() {
        return Err(ReviewValidationError::EmptyComment);
    }
    Ok(())
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

/// Query descriptor for listing reviews.
///
/// Every present field narrows the result (logical AND). When either
/// `min_rating` or `max_rating` is set, the bounds form an inclusive range
/// and `rating` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    pub id: Option<ReviewId>,
    /// Empty means no constraint.
    pub ids: Vec<ReviewId>,
    pub user_id: Option<String>,
    pub movie_id: Option<String>,
    pub rating: Option<i32>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
}

impl ReviewFilter {
    pub fn by_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn by_movie(movie_id: impl Into<String>) -> Self {
        Self {
            movie_id: Some(movie_id.into()),
            ..Self::default()
        }
    }
}

/// Partial update descriptor. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewUpdateData {
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub is_deleted: Option<bool>,
}

impl ReviewUpdateData {
    pub fn with_rating(mut self, rating: i32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Update that only sets the tombstone.
    pub fn mark_deleted() -> Self {
        Self {
            is_deleted: Some(true),
            ..Self::default()
        }
    }

    /// Returns true when no field would change.
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.comment.is_none() && self.is_deleted.is_none()
    }
}
