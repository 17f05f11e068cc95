//! Request/response envelopes for the review remote procedures.
//!
//! Shapes mirror the wire messages one-to-one; conversion to and from core
//! types lives here so the handler stays a thin dispatcher.

use moviereview_core::{Review, ReviewUpdateData};
use serde::{Deserialize, Serialize};

/// Wire representation of one review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewMessage {
    pub id: String,
    pub user_id: String,
    pub movie_id: String,
    pub rating: i32,
    pub comment: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
    pub is_deleted: bool,
}

impl From<Review> for ReviewMessage {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            movie_id: review.movie_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            updated_at: review.updated_at,
            is_deleted: review.is_deleted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    pub user_id: String,
    pub movie_id: String,
    pub rating: i32,
    pub comment: String,
}

impl CreateRequest {
    /// New review candidate. The id stays empty so storage assigns one.
    pub fn into_review(self) -> Review {
        Review::new(self.user_id, self.movie_id, self.rating, self.comment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAllRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetByUserRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetByMovieRequest {
    pub movie_id: String,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub id: String,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_deleted: Option<bool>,
}

impl UpdateRequest {
    pub fn into_parts(self) -> (String, ReviewUpdateData) {
        let update = ReviewUpdateData {
            rating: self.rating,
            comment: self.comment,
            is_deleted: self.is_deleted,
        };
        (self.id, update)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAverageRatingRequest {
    pub movie_id: String,
}

/// Response carrying a single review (create/get/update/delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub review: ReviewMessage,
}

/// Response carrying a review list, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewMessage>,
}

impl ReviewListResponse {
    pub fn from_reviews(reviews: Vec<Review>) -> Self {
        Self {
            reviews: reviews.into_iter().map(ReviewMessage::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageRatingResponse {
    pub movie_id: String,
    pub average_rating: f64,
}
