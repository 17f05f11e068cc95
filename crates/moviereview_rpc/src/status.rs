//! Wire-level status codes for review calls.
//!
//! # Invariants
//! - Every domain error maps to exactly one status code.
//! - `Internal` responses never carry storage error details.

use moviereview_core::ReviewServiceError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RpcResult<T> = Result<T, RpcStatus>;

/// Subset of remote procedure status codes produced by the review service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    Internal,
}

impl StatusCode {
    /// Numeric code as used on the wire.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::InvalidArgument => 3,
            Self::NotFound => 5,
            Self::AlreadyExists => 6,
            Self::Internal => 13,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::Internal => "internal",
        }
    }
}

/// Failed call outcome returned to remote callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcStatus {
    pub code: StatusCode,
    pub message: String,
}

impl RpcStatus {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Display for RpcStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl Error for RpcStatus {}

impl From<&ReviewServiceError> for RpcStatus {
    fn from(value: &ReviewServiceError) -> Self {
        match value {
            ReviewServiceError::NotFound(_) => Self::new(StatusCode::NotFound, "review not found"),
            ReviewServiceError::AlreadyExists => Self::new(
                StatusCode::AlreadyExists,
                "user has already reviewed this movie",
            ),
            ReviewServiceError::InvalidRating(_) => Self::new(
                StatusCode::InvalidArgument,
                "rating must be between 1 and 5",
            ),
            ReviewServiceError::EmptyComment => {
                Self::new(StatusCode::InvalidArgument, "comment cannot be empty")
            }
            ReviewServiceError::InvalidInput(_) => {
                Self::new(StatusCode::InvalidArgument, "invalid input data")
            }
            ReviewServiceError::Repo(_) => {
                Self::new(StatusCode::Internal, "internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RpcStatus, StatusCode};
    use moviereview_core::{RepoError, ReviewServiceError};

    #[test]
    fn domain_errors_map_to_expected_codes() {
        let cases = [
            (
                ReviewServiceError::NotFound("r1".to_string()),
                StatusCode::NotFound,
            ),
            (ReviewServiceError::AlreadyExists, StatusCode::AlreadyExists),
            (
                ReviewServiceError::InvalidRating(7),
                StatusCode::InvalidArgument,
            ),
            (ReviewServiceError::EmptyComment, StatusCode::InvalidArgument),
            (
                ReviewServiceError::InvalidInput("user_id"),
                StatusCode::InvalidArgument,
            ),
        ];

        for (err, code) in cases {
            assert_eq!(RpcStatus::from(&err).code, code, "{err}");
        }
    }

    #[test]
    fn storage_errors_become_opaque_internal_status() {
        let err = ReviewServiceError::Repo(RepoError::InvalidData(
            "secret table detail".to_string(),
        ));
        let status = RpcStatus::from(&err);
        assert_eq!(status.code, StatusCode::Internal);
        assert_eq!(status.code.as_i32(), 13);
        assert!(!status.message.contains("secret"));
    }
}
