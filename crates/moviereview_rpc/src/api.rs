//! Review remote procedure handlers.
//!
//! # Responsibility
//! - Map each typed request to exactly one review service call.
//! - Translate domain failures into `RpcStatus` values.
//!
//! # Invariants
//! - Handlers never panic; every failure becomes an `RpcStatus`.
//! - Failures are logged with the operation name before being returned.

use crate::dto::{
    AverageRatingResponse, CreateRequest, DeleteRequest, GetAllRequest, GetAverageRatingRequest,
    GetByMovieRequest, GetByUserRequest, GetRequest, ReviewListResponse, ReviewMessage,
    ReviewResponse, UpdateRequest,
};
use crate::status::{RpcResult, RpcStatus};
use log::error;
use moviereview_core::{ReviewRepository, ReviewService, ReviewServiceError};

/// Dispatcher for the review service procedures.
pub struct ReviewRpcHandler<R: ReviewRepository> {
    service: ReviewService<R>,
}

impl<R: ReviewRepository> ReviewRpcHandler<R> {
    pub fn new(service: ReviewService<R>) -> Self {
        Self { service }
    }

    /// Builds the service over `repo` and wraps it.
    pub fn from_repository(repo: R) -> Self {
        Self::new(ReviewService::new(repo))
    }

    pub fn create(&self, request: CreateRequest) -> RpcResult<ReviewResponse> {
        self.service
            .create(request.into_review())
            .map(review_response)
            .map_err(|err| failure("create", &err))
    }

    pub fn get(&self, request: GetRequest) -> RpcResult<ReviewResponse> {
        self.service
            .get_by_id(&request.id)
            .map(review_response)
            .map_err(|err| failure("get", &err))
    }

    pub fn get_all(&self, _request: GetAllRequest) -> RpcResult<ReviewListResponse> {
        self.service
            .get_all()
            .map(ReviewListResponse::from_reviews)
            .map_err(|err| failure("get_all", &err))
    }

    pub fn get_by_user(&self, request: GetByUserRequest) -> RpcResult<ReviewListResponse> {
        self.service
            .get_by_user_id(&request.user_id)
            .map(ReviewListResponse::from_reviews)
            .map_err(|err| failure("get_by_user", &err))
    }

    pub fn get_by_movie(&self, request: GetByMovieRequest) -> RpcResult<ReviewListResponse> {
        self.service
            .get_by_movie_id(&request.movie_id)
            .map(ReviewListResponse::from_reviews)
            .map_err(|err| failure("get_by_movie", &err))
    }

    pub fn update(&self, request: UpdateRequest) -> RpcResult<ReviewResponse> {
        let (id, update) = request.into_parts();
        self.service
            .update_by_id(&id, &update)
            .map(review_response)
            .map_err(|err| failure("update", &err))
    }

    pub fn delete(&self, request: DeleteRequest) -> RpcResult<ReviewResponse> {
        self.service
            .delete_by_id(&request.id)
            .map(review_response)
            .map_err(|err| failure("delete", &err))
    }

    pub fn get_average_rating(
        &self,
        request: GetAverageRatingRequest,
    ) -> RpcResult<AverageRatingResponse> {
        let average_rating = self
            .service
            .get_movie_average_rating(&request.movie_id)
            .map_err(|err| failure("get_average_rating", &err))?;
        Ok(AverageRatingResponse {
            movie_id: request.movie_id,
            average_rating,
        })
    }
}

fn review_response(review: moviereview_core::Review) -> ReviewResponse {
    ReviewResponse {
        review: ReviewMessage::from(review),
    }
}

fn failure(operation: &'static str, err: &ReviewServiceError) -> RpcStatus {
    let status = RpcStatus::from(err);
    error!(
        "event=rpc_call module=rpc status=error operation={operation} code={} error={err}",
        status.code.as_str()
    );
    status
}
