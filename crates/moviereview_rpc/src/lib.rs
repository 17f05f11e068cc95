//! Transport adapter for the movie review service.
//!
//! # Responsibility
//! - Expose typed request/response envelopes for every review procedure.
//! - Map review domain failures to wire status codes.
//! - Keep transport concerns out of `moviereview_core`.

pub mod api;
pub mod dto;
pub mod status;

pub use api::ReviewRpcHandler;
pub use dto::{
    AverageRatingResponse, CreateRequest, DeleteRequest, GetAllRequest, GetAverageRatingRequest,
    GetByMovieRequest, GetByUserRequest, GetRequest, ReviewListResponse, ReviewMessage,
    ReviewResponse, UpdateRequest,
};
pub use status::{RpcResult, RpcStatus, StatusCode};
