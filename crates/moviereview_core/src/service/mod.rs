//! Core use-case services.
//!
//! # Responsibility
//! - Enforce review business rules on top of repository calls.
//! - Keep transport layers decoupled from storage details.

pub mod review_service;
