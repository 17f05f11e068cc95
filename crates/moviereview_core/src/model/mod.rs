//! Domain model for movie reviews.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation rules next to the data they guard.
//!
//! # Invariants
//! - Every persisted review is identified by a stable `ReviewId`.
//! - Deletion is represented by soft-delete tombstones, not hard delete.

pub mod review;
