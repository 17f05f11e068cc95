//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage-agnostic review data access contract.
//! - Isolate SQLite query and key-encoding details from the service layer.
//!
//! # Invariants
//! - Only this layer touches the `reviews` table.
//! - Repository APIs return semantic errors (`NotFound`, `AlreadyExists`) in
//!   addition to DB transport errors.

mod object_id;
pub mod review_repo;
