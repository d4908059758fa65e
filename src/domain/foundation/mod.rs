//! Foundation module - Shared domain primitives.
//!
//! Identifiers and error types shared by every other domain module.

mod errors;
mod ids;

pub use errors::{DomainError, ErrorCode};
pub use ids::TenantId;
