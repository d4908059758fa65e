//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors)
//! - `subscription` - Tenant subscription status, provider events and
//!   webhook verification

pub mod foundation;
pub mod subscription;
