//! Clinic Billing Sync - Stripe subscription status synchronizer
//!
//! Keeps each clinic tenant's subscription status in step with Stripe
//! webhook events, and answers the Access Gate from that same record.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
