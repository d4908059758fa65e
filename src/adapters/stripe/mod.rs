//! Stripe payment provider adapter.
//!
//! Implements the `SubscriptionLookup` port against the Stripe REST API.
//! Webhook signature verification lives in the domain layer.
//!
//! # Security
//!
//! - The API key is held as `secrecy::SecretString` and only exposed for
//!   the basic-auth header

mod subscription_lookup;

pub use subscription_lookup::{
    DisabledSubscriptionLookup, StripeLookupConfig, StripeSubscriptionLookup,
};
