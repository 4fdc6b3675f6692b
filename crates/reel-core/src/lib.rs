//! Core types and trait definitions for the Reel movie catalogue.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The aggregate ([`movie::Movie`]) owns every business rule; storage
//! backends implement the traits in [`store`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod filter;
pub mod movie;
pub mod rating;
pub mod store;
pub mod validation;

pub use error::{Error, Result};

use chrono::{DateTime, SubsecRound as _, Utc};

/// The current time, truncated to the microsecond precision every stored
/// timestamp carries.
pub(crate) fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }
