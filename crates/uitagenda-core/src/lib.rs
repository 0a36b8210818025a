//! Core types and trait definitions for the uitagenda event harvester.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store backend, the reconciliation engine, the source adapters and the
//! query API all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod event;
pub mod normalize;
pub mod query;
pub mod raw;
pub mod source;
pub mod store;

pub use error::{Error, Result};
