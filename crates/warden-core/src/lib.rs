//! Core types and trait definitions for the Warden application reviewer.
//!
//! This crate is deliberately free of chat-platform and database
//! dependencies. Every other crate depends on it; it depends on nothing
//! proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod application;
pub mod error;
pub mod platform;
pub mod store;
pub mod submission;
pub mod tally;

pub use error::{Error, Result};
