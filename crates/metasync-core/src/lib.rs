//! Core of the metadata synchronizer: the asset model, the collaborator
//! traits, and the pass and loop that move catalog metadata into a registry.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Concrete catalogs, state stores and sinks live in the other crates.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod asset;
pub mod catalog;
pub mod config;
pub mod cursor;
pub mod error;
pub mod mapper;
pub mod memory;
pub mod pass;
pub mod sink;
pub mod state;
pub mod synchronizer;

#[cfg(test)]
mod fixtures;

pub use error::{BoxError, Error, Result};
