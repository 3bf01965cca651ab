//! HTTP client for the asset registry.
//!
//! [`RegistryClient`] is both the [`AssetSink`](metasync_core::sink::AssetSink)
//! that receives assets and the remote
//! [`StateStore`](metasync_core::state::StateStore) that keeps each
//! connector's cursor.

mod client;

pub mod error;

pub use client::{RegistryClient, RegistryConfig};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
