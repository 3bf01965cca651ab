//! SQLite adapters for the metadata synchronizer.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Provides a [`SqliteCatalog`] that
//! introspects a SQLite database file and a [`SqliteStateStore`] that keeps
//! connector state locally.

mod catalog;
mod encode;
mod schema;
mod state;

pub mod error;

pub use catalog::{SOURCE, SqliteCatalog, SqliteSession};
pub use error::{Error, Result};
pub use state::SqliteStateStore;
