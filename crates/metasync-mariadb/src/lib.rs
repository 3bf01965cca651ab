//! MariaDB catalog adapter for the metadata synchronizer.
//!
//! Introspects a MariaDB (or MySQL) server through `information_schema`
//! over a [`sqlx`] connection opened fresh for every pass.

mod catalog;
mod encode;

pub mod error;

pub use catalog::{DEFAULT_CONNECT_TIMEOUT, MariaDbCatalog, MariaDbSession, SOURCE};
pub use error::{Error, Result};
