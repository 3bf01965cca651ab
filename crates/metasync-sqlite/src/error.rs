//! Error type for `metasync-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// The stored state for a connector is not a JSON object.
  #[error("state for connector {0:?} is not a JSON object")]
  MalformedState(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
