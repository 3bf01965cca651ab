//! Error type for `metasync-registry`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid registry host {host:?}: {reason}")]
  InvalidHost { host: String, reason: String },

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The registry answered with a non-success status.
  #[error("{method} {path} → {status}")]
  Status {
    method: &'static str,
    path:   String,
    status: StatusCode,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
