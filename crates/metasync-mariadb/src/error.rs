//! Error type for `metasync-mariadb`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("timed out connecting to {host}:{port} after {timeout:?}")]
  ConnectTimeout {
    host:    String,
    port:    u16,
    timeout: Duration,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
