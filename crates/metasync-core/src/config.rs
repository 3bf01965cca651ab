//! Connector configuration.
//!
//! Deserialised by the binary from `config.toml` and the environment;
//! [`ConnectorConfig::validate`] must pass before a synchronizer is built.

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::{Error, Result};

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Which catalog adapter reads the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogDriver {
  /// A MariaDB or MySQL server, introspected through `information_schema`.
  #[default]
  MariaDb,
  /// A local SQLite file at [`ConnectionConfig::path`].
  Sqlite,
}

/// Where the catalog lives and how to log in to it.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
  #[serde(default)]
  pub driver:   CatalogDriver,
  pub host:     String,
  pub port:     u16,
  pub database: String,
  pub username: String,
  #[serde(default)]
  pub password: String,
  /// Database file for file-backed catalog drivers.
  #[serde(default)]
  pub path:     Option<PathBuf>,
}

impl ConnectionConfig {
  /// The catalog file, defaulting to `{database}.db`.
  pub fn file_path(&self) -> PathBuf {
    self
      .path
      .clone()
      .unwrap_or_else(|| PathBuf::from(format!("{}.db", self.database)))
  }
}

/// Settings for the asset synchronizer itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetsConfig {
  #[serde(default)]
  pub enabled:       bool,
  /// Scopes the remote state; one cursor per connector id.
  #[serde(default)]
  pub connector_id:  String,
  #[serde(default, with = "humantime_serde")]
  pub poll_interval: Option<Duration>,
  /// Run the first pass immediately instead of after one interval.
  #[serde(default)]
  pub run_on_start:  bool,
}

impl AssetsConfig {
  pub fn delay(&self) -> Duration {
    self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorConfig {
  pub connection: ConnectionConfig,
  #[serde(default)]
  pub assets:     AssetsConfig,
}

impl ConnectorConfig {
  /// Reject configurations the synchronizer must not start with.
  pub fn validate(&self) -> Result<()> {
    let conn = &self.connection;
    let mut missing = Vec::new();
    if conn.host.trim().is_empty() {
      missing.push("connection.host");
    }
    if conn.port == 0 {
      missing.push("connection.port");
    }
    if conn.database.trim().is_empty() {
      missing.push("connection.database");
    }
    if conn.username.trim().is_empty() {
      missing.push("connection.username");
    }
    if self.assets.enabled && self.assets.connector_id.trim().is_empty() {
      missing.push("assets.connector_id");
    }
    if let Some(interval) = self.assets.poll_interval
      && interval.is_zero()
    {
      return Err(Error::Configuration(
        "assets.poll_interval must be greater than zero".into(),
      ));
    }

    if missing.is_empty() {
      Ok(())
    } else {
      Err(Error::Configuration(format!(
        "missing required settings: {}",
        missing.join(", ")
      )))
    }
  }
}
