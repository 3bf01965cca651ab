//! Wiring for the `metasync` binary: settings, the startup gate, and the
//! concrete catalog, state store and sink selected by them.

pub mod backend;

use std::path::{Path, PathBuf};

use metasync_core::config::{AssetsConfig, ConnectionConfig, ConnectorConfig};
use metasync_registry::RegistryConfig;
use serde::Deserialize;

pub use backend::{
  BackendError, CatalogBackend, SessionBackend, SinkBackend, StateBackend,
};

/// Environment variable prefix, e.g. `METASYNC_CONNECTION__HOST`.
pub const ENV_PREFIX: &str = "METASYNC";

/// Local state file used when none is configured.
pub const DEFAULT_STATE_PATH: &str = "metasync-state.db";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Where connector state is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
  /// In the registry, next to the assets.
  #[default]
  Registry,
  /// In a local SQLite file.
  Sqlite,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateConfig {
  #[serde(default)]
  pub backend: StateKind,
  #[serde(default)]
  pub path:    Option<PathBuf>,
}

impl StateConfig {
  pub fn file_path(&self) -> PathBuf {
    self
      .path
      .clone()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH))
  }
}

/// Everything the binary reads from `config.toml` and the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub connection: ConnectionConfig,
  #[serde(default)]
  pub assets:     AssetsConfig,
  #[serde(default)]
  pub registry:   Option<RegistryConfig>,
  #[serde(default)]
  pub state:      StateConfig,
}

impl Settings {
  /// Layer the optional TOML file at `path` under `METASYNC_*` variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix(ENV_PREFIX)
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn connector(&self) -> ConnectorConfig {
    ConnectorConfig {
      connection: self.connection.clone(),
      assets:     self.assets.clone(),
    }
  }

  /// Decide whether the synchronizer may start. A disabled connector is
  /// never validated; an enabled one must pass
  /// [`ConnectorConfig::validate`].
  pub fn startup(&self) -> metasync_core::Result<Startup> {
    let connector = self.connector();
    if !connector.assets.enabled {
      return Ok(Startup::Disabled);
    }
    connector.validate()?;
    Ok(Startup::Enabled(connector))
  }
}

/// Outcome of [`Settings::startup`].
#[derive(Debug)]
pub enum Startup {
  /// `assets.enabled = false`: exit without starting the loop.
  Disabled,
  Enabled(ConnectorConfig),
}
