//! Concrete catalogs, state stores and sinks, chosen at startup from
//! [`Settings`].
//!
//! Enums rather than trait objects: the core traits use `async fn`, which is
//! not object safe.

use anyhow::{Context as _, bail};
use metasync_core::{
  asset::Asset,
  catalog::{CatalogReader, CatalogSession, ColumnRow, ObjectKind, TableRow},
  config::{CatalogDriver, ConnectionConfig},
  memory::{LogSink, MemoryError, MemoryStateStore},
  sink::AssetSink,
  state::{StateStore, SyncState},
};
use metasync_mariadb::{MariaDbCatalog, MariaDbSession};
use metasync_registry::RegistryClient;
use metasync_sqlite::{SqliteCatalog, SqliteSession, SqliteStateStore};
use thiserror::Error;

use crate::{Settings, StateKind};

#[derive(Debug, Error)]
pub enum BackendError {
  #[error(transparent)]
  Registry(#[from] metasync_registry::Error),
  #[error(transparent)]
  Sqlite(#[from] metasync_sqlite::Error),
  #[error(transparent)]
  MariaDb(#[from] metasync_mariadb::Error),
  #[error(transparent)]
  Memory(#[from] MemoryError),
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

pub enum CatalogBackend {
  MariaDb(MariaDbCatalog),
  Sqlite(SqliteCatalog),
}

impl CatalogBackend {
  /// The adapter named by `connection.driver`.
  pub fn from_connection(connection: &ConnectionConfig) -> Self {
    match connection.driver {
      CatalogDriver::MariaDb => Self::MariaDb(MariaDbCatalog::new(connection)),
      CatalogDriver::Sqlite => Self::Sqlite(SqliteCatalog::new(connection.file_path())),
    }
  }
}

impl CatalogReader for CatalogBackend {
  type Error = BackendError;
  type Session = SessionBackend;

  fn source(&self) -> &str {
    match self {
      Self::MariaDb(c) => c.source(),
      Self::Sqlite(c) => c.source(),
    }
  }

  async fn open(&self) -> Result<SessionBackend, BackendError> {
    Ok(match self {
      Self::MariaDb(c) => SessionBackend::MariaDb(c.open().await?),
      Self::Sqlite(c) => SessionBackend::Sqlite(c.open().await?),
    })
  }
}

pub enum SessionBackend {
  MariaDb(MariaDbSession),
  Sqlite(SqliteSession),
}

impl CatalogSession for SessionBackend {
  type Error = BackendError;

  async fn schema(&self, database: &str) -> Result<Option<String>, BackendError> {
    Ok(match self {
      Self::MariaDb(s) => s.schema(database).await?,
      Self::Sqlite(s) => s.schema(database).await?,
    })
  }

  async fn list_tables(
    &self,
    database: &str,
    kind: ObjectKind,
  ) -> Result<Vec<TableRow>, BackendError> {
    Ok(match self {
      Self::MariaDb(s) => s.list_tables(database, kind).await?,
      Self::Sqlite(s) => s.list_tables(database, kind).await?,
    })
  }

  async fn list_columns(
    &self,
    database: &str,
    table: &str,
  ) -> Result<Vec<ColumnRow>, BackendError> {
    Ok(match self {
      Self::MariaDb(s) => s.list_columns(database, table).await?,
      Self::Sqlite(s) => s.list_columns(database, table).await?,
    })
  }
}

// ─── State ───────────────────────────────────────────────────────────────────

pub enum StateBackend {
  Registry(RegistryClient),
  Sqlite(SqliteStateStore),
  Memory(MemoryStateStore),
}

impl StateStore for StateBackend {
  type Error = BackendError;

  async fn get_state(&self, connector_id: &str) -> Result<SyncState, BackendError> {
    Ok(match self {
      Self::Registry(c) => c.get_state(connector_id).await?,
      Self::Sqlite(s) => s.get_state(connector_id).await?,
      Self::Memory(m) => m.get_state(connector_id).await?,
    })
  }

  async fn save_state(
    &self,
    connector_id: &str,
    state: &SyncState,
  ) -> Result<(), BackendError> {
    match self {
      Self::Registry(c) => c.save_state(connector_id, state).await?,
      Self::Sqlite(s) => s.save_state(connector_id, state).await?,
      Self::Memory(m) => m.save_state(connector_id, state).await?,
    }
    Ok(())
  }
}

// ─── Sink ────────────────────────────────────────────────────────────────────

pub enum SinkBackend {
  Registry(RegistryClient),
  /// Print assets instead of pushing them.
  Log(LogSink),
}

impl AssetSink for SinkBackend {
  type Error = BackendError;

  async fn on_asset_updated(&self, asset: &Asset) -> Result<(), BackendError> {
    match self {
      Self::Registry(c) => c.on_asset_updated(asset).await?,
      Self::Log(l) => l.on_asset_updated(asset).await?,
    }
    Ok(())
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

impl Settings {
  /// Build the state store and sink. A dry run keeps state in memory and
  /// prints assets, so it never touches the registry or the state file.
  pub async fn backends(&self, dry_run: bool) -> anyhow::Result<(StateBackend, SinkBackend)> {
    if dry_run {
      return Ok((
        StateBackend::Memory(MemoryStateStore::default()),
        SinkBackend::Log(LogSink),
      ));
    }

    let Some(registry) = &self.registry else {
      bail!("registry.host is required unless --dry-run is given");
    };
    let client = RegistryClient::new(registry.clone())
      .context("failed to build registry client")?;

    let state = match self.state.backend {
      StateKind::Registry => StateBackend::Registry(client.clone()),
      StateKind::Sqlite => {
        let path = self.state.file_path();
        let store = SqliteStateStore::open(&path)
          .await
          .with_context(|| format!("failed to open state store at {path:?}"))?;
        StateBackend::Sqlite(store)
      }
    };

    Ok((state, SinkBackend::Registry(client)))
  }
}
