//! In-process collaborators: a state store, a recording sink and a stdout
//! sink. Used by tests and by the binary's dry-run mode.

use std::{
  collections::{HashMap, HashSet},
  io::Write as _,
  sync::atomic::{AtomicBool, Ordering},
};

use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
  asset::Asset,
  sink::AssetSink,
  state::{StateStore, SyncState},
};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("state store unavailable")]
  Unavailable,

  #[error("asset {0} rejected")]
  Rejected(String),

  #[error("failed to write asset: {0}")]
  Io(#[from] std::io::Error),

  #[error("failed to encode asset: {0}")]
  Json(#[from] serde_json::Error),
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Keeps snapshots in a map. Can be switched to fail every call.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
  states:      Mutex<HashMap<String, SyncState>>,
  unavailable: AtomicBool,
}

impl MemoryStateStore {
  /// Make every subsequent call fail (or succeed again).
  pub fn set_unavailable(&self, unavailable: bool) {
    self.unavailable.store(unavailable, Ordering::SeqCst);
  }

  fn check(&self) -> Result<(), MemoryError> {
    if self.unavailable.load(Ordering::SeqCst) {
      Err(MemoryError::Unavailable)
    } else {
      Ok(())
    }
  }
}

impl StateStore for MemoryStateStore {
  type Error = MemoryError;

  async fn get_state(&self, connector_id: &str) -> Result<SyncState, MemoryError> {
    self.check()?;
    let states = self.states.lock().await;
    Ok(states.get(connector_id).cloned().unwrap_or_default())
  }

  async fn save_state(
    &self,
    connector_id: &str,
    state: &SyncState,
  ) -> Result<(), MemoryError> {
    self.check()?;
    self
      .states
      .lock()
      .await
      .insert(connector_id.to_owned(), state.clone());
    Ok(())
  }
}

// ─── Sinks ───────────────────────────────────────────────────────────────────

/// Records every asset it accepts, in push order.
#[derive(Debug, Default)]
pub struct CollectingSink {
  assets: Mutex<Vec<Asset>>,
  reject: HashSet<String>,
}

impl CollectingSink {
  /// A sink that fails for the given asset ids and accepts everything else.
  pub fn rejecting<I, S>(ids: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      assets: Mutex::default(),
      reject: ids.into_iter().map(Into::into).collect(),
    }
  }

  pub async fn assets(&self) -> Vec<Asset> { self.assets.lock().await.clone() }

  /// Drain the recorded assets.
  pub async fn take(&self) -> Vec<Asset> {
    std::mem::take(&mut *self.assets.lock().await)
  }
}

impl AssetSink for CollectingSink {
  type Error = MemoryError;

  async fn on_asset_updated(&self, asset: &Asset) -> Result<(), MemoryError> {
    if self.reject.contains(&asset.id) {
      return Err(MemoryError::Rejected(asset.id.clone()));
    }
    self.assets.lock().await.push(asset.clone());
    Ok(())
  }
}

/// Writes each asset as one line of JSON to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AssetSink for LogSink {
  type Error = MemoryError;

  async fn on_asset_updated(&self, asset: &Asset) -> Result<(), MemoryError> {
    let line = serde_json::to_string(asset)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")?;
    Ok(())
  }
}
