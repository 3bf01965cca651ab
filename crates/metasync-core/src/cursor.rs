//! The incremental cursor: "last synchronized at", persisted per connector.

use crate::{
  Error, Result,
  state::{StateStore, SyncState},
};

pub struct Cursor<S> {
  store:        S,
  connector_id: String,
}

impl<S: StateStore> Cursor<S> {
  pub fn new(store: S, connector_id: impl Into<String>) -> Self {
    Self {
      store,
      connector_id: connector_id.into(),
    }
  }

  pub fn connector_id(&self) -> &str { &self.connector_id }

  pub fn store(&self) -> &S { &self.store }

  /// The last recorded pass time in epoch millis.
  ///
  /// Never fails: an unreachable store is logged and reads as `0`, so
  /// extraction proceeds as a fresh baseline.
  pub async fn read(&self) -> i64 {
    match self.store.get_state(&self.connector_id).await {
      Ok(state) => state.last_updated_at(),
      Err(e) => {
        tracing::warn!(
          connector_id = %self.connector_id,
          error = %e,
          "could not read sync state; starting from baseline"
        );
        0
      }
    }
  }

  /// Replace the stored snapshot with one holding only `millis`.
  pub async fn write(&self, millis: i64) -> Result<()> {
    let state = SyncState::with_last_updated_at(millis);
    self
      .store
      .save_state(&self.connector_id, &state)
      .await
      .map_err(Error::state_store)
  }
}
