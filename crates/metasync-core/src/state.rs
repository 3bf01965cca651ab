//! Persisted connector state and the store it lives in.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which the cursor is kept.
pub const LAST_UPDATED_AT: &str = "lastUpdatedAt";

/// An opaque key/value snapshot scoped to one connector id.
///
/// Only [`LAST_UPDATED_AT`] is meaningful to the synchronizer; other keys
/// written by other tools are carried through untouched on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncState(pub Map<String, Value>);

impl SyncState {
  /// A snapshot holding only the cursor.
  pub fn with_last_updated_at(millis: i64) -> Self {
    let mut map = Map::new();
    map.insert(LAST_UPDATED_AT.to_owned(), Value::from(millis));
    Self(map)
  }

  /// The cursor in epoch millis, `0` when absent or unreadable.
  ///
  /// Some registries echo numbers back as strings; both forms are accepted.
  pub fn last_updated_at(&self) -> i64 {
    match self.0.get(LAST_UPDATED_AT) {
      Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
      Some(Value::String(s)) => s.parse().unwrap_or(0),
      _ => 0,
    }
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

/// Abstraction over wherever connector state is persisted.
///
/// Saves replace the whole snapshot for a connector id (last writer wins).
pub trait StateStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the snapshot for `connector_id`; empty if never saved.
  fn get_state<'a>(
    &'a self,
    connector_id: &'a str,
  ) -> impl Future<Output = Result<SyncState, Self::Error>> + Send + 'a;

  fn save_state<'a>(
    &'a self,
    connector_id: &'a str,
    state: &'a SyncState,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

impl<T: StateStore> StateStore for std::sync::Arc<T> {
  type Error = T::Error;

  fn get_state<'a>(
    &'a self,
    connector_id: &'a str,
  ) -> impl Future<Output = Result<SyncState, Self::Error>> + Send + 'a {
    (**self).get_state(connector_id)
  }

  fn save_state<'a>(
    &'a self,
    connector_id: &'a str,
    state: &'a SyncState,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a {
    (**self).save_state(connector_id, state)
  }
}
