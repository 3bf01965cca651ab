//! [`SqliteStateStore`] — connector state kept in a local SQLite file.

use std::path::Path;

use chrono::Utc;
use metasync_core::state::{StateStore, SyncState};
use rusqlite::OptionalExtension as _;
use serde_json::Value;

use crate::{Error, Result, encode::encode_dt, schema::SCHEMA};

/// A [`StateStore`] backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStateStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStateStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl StateStore for SqliteStateStore {
  type Error = Error;

  async fn get_state(&self, connector_id: &str) -> Result<SyncState> {
    let id = connector_id.to_owned();
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT state_json FROM connector_state WHERE connector_id = ?1",
            rusqlite::params![id],
            |r| r.get(0),
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    let Some(raw) = raw else {
      return Ok(SyncState::default());
    };
    match serde_json::from_str::<Value>(&raw)? {
      Value::Object(map) => Ok(SyncState(map)),
      _ => Err(Error::MalformedState(connector_id.to_owned())),
    }
  }

  async fn save_state(&self, connector_id: &str, state: &SyncState) -> Result<()> {
    let id = connector_id.to_owned();
    let json = serde_json::to_string(state)?;
    let at = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO connector_state (connector_id, state_json, updated_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (connector_id) DO UPDATE
             SET state_json = excluded.state_json,
                 updated_at = excluded.updated_at",
          rusqlite::params![id, json, at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
