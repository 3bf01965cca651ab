//! Tests for `RegistryClient` against an in-process mock registry.

use std::{collections::HashMap, sync::Arc};

use axum::{
  Json, Router,
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  routing::{get, put},
};
use metasync_core::{
  catalog::{ObjectKind, TableRow},
  cursor::Cursor,
  mapper::AssetMapper,
  sink::AssetSink,
  state::{StateStore, SyncState},
};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{Error, RegistryClient, RegistryConfig};

const API_KEY: &str = "test-key";

#[derive(Default)]
struct MockRegistry {
  assets: Mutex<HashMap<String, Value>>,
  states: Mutex<HashMap<String, Value>>,
  puts:   Mutex<usize>,
}

type Shared = Arc<MockRegistry>;

fn authorized(headers: &HeaderMap) -> Result<(), StatusCode> {
  match headers.get("x-api-key") {
    Some(v) if v == API_KEY => Ok(()),
    _ => Err(StatusCode::UNAUTHORIZED),
  }
}

async fn put_asset(
  State(reg): State<Shared>,
  Path(id): Path<String>,
  headers: HeaderMap,
  Json(body): Json<Value>,
) -> Result<StatusCode, StatusCode> {
  authorized(&headers)?;
  if body["id"] != id.as_str() {
    return Err(StatusCode::BAD_REQUEST);
  }
  *reg.puts.lock().await += 1;
  reg.assets.lock().await.insert(id, body);
  Ok(StatusCode::NO_CONTENT)
}

async fn get_state(
  State(reg): State<Shared>,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
  authorized(&headers)?;
  reg
    .states
    .lock()
    .await
    .get(&id)
    .cloned()
    .map(Json)
    .ok_or(StatusCode::NOT_FOUND)
}

async fn put_state(
  State(reg): State<Shared>,
  Path(id): Path<String>,
  headers: HeaderMap,
  Json(body): Json<Value>,
) -> Result<StatusCode, StatusCode> {
  authorized(&headers)?;
  reg.states.lock().await.insert(id, body);
  Ok(StatusCode::NO_CONTENT)
}

/// Serve the mock registry on an ephemeral port; returns its base URL.
async fn serve(reg: Shared) -> String {
  let app = Router::new()
    .route("/api/assets/{id}", put(put_asset))
    .route("/api/connectors/{id}/state", get(get_state).put(put_state))
    .with_state(reg);
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  format!("http://{addr}")
}

fn client(host: String, api_key: &str) -> RegistryClient {
  RegistryClient::new(RegistryConfig {
    host,
    api_key: api_key.into(),
  })
  .unwrap()
}

fn table_asset(name: &str) -> metasync_core::asset::Asset {
  let row = TableRow {
    name:    name.into(),
    kind:    "TABLE".into(),
    remarks: Some("remark".into()),
  };
  AssetMapper::new("shop", "db.internal", "mariadb").relation_asset(
    ObjectKind::Table,
    &row,
    &[],
    1_700_000_000_000,
  )
}

// ─── Assets ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pushes_asset_as_json_under_its_id() {
  let reg = Shared::default();
  let c = client(serve(reg.clone()).await, API_KEY);

  c.on_asset_updated(&table_asset("orders")).await.unwrap();

  let assets = reg.assets.lock().await;
  let body = &assets["shop.TABLE.orders"];
  assert_eq!(body["info"]["qualifiedName"], "shop.orders");
  assert_eq!(body["info"]["type"], "mariadb_table");
  assert_eq!(body["info"]["description"], "remark");
  assert_eq!(body["properties"]["updatedAt"], "1700000000000");
}

#[tokio::test]
async fn repeated_push_is_an_upsert() {
  let reg = Shared::default();
  let c = client(serve(reg.clone()).await, API_KEY);

  let asset = table_asset("orders");
  c.put_asset(&asset).await.unwrap();
  c.put_asset(&asset).await.unwrap();

  assert_eq!(*reg.puts.lock().await, 2);
  assert_eq!(reg.assets.lock().await.len(), 1);
}

#[tokio::test]
async fn ids_are_percent_encoded() {
  let reg = Shared::default();
  let c = client(serve(reg.clone()).await, API_KEY);

  c.put_asset(&table_asset("order items")).await.unwrap();
  assert!(reg.assets.lock().await.contains_key("shop.TABLE.order items"));
}

#[tokio::test]
async fn rejected_request_reports_status() {
  let reg = Shared::default();
  let c = client(serve(reg.clone()).await, "wrong-key");

  let err = c.put_asset(&table_asset("orders")).await.unwrap_err();
  match err {
    Error::Status { method, path, status } => {
      assert_eq!(method, "PUT");
      assert_eq!(path, "/api/assets/shop.TABLE.orders");
      assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
    }
    other => panic!("unexpected error: {other}"),
  }
  assert!(reg.assets.lock().await.is_empty());
}

// ─── State ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_state_is_empty() {
  let c = client(serve(Shared::default()).await, API_KEY);
  let state = c.get_state("never-saved").await.unwrap();
  assert!(state.is_empty());
}

#[tokio::test]
async fn state_round_trips_through_registry() {
  let reg = Shared::default();
  let c = client(serve(reg.clone()).await, API_KEY);

  c.save_state("c1", &SyncState::with_last_updated_at(42))
    .await
    .unwrap();

  assert_eq!(
    reg.states.lock().await["c1"],
    json!({ "lastUpdatedAt": 42 })
  );
  assert_eq!(c.get_state("c1").await.unwrap().last_updated_at(), 42);
}

#[tokio::test]
async fn cursor_over_registry_state() {
  let c = client(serve(Shared::default()).await, API_KEY);
  let cursor = Cursor::new(c, "shop-sync");

  assert_eq!(cursor.read().await, 0);
  cursor.write(1234).await.unwrap();
  assert_eq!(cursor.read().await, 1234);
}

#[tokio::test]
async fn unreachable_registry_reads_as_baseline() {
  // Bind and drop to get a port nothing listens on.
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);

  let cursor = Cursor::new(client(format!("http://{addr}"), API_KEY), "c1");
  assert_eq!(cursor.read().await, 0);
  assert!(cursor.write(1).await.is_err());
}

// ─── Construction ────────────────────────────────────────────────────────────

#[test]
fn rejects_unparseable_host() {
  let err = RegistryClient::new(RegistryConfig {
    host:    "not a url".into(),
    api_key: String::new(),
  })
  .err()
  .expect("invalid host");
  assert!(matches!(err, Error::InvalidHost { .. }));
}
