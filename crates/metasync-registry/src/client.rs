//! Async HTTP client wrapping the registry's JSON API.

use std::time::Duration;

use metasync_core::{
  asset::Asset,
  sink::AssetSink,
  state::{StateStore, SyncState},
};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;

use crate::{Error, Result};

/// Connection settings for the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
  /// Base URL, e.g. `https://registry.example.com`.
  pub host:    String,
  #[serde(default)]
  pub api_key: String,
}

/// Async HTTP client for the registry REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RegistryClient {
  client:  Client,
  base:    Url,
  api_key: String,
}

impl RegistryClient {
  pub fn new(config: RegistryConfig) -> Result<Self> {
    let invalid = |reason: String| Error::InvalidHost {
      host: config.host.clone(),
      reason,
    };
    let base = Url::parse(&config.host).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
      return Err(invalid("not a base URL".into()));
    }

    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      base,
      api_key: config.api_key,
    })
  }

  /// `{base}/api/{segments...}`, each segment percent-encoded.
  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().push("api").extend(segments);
    }
    url
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.api_key.is_empty() {
      req
    } else {
      req.header("x-api-key", &self.api_key)
    }
  }

  fn check(method: &'static str, url: &Url, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      Ok(resp)
    } else {
      Err(Error::Status {
        method,
        path: url.path().to_owned(),
        status,
      })
    }
  }

  // ── Assets ────────────────────────────────────────────────────────────────

  /// `PUT /api/assets/{id}` — create or replace the asset.
  pub async fn put_asset(&self, asset: &Asset) -> Result<()> {
    let url = self.url(&["assets", &asset.id]);
    let resp = self
      .auth(self.client.put(url.clone()))
      .json(asset)
      .send()
      .await?;
    Self::check("PUT", &url, resp)?;
    tracing::debug!(id = %asset.id, "asset pushed to registry");
    Ok(())
  }

  // ── Connector state ───────────────────────────────────────────────────────

  /// `GET /api/connectors/{id}/state`; a 404 means nothing saved yet.
  pub async fn fetch_state(&self, connector_id: &str) -> Result<SyncState> {
    let url = self.url(&["connectors", connector_id, "state"]);
    let resp = self.auth(self.client.get(url.clone())).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(SyncState::default());
    }
    let resp = Self::check("GET", &url, resp)?;
    Ok(resp.json().await?)
  }

  /// `PUT /api/connectors/{id}/state` — replace the whole snapshot.
  pub async fn store_state(
    &self,
    connector_id: &str,
    state: &SyncState,
  ) -> Result<()> {
    let url = self.url(&["connectors", connector_id, "state"]);
    let resp = self
      .auth(self.client.put(url.clone()))
      .json(state)
      .send()
      .await?;
    Self::check("PUT", &url, resp)?;
    Ok(())
  }
}

impl AssetSink for RegistryClient {
  type Error = Error;

  async fn on_asset_updated(&self, asset: &Asset) -> Result<()> {
    self.put_asset(asset).await
  }
}

impl StateStore for RegistryClient {
  type Error = Error;

  async fn get_state(&self, connector_id: &str) -> Result<SyncState> {
    self.fetch_state(connector_id).await
  }

  async fn save_state(&self, connector_id: &str, state: &SyncState) -> Result<()> {
    self.store_state(connector_id, state).await
  }
}
