//! One extraction pass: catalog → mapper → sink, then advance the cursor.

use chrono::Utc;

use crate::{
  Error, Result,
  asset::Asset,
  catalog::{CatalogReader, CatalogSession, ObjectKind},
  cursor::Cursor,
  mapper::AssetMapper,
  sink::AssetSink,
  state::StateStore,
};

/// Outcome of one pass. Complete only when the pass reached the end of the
/// catalog.
#[derive(Debug, Default)]
pub struct PassReport {
  /// Snapshot time stamped on every asset of this pass (epoch millis).
  pub started_at:      i64,
  /// Cursor value read before the pass.
  pub previous_cursor: i64,
  /// Assets the sink accepted.
  pub emitted:         usize,
  /// Objects that were skipped; see [`Error::is_partial`].
  pub failures:        Vec<Error>,
  pub cursor_advanced: bool,
}

impl PassReport {
  pub fn is_clean(&self) -> bool { self.failures.is_empty() }
}

/// Runs passes against one catalog, recording progress in one cursor.
pub struct ExtractionPass<R, S> {
  reader: R,
  cursor: Cursor<S>,
  mapper: AssetMapper,
}

impl<R, S> ExtractionPass<R, S>
where
  R: CatalogReader,
  S: StateStore,
{
  pub fn new(reader: R, cursor: Cursor<S>, database: &str, host: &str) -> Self {
    let mapper = AssetMapper::new(database, host, reader.source());
    Self {
      reader,
      cursor,
      mapper,
    }
  }

  pub fn cursor(&self) -> &Cursor<S> { &self.cursor }

  /// Extract the schema, then every table, then every view, pushing each
  /// asset to `sink` as soon as it is built.
  ///
  /// Returns `Err` only when the catalog cannot be opened or enumerated; the
  /// cursor is left untouched in that case. Single-object failures are
  /// collected in the report instead, and also hold the cursor back.
  pub async fn run<K: AssetSink>(&self, sink: &K) -> Result<PassReport> {
    let mut report = PassReport::default();
    self.run_into(sink, &mut report).await?;
    Ok(report)
  }

  /// Like [`run`](Self::run), but fills a caller-owned report so the assets
  /// emitted and objects skipped before an abort are still visible.
  pub async fn run_into<K: AssetSink>(
    &self,
    sink: &K,
    report: &mut PassReport,
  ) -> Result<()> {
    let previous_cursor = self.cursor.read().await;
    let started_at = Utc::now().timestamp_millis();
    *report = PassReport {
      started_at,
      previous_cursor,
      ..PassReport::default()
    };

    let database = self.mapper.database();
    tracing::info!(
      source = self.reader.source(),
      database,
      previous_cursor,
      "synchronizing catalog assets"
    );

    {
      let session = self.reader.open().await.map_err(Error::source_unavailable)?;
      self.extract(&session, sink, report).await?;
    }

    if report.is_clean() {
      match self.cursor.write(started_at).await {
        Ok(()) => report.cursor_advanced = true,
        Err(e) => {
          tracing::warn!(error = %e, "failed to advance sync cursor");
        }
      }
    } else {
      tracing::warn!(
        failures = report.failures.len(),
        "pass had failures; sync cursor not advanced"
      );
    }

    Ok(())
  }

  async fn extract<K: AssetSink>(
    &self,
    session: &R::Session,
    sink: &K,
    report: &mut PassReport,
  ) -> Result<()> {
    let database = self.mapper.database();

    let schema = session
      .schema(database)
      .await
      .map_err(Error::source_unavailable)?;
    if schema.is_some()
      && let Some(asset) = self.mapper.schema_asset(report.started_at)
    {
      tracing::info!("Synchronizing schema {}", asset.info.name);
      push(sink, &asset, report).await;
    }

    for kind in [ObjectKind::Table, ObjectKind::View] {
      let rows = session
        .list_tables(database, kind)
        .await
        .map_err(Error::source_unavailable)?;

      for row in rows {
        let asset_kind = kind.asset_kind();
        tracing::info!("Synchronizing {asset_kind} {}", row.name);

        let columns = match session.list_columns(database, &row.name).await {
          Ok(columns) => columns,
          Err(e) => {
            let err = Error::Extraction {
              kind:   asset_kind,
              name:   row.name.clone(),
              source: Box::new(e),
            };
            tracing::warn!(error = %err, "skipping object");
            report.failures.push(err);
            continue;
          }
        };

        let asset =
          self
            .mapper
            .relation_asset(kind, &row, &columns, report.started_at);
        push(sink, &asset, report).await;
      }
    }

    Ok(())
  }
}

async fn push<K: AssetSink>(sink: &K, asset: &Asset, report: &mut PassReport) {
  match sink.on_asset_updated(asset).await {
    Ok(()) => report.emitted += 1,
    Err(e) => {
      let err = Error::Sink {
        id:     asset.id.clone(),
        source: Box::new(e),
      };
      tracing::warn!(error = %err, "sink rejected asset");
      report.failures.push(err);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use super::*;
  use crate::{
    asset::{AssetKind, PropertyValue},
    fixtures::FakeCatalog,
    memory::{CollectingSink, MemoryStateStore},
  };

  fn pass(catalog: FakeCatalog) -> ExtractionPass<FakeCatalog, MemoryStateStore> {
    let cursor = Cursor::new(MemoryStateStore::default(), "test-connector");
    ExtractionPass::new(catalog, cursor, "db1", "localhost")
  }

  #[tokio::test]
  async fn emits_schema_tables_then_views() {
    let p = pass(FakeCatalog::sample());
    let sink = CollectingSink::default();

    let report = p.run(&sink).await.unwrap();
    let assets = sink.assets().await;

    assert_eq!(report.emitted, 4);
    assert!(report.is_clean());
    let ids: Vec<_> = assets.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["db1.SCHEMA.db1", "db1.TABLE.a", "db1.TABLE.b", "db1.VIEW.c"]);
    let tags: Vec<_> = assets.iter().map(|a| a.info.kind_tag.as_str()).collect();
    assert_eq!(tags, ["fake_schema", "fake_table", "fake_table", "fake_view"]);
  }

  #[tokio::test]
  async fn every_asset_shares_the_pass_timestamp() {
    let p = pass(FakeCatalog::sample());
    let sink = CollectingSink::default();

    let report = p.run(&sink).await.unwrap();
    let expected = report.started_at.to_string();
    for asset in sink.assets().await {
      assert_eq!(
        asset.property("updatedAt"),
        Some(&PropertyValue::String(expected.clone()))
      );
    }
  }

  #[tokio::test]
  async fn system_schema_database_emits_no_schema_asset() {
    let cursor = Cursor::new(MemoryStateStore::default(), "c");
    let p = ExtractionPass::new(
      FakeCatalog::sample(),
      cursor,
      "INFORMATION_SCHEMA",
      "localhost",
    );
    let sink = CollectingSink::default();
    p.run(&sink).await.unwrap();

    let assets = sink.assets().await;
    assert!(assets.iter().all(|a| a.kind() != Some(AssetKind::Schema)));
    assert_eq!(assets.len(), 3);
  }

  #[tokio::test]
  async fn advances_cursor_after_clean_pass() {
    let p = pass(FakeCatalog::sample());
    let report = p.run(&CollectingSink::default()).await.unwrap();

    assert!(report.cursor_advanced);
    assert_eq!(report.previous_cursor, 0);
    assert!(p.cursor().read().await >= report.started_at);
  }

  #[tokio::test]
  async fn source_unavailable_leaves_cursor_untouched() {
    let catalog = FakeCatalog::sample().failing_opens([1]);
    let p = pass(catalog);
    p.cursor().write(123).await.unwrap();

    let err = p.run(&CollectingSink::default()).await.unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable(_)));
    assert_eq!(p.cursor().read().await, 123);
  }

  #[tokio::test]
  async fn enumeration_failure_mid_pass_keeps_pushed_assets() {
    let catalog = FakeCatalog::sample().failing_listing(ObjectKind::View);
    let live = catalog.live_sessions();
    let p = pass(catalog);
    let sink = CollectingSink::default();

    let err = p.run(&sink).await.unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable(_)));
    assert_eq!(sink.assets().await.len(), 3);
    assert_eq!(p.cursor().read().await, 0);
    assert_eq!(live.load(std::sync::atomic::Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn aborted_pass_still_reports_progress() {
    let catalog = FakeCatalog::sample()
      .broken_columns("a")
      .failing_listing(ObjectKind::View);
    let p = pass(catalog);
    let sink = CollectingSink::default();
    let mut report = PassReport::default();

    let err = p.run_into(&sink, &mut report).await.unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable(_)));
    assert_eq!(report.emitted, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.started_at > 0);
    assert!(!report.cursor_advanced);
  }

  #[tokio::test]
  async fn broken_object_is_skipped() {
    let catalog = FakeCatalog::sample().broken_columns("a");
    let p = pass(catalog);
    let sink = CollectingSink::default();

    let report = p.run(&sink).await.unwrap();
    let ids: Vec<_> = sink.assets().await.into_iter().map(|a| a.id).collect();

    assert_eq!(ids, ["db1.SCHEMA.db1", "db1.TABLE.b", "db1.VIEW.c"]);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
      &report.failures[0],
      Error::Extraction { kind: AssetKind::Table, name, .. } if name == "a"
    ));
    assert!(!report.cursor_advanced);
    assert_eq!(p.cursor().read().await, 0);
  }

  #[tokio::test]
  async fn sink_failure_is_isolated() {
    let p = pass(FakeCatalog::sample());
    let sink = CollectingSink::rejecting(["db1.TABLE.a"]);

    let report = p.run(&sink).await.unwrap();
    assert_eq!(report.emitted, 3);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].is_partial());
    assert_eq!(sink.assets().await.len(), 3);
    assert!(!report.cursor_advanced);
  }

  #[tokio::test]
  async fn state_store_outage_does_not_block_extraction() {
    let p = pass(FakeCatalog::sample());
    p.cursor().store().set_unavailable(true);
    let sink = CollectingSink::default();

    let report = p.run(&sink).await.unwrap();
    assert_eq!(report.previous_cursor, 0);
    assert_eq!(report.emitted, 4);
    assert!(!report.cursor_advanced);
  }

  #[tokio::test]
  async fn session_released_after_pass() {
    let catalog = FakeCatalog::sample();
    let live = catalog.live_sessions();
    let p = pass(catalog);
    p.run(&CollectingSink::default()).await.unwrap();
    assert_eq!(live.load(std::sync::atomic::Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn repeated_passes_are_idempotent() {
    let p = pass(FakeCatalog::sample());
    let sink = CollectingSink::default();

    p.run(&sink).await.unwrap();
    let first = sink.take().await;
    p.run(&sink).await.unwrap();
    let second = sink.take().await;

    let ids = |v: &[Asset]| v.iter().map(|a| a.id.clone()).collect::<BTreeSet<_>>();
    assert_eq!(ids(&first), ids(&second));
    for (a, b) in first.iter().zip(&second) {
      assert_eq!(a.info, b.info);
      assert_eq!(a.columns, b.columns);
    }
  }

  #[tokio::test]
  async fn table_columns_are_encoded() {
    let p = pass(FakeCatalog::sample());
    let sink = CollectingSink::default();
    p.run(&sink).await.unwrap();

    let assets = sink.assets().await;
    let a = assets.iter().find(|x| x.id == "db1.TABLE.a").unwrap();
    assert_eq!(a.columns[0].name, "age");
    assert_eq!(a.columns[0].type_name, "INT");
    assert_eq!(a.property("age.nullable"), Some(&PropertyValue::Bool(true)));
    assert_eq!(a.property("age.size"), Some(&PropertyValue::Integer(11)));
  }
}
