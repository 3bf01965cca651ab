//! Scripted catalog used by the pass and synchronizer tests.

use std::{
  collections::{HashMap, HashSet},
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
};

use thiserror::Error;

use crate::catalog::{
  CatalogReader, CatalogSession, ColumnRow, Nullability, ObjectKind, TableRow,
};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct FakeError(pub String);

#[derive(Debug, Default)]
struct Script {
  schema:          Option<String>,
  tables:          Vec<TableRow>,
  views:           Vec<TableRow>,
  columns:         HashMap<String, Vec<ColumnRow>>,
  broken_columns:  HashSet<String>,
  failing_opens:   HashSet<usize>,
  failing_listing: Option<ObjectKind>,
}

/// An in-memory catalog whose failures can be scripted per open attempt.
#[derive(Debug, Default)]
pub struct FakeCatalog {
  script: Arc<Script>,
  opens:  AtomicUsize,
  live:   Arc<AtomicUsize>,
}

fn relation(name: &str, kind: &str) -> TableRow {
  TableRow {
    name:    name.into(),
    kind:    kind.into(),
    remarks: None,
  }
}

fn column(name: &str, type_name: &str, size: i64) -> ColumnRow {
  ColumnRow {
    name:      name.into(),
    type_name: type_name.into(),
    remarks:   None,
    size,
    nullable:  Nullability::Nullable,
  }
}

impl FakeCatalog {
  /// Schema `db1`, tables `a` and `b`, view `c`.
  pub fn sample() -> Self {
    let mut columns = HashMap::new();
    columns.insert("a".to_owned(), vec![column("age", "INT", 11)]);
    columns.insert("b".to_owned(), vec![
      column("id", "BIGINT", 20),
      column("label", "VARCHAR", 64),
    ]);
    columns.insert("c".to_owned(), vec![column("age", "INT", 11)]);

    Self::from_script(Script {
      schema: Some("db1".into()),
      tables: vec![relation("a", "TABLE"), relation("b", "TABLE")],
      views: vec![relation("c", "VIEW")],
      columns,
      ..Script::default()
    })
  }

  fn from_script(script: Script) -> Self {
    Self {
      script: Arc::new(script),
      ..Self::default()
    }
  }

  fn edit(self, f: impl FnOnce(&mut Script)) -> Self {
    let mut script =
      Arc::try_unwrap(self.script).expect("script edited after first open");
    f(&mut script);
    Self::from_script(script)
  }

  /// Fail the given 1-based open attempts.
  pub fn failing_opens(self, attempts: impl IntoIterator<Item = usize>) -> Self {
    let attempts: HashSet<_> = attempts.into_iter().collect();
    self.edit(|s| s.failing_opens = attempts)
  }

  pub fn failing_listing(self, kind: ObjectKind) -> Self {
    self.edit(|s| s.failing_listing = Some(kind))
  }

  pub fn broken_columns(self, table: &str) -> Self {
    let table = table.to_owned();
    self.edit(|s| {
      s.broken_columns.insert(table);
    })
  }

  /// Number of sessions currently open.
  pub fn live_sessions(&self) -> Arc<AtomicUsize> { self.live.clone() }
}

pub struct FakeSession {
  script: Arc<Script>,
  live:   Arc<AtomicUsize>,
}

impl Drop for FakeSession {
  fn drop(&mut self) { self.live.fetch_sub(1, Ordering::SeqCst); }
}

impl CatalogReader for FakeCatalog {
  type Error = FakeError;
  type Session = FakeSession;

  fn source(&self) -> &str { "fake" }

  async fn open(&self) -> Result<FakeSession, FakeError> {
    let attempt = self.opens.fetch_add(1, Ordering::SeqCst) + 1;
    if self.script.failing_opens.contains(&attempt) {
      return Err(FakeError(format!("connection refused (attempt {attempt})")));
    }
    self.live.fetch_add(1, Ordering::SeqCst);
    Ok(FakeSession {
      script: self.script.clone(),
      live:   self.live.clone(),
    })
  }
}

impl CatalogSession for FakeSession {
  type Error = FakeError;

  async fn schema(&self, _database: &str) -> Result<Option<String>, FakeError> {
    Ok(self.script.schema.clone())
  }

  async fn list_tables(
    &self,
    _database: &str,
    kind: ObjectKind,
  ) -> Result<Vec<TableRow>, FakeError> {
    if self.script.failing_listing == Some(kind) {
      return Err(FakeError(format!("lost connection listing {kind:?}")));
    }
    Ok(match kind {
      ObjectKind::Table => self.script.tables.clone(),
      ObjectKind::View => self.script.views.clone(),
    })
  }

  async fn list_columns(
    &self,
    _database: &str,
    table: &str,
  ) -> Result<Vec<ColumnRow>, FakeError> {
    if self.script.broken_columns.contains(table) {
      return Err(FakeError(format!("malformed column row in {table}")));
    }
    Ok(self.script.columns.get(table).cloned().unwrap_or_default())
  }
}
