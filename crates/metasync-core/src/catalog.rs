//! The catalog reader contract.
//!
//! Implemented by metadata source adapters (e.g. `metasync-sqlite`). The
//! extraction pass depends on this abstraction only, never on a concrete
//! database driver.

use std::future::Future;

use crate::asset::AssetKind;

// ─── Catalog rows ────────────────────────────────────────────────────────────

/// Relation kinds that can be enumerated from a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
  Table,
  View,
}

impl ObjectKind {
  /// The kind name as catalog APIs spell it.
  pub fn catalog_name(self) -> &'static str {
    match self {
      Self::Table => "TABLE",
      Self::View => "VIEW",
    }
  }

  pub fn asset_kind(self) -> AssetKind {
    match self {
      Self::Table => AssetKind::Table,
      Self::View => AssetKind::View,
    }
  }
}

/// One table or view as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
  pub name:    String,
  /// The catalog's own kind string (`TABLE`, `BASE TABLE`, `VIEW`, ...).
  pub kind:    String,
  pub remarks: Option<String>,
}

/// Whether a column accepts `NULL`, as far as the catalog knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
  NoNulls,
  Nullable,
  Unknown,
}

/// One column of a table or view, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
  pub name:      String,
  pub type_name: String,
  pub remarks:   Option<String>,
  pub size:      i64,
  pub nullable:  Nullability,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// A metadata source that can be opened for one extraction pass.
pub trait CatalogReader: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
  type Session: CatalogSession<Error = Self::Error>;

  /// Source system tag, used as the prefix of asset type tags.
  fn source(&self) -> &str;

  /// Open a session. The session owns the underlying connection and
  /// releases it when dropped.
  fn open(
    &self,
  ) -> impl Future<Output = Result<Self::Session, Self::Error>> + Send + '_;
}

/// An open connection to the catalog.
pub trait CatalogSession: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The schema backing `database`, or `None` if the catalog has none.
  fn schema<'a>(
    &'a self,
    database: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// All relations of `kind` in `database`, in catalog order.
  fn list_tables<'a>(
    &'a self,
    database: &'a str,
    kind: ObjectKind,
  ) -> impl Future<Output = Result<Vec<TableRow>, Self::Error>> + Send + 'a;

  /// All columns of `table`, in ordinal order.
  fn list_columns<'a>(
    &'a self,
    database: &'a str,
    table: &'a str,
  ) -> impl Future<Output = Result<Vec<ColumnRow>, Self::Error>> + Send + 'a;
}
