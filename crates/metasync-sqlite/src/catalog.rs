//! [`SqliteCatalog`] — a [`CatalogReader`] over a SQLite database file.

use std::path::{Path, PathBuf};

use metasync_core::catalog::{
  CatalogReader, CatalogSession, ColumnRow, ObjectKind, TableRow,
};
use rusqlite::OpenFlags;

use crate::{
  Result,
  encode::{declared_size, decode_nullability, master_type},
};

/// Source tag stamped into asset type tags (`sqlite_table`, ...).
pub const SOURCE: &str = "sqlite";

/// Reads the catalog of one SQLite database file.
///
/// Each [`open`](CatalogReader::open) opens a fresh read-only connection; it
/// is closed when the returned session is dropped.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
  path: PathBuf,
}

impl SqliteCatalog {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }
}

impl CatalogReader for SqliteCatalog {
  type Error = crate::Error;
  type Session = SqliteSession;

  fn source(&self) -> &str { SOURCE }

  async fn open(&self) -> Result<SqliteSession> {
    // Read-only, so a wrong path fails instead of creating an empty file.
    let conn = tokio_rusqlite::Connection::open_with_flags(
      self.path.clone(),
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .await?;
    tracing::debug!(path = %self.path.display(), "opened catalog connection");
    Ok(SqliteSession { conn })
  }
}

/// An open read-only connection to the catalog.
pub struct SqliteSession {
  conn: tokio_rusqlite::Connection,
}

impl CatalogSession for SqliteSession {
  type Error = crate::Error;

  /// SQLite has a single `main` schema, reported under the configured
  /// database name. Reading the schema version also verifies that the file
  /// is a database at all.
  async fn schema(&self, database: &str) -> Result<Option<String>> {
    self
      .conn
      .call(|conn| {
        let version: i64 =
          conn.query_row("PRAGMA schema_version", [], |r| r.get(0))?;
        Ok(version)
      })
      .await?;
    Ok(Some(database.to_owned()))
  }

  async fn list_tables(
    &self,
    _database: &str,
    kind: ObjectKind,
  ) -> Result<Vec<TableRow>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT name FROM sqlite_master
           WHERE type = ?1 AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
           ORDER BY name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![master_type(kind)], |row| {
            Ok(TableRow {
              name:    row.get(0)?,
              kind:    kind.catalog_name().to_owned(),
              remarks: None,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn list_columns(
    &self,
    _database: &str,
    table: &str,
  ) -> Result<Vec<ColumnRow>> {
    let table = table.to_owned();
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT name, type, \"notnull\" FROM pragma_table_info(?1) ORDER BY cid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![table], |row| {
            let type_name: String = row.get(1)?;
            let notnull: i64 = row.get(2)?;
            Ok(ColumnRow {
              name: row.get(0)?,
              size: declared_size(&type_name),
              type_name,
              remarks: None,
              nullable: decode_nullability(notnull),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}
