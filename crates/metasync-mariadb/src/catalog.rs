//! [`MariaDbCatalog`] — a [`CatalogReader`] over a MariaDB server.

use std::time::Duration;

use metasync_core::{
  catalog::{CatalogReader, CatalogSession, ColumnRow, ObjectKind, TableRow},
  config::ConnectionConfig,
};
use sqlx::{
  Connection as _, Row as _,
  mysql::{MySqlConnectOptions, MySqlConnection},
};
use tokio::sync::Mutex;

use crate::{
  Error, Result,
  encode::{
    column_size, decode_nullability, decode_remarks, decode_table_type,
    decode_type_name, table_type_filter,
  },
};

/// Source tag stamped into asset type tags (`mariadb_table`, ...).
pub const SOURCE: &str = "mariadb";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads the catalog of one MariaDB database.
///
/// Each [`open`](CatalogReader::open) logs in with a new connection; it is
/// closed when the returned session is dropped.
#[derive(Clone)]
pub struct MariaDbCatalog {
  options:         MySqlConnectOptions,
  host:            String,
  port:            u16,
  connect_timeout: Duration,
}

impl MariaDbCatalog {
  pub fn new(connection: &ConnectionConfig) -> Self {
    let options = MySqlConnectOptions::new()
      .host(&connection.host)
      .port(connection.port)
      .username(&connection.username)
      .password(&connection.password)
      .database(&connection.database);
    Self {
      options,
      host: connection.host.clone(),
      port: connection.port,
      connect_timeout: DEFAULT_CONNECT_TIMEOUT,
    }
  }

  pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
    self.connect_timeout = timeout;
    self
  }
}

impl CatalogReader for MariaDbCatalog {
  type Error = Error;
  type Session = MariaDbSession;

  fn source(&self) -> &str { SOURCE }

  async fn open(&self) -> Result<MariaDbSession> {
    let connect = MySqlConnection::connect_with(&self.options);
    let conn = tokio::time::timeout(self.connect_timeout, connect)
      .await
      .map_err(|_| Error::ConnectTimeout {
        host:    self.host.clone(),
        port:    self.port,
        timeout: self.connect_timeout,
      })??;
    tracing::debug!(host = %self.host, port = self.port, "opened catalog connection");
    Ok(MariaDbSession {
      conn: Mutex::new(conn),
    })
  }
}

/// An open connection to the server's `information_schema`.
///
/// Queries run one at a time over the single connection.
pub struct MariaDbSession {
  conn: Mutex<MySqlConnection>,
}

impl CatalogSession for MariaDbSession {
  type Error = Error;

  async fn schema(&self, database: &str) -> Result<Option<String>> {
    let mut conn = self.conn.lock().await;
    let row = sqlx::query(
      "SELECT CAST(SCHEMA_NAME AS CHAR) AS name
       FROM information_schema.SCHEMATA
       WHERE SCHEMA_NAME = ?",
    )
    .bind(database)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(match row {
      Some(row) => Some(row.try_get("name")?),
      None => None,
    })
  }

  async fn list_tables(
    &self,
    database: &str,
    kind: ObjectKind,
  ) -> Result<Vec<TableRow>> {
    let sql = format!(
      "SELECT CAST(TABLE_NAME AS CHAR) AS name,
              CAST(TABLE_TYPE AS CHAR) AS kind,
              CAST(TABLE_COMMENT AS CHAR) AS remarks
       FROM information_schema.TABLES
       WHERE TABLE_SCHEMA = ? AND TABLE_TYPE IN {}
       ORDER BY TABLE_NAME",
      table_type_filter(kind)
    );

    let mut conn = self.conn.lock().await;
    let rows = sqlx::query(&sql)
      .bind(database)
      .fetch_all(&mut *conn)
      .await?;

    rows
      .iter()
      .map(|row| -> Result<TableRow> {
        let kind: String = row.try_get("kind")?;
        Ok(TableRow {
          name:    row.try_get("name")?,
          kind:    decode_table_type(&kind),
          remarks: decode_remarks(row.try_get("remarks")?),
        })
      })
      .collect()
  }

  async fn list_columns(
    &self,
    database: &str,
    table: &str,
  ) -> Result<Vec<ColumnRow>> {
    let mut conn = self.conn.lock().await;
    let rows = sqlx::query(
      "SELECT CAST(COLUMN_NAME AS CHAR) AS name,
              CAST(DATA_TYPE AS CHAR) AS data_type,
              CAST(COLUMN_COMMENT AS CHAR) AS remarks,
              CAST(IS_NULLABLE AS CHAR) AS is_nullable,
              CAST(CHARACTER_MAXIMUM_LENGTH AS UNSIGNED) AS char_length,
              CAST(NUMERIC_PRECISION AS UNSIGNED) AS numeric_precision,
              CAST(DATETIME_PRECISION AS UNSIGNED) AS datetime_precision
       FROM information_schema.COLUMNS
       WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
       ORDER BY ORDINAL_POSITION",
    )
    .bind(database)
    .bind(table)
    .fetch_all(&mut *conn)
    .await?;

    rows
      .iter()
      .map(|row| -> Result<ColumnRow> {
        let data_type: String = row.try_get("data_type")?;
        let is_nullable: String = row.try_get("is_nullable")?;
        Ok(ColumnRow {
          name:      row.try_get("name")?,
          type_name: decode_type_name(&data_type),
          remarks:   decode_remarks(row.try_get("remarks")?),
          size:      column_size(
            row.try_get("char_length")?,
            row.try_get("numeric_precision")?,
            row.try_get("datetime_precision")?,
          ),
          nullable:  decode_nullability(&is_nullable),
        })
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use metasync_core::{
    Error as CoreError,
    config::CatalogDriver,
    cursor::Cursor,
    memory::{CollectingSink, MemoryStateStore},
    pass::ExtractionPass,
  };

  use super::*;

  /// A local port with nothing listening on it.
  fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
  }

  fn connection(port: u16) -> ConnectionConfig {
    ConnectionConfig {
      driver: CatalogDriver::MariaDb,
      host: "127.0.0.1".into(),
      port,
      database: "shop".into(),
      username: "reader".into(),
      password: String::new(),
      path: None,
    }
  }

  fn catalog() -> MariaDbCatalog {
    MariaDbCatalog::new(&connection(closed_port()))
      .with_connect_timeout(Duration::from_secs(5))
  }

  #[test]
  fn source_tag_is_mariadb() {
    assert_eq!(catalog().source(), "mariadb");
  }

  #[tokio::test]
  async fn unreachable_server_fails_to_open() {
    let err = catalog().open().await.err().expect("open must fail");
    assert!(matches!(err, Error::Database(_) | Error::ConnectTimeout { .. }));
  }

  #[tokio::test]
  async fn unreachable_server_is_source_unavailable() {
    let cursor = Cursor::new(MemoryStateStore::default(), "shop-sync");
    let pass = ExtractionPass::new(catalog(), cursor, "shop", "127.0.0.1");
    let sink = CollectingSink::default();

    let err = pass.run(&sink).await.unwrap_err();
    assert!(matches!(err, CoreError::SourceUnavailable(_)));
    assert!(sink.assets().await.is_empty());
    assert_eq!(pass.cursor().read().await, 0);
  }
}
