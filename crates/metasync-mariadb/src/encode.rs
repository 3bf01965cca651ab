//! Conversions between `information_schema` values and the core catalog
//! rows.
//!
//! The decoded values follow what JDBC's `DatabaseMetaData` reports for the
//! same columns, so assets look the same whichever client read them.

use metasync_core::catalog::{Nullability, ObjectKind};

// ─── Tables ──────────────────────────────────────────────────────────────────

/// SQL list of the `TABLES.TABLE_TYPE` values that make up `kind`.
pub fn table_type_filter(kind: ObjectKind) -> &'static str {
  match kind {
    ObjectKind::Table => "('BASE TABLE', 'SYSTEM VERSIONED')",
    ObjectKind::View => "('VIEW')",
  }
}

/// `TABLES.TABLE_TYPE` → the kind string catalog clients report.
pub fn decode_table_type(raw: &str) -> String {
  match raw {
    "BASE TABLE" => "TABLE".to_owned(),
    other => other.to_owned(),
  }
}

/// MariaDB stores "no comment" as an empty string.
pub fn decode_remarks(raw: Option<String>) -> Option<String> {
  raw.filter(|r| !r.trim().is_empty())
}

// ─── Columns ─────────────────────────────────────────────────────────────────

/// `COLUMNS.DATA_TYPE` in the upper case JDBC reports, e.g. `VARCHAR`.
pub fn decode_type_name(data_type: &str) -> String { data_type.to_uppercase() }

/// `COLUMNS.IS_NULLABLE` → [`Nullability`].
pub fn decode_nullability(is_nullable: &str) -> Nullability {
  match is_nullable.trim() {
    "YES" => Nullability::Nullable,
    "NO" => Nullability::NoNulls,
    _ => Nullability::Unknown,
  }
}

/// Character length for string types, precision for numeric and temporal
/// ones, `0` when the catalog reports neither.
pub fn column_size(
  char_length: Option<u64>,
  numeric_precision: Option<u64>,
  datetime_precision: Option<u64>,
) -> i64 {
  char_length
    .or(numeric_precision)
    .or(datetime_precision)
    .map_or(0, |n| i64::try_from(n).unwrap_or(i64::MAX))
}
