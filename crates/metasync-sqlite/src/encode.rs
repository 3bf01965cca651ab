//! Conversions between SQLite catalog values and the core catalog rows.

use chrono::{DateTime, Utc};
use metasync_core::catalog::{Nullability, ObjectKind};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── ObjectKind ──────────────────────────────────────────────────────────────

/// The `sqlite_master.type` value for `kind`.
pub fn master_type(kind: ObjectKind) -> &'static str {
  match kind {
    ObjectKind::Table => "table",
    ObjectKind::View => "view",
  }
}

// ─── Columns ─────────────────────────────────────────────────────────────────

/// `pragma_table_info.notnull` → [`Nullability`].
pub fn decode_nullability(notnull: i64) -> Nullability {
  if notnull == 0 {
    Nullability::Nullable
  } else {
    Nullability::NoNulls
  }
}

/// The first size argument of a declared type, e.g. `255` for
/// `VARCHAR(255)` and `10` for `DECIMAL(10, 2)`. SQLite does not enforce
/// sizes, so `0` when none was declared.
pub fn declared_size(type_name: &str) -> i64 {
  let Some((_, args)) = type_name.split_once('(') else {
    return 0;
  };
  args
    .split([',', ')'])
    .next()
    .and_then(|n| n.trim().parse().ok())
    .unwrap_or(0)
}
