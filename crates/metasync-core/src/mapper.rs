//! Catalog rows → [`Asset`] records.
//!
//! Pure transformation: no I/O, no clock. The pass supplies the snapshot
//! timestamp so every asset of one pass carries the same `updatedAt`.

use std::collections::BTreeMap;

use crate::{
  asset::{Asset, AssetColumn, AssetInfo, AssetKind, STATUS_ACTIVE},
  catalog::{ColumnRow, Nullability, ObjectKind, TableRow},
};

/// The reserved system catalog, never reported as a schema.
pub const SYSTEM_SCHEMA: &str = "information_schema";

/// Builds assets for one configured database.
#[derive(Debug, Clone)]
pub struct AssetMapper {
  database: String,
  host:     String,
  source:   String,
}

impl AssetMapper {
  pub fn new(
    database: impl Into<String>,
    host: impl Into<String>,
    source: impl Into<String>,
  ) -> Self {
    Self {
      database: database.into(),
      host:     host.into(),
      source:   source.into(),
    }
  }

  pub fn database(&self) -> &str { &self.database }

  /// The schema asset for the configured database, or `None` when the
  /// database is the system catalog.
  pub fn schema_asset(&self, updated_at: i64) -> Option<Asset> {
    let name = self.database.as_str();
    if name.is_empty() || name.eq_ignore_ascii_case(SYSTEM_SCHEMA) {
      return None;
    }

    let info = self.info(
      AssetKind::Schema,
      name,
      name.to_owned(),
      format!("Database schema: {name}"),
    );
    Some(self.asset(AssetKind::Schema, name, info, updated_at))
  }

  /// The asset for one table or view and its columns.
  pub fn relation_asset(
    &self,
    kind: ObjectKind,
    row: &TableRow,
    columns: &[ColumnRow],
    updated_at: i64,
  ) -> Asset {
    let asset_kind = kind.asset_kind();
    let info = self.info(
      asset_kind,
      &row.name,
      format!("{}.{}", self.database, row.name),
      row.remarks.clone().unwrap_or_default(),
    );
    let mut asset = self.asset(asset_kind, &row.name, info, updated_at);

    if kind == ObjectKind::Table {
      asset.set_property("table_type", row.kind.as_str());
    }

    for column in columns {
      encode_column(&mut asset, column);
    }
    asset
  }

  fn info(
    &self,
    kind: AssetKind,
    name: &str,
    qualified_name: String,
    description: String,
  ) -> AssetInfo {
    AssetInfo {
      name: name.to_owned(),
      qualified_name,
      kind_tag: format!("{}_{}", self.source, kind.type_suffix()),
      status: STATUS_ACTIVE.to_owned(),
      description,
      source: self.source.clone(),
      source_id: name.to_owned(),
    }
  }

  fn asset(
    &self,
    kind: AssetKind,
    name: &str,
    info: AssetInfo,
    updated_at: i64,
  ) -> Asset {
    let mut asset = Asset {
      id: kind.asset_id(&self.database, name),
      info,
      columns: Vec::new(),
      properties: BTreeMap::new(),
    };
    asset.set_property("host", self.host.as_str());
    asset.set_property("database", self.database.as_str());
    asset.set_property("updatedAt", updated_at.to_string());
    asset
  }
}

/// Append `column` and its flattened `{name}.nullable` / `{name}.size`
/// properties.
fn encode_column(asset: &mut Asset, column: &ColumnRow) {
  asset.columns.push(AssetColumn {
    name:        column.name.clone(),
    type_name:   column.type_name.clone(),
    description: column.remarks.clone().unwrap_or_default(),
  });
  asset.set_property(
    format!("{}.nullable", column.name),
    column.nullable == Nullability::Nullable,
  );
  asset.set_property(format!("{}.size", column.name), column.size);
}
