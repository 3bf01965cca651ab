//! Asset — the canonical record pushed to the registry.
//!
//! Assets are rebuilt from the catalog on every pass and never diffed against
//! an earlier copy. The registry upserts them by [`Asset::id`], so the id must
//! be a pure function of database, kind and object name.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// Lifecycle status reported for every asset. Deletions are not detected.
pub const STATUS_ACTIVE: &str = "active";

/// The kind of catalog object an asset describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
  Schema,
  Table,
  View,
}

impl AssetKind {
  /// Upper-case segment used inside asset ids, e.g. `shop.TABLE.orders`.
  pub fn id_segment(self) -> &'static str {
    match self {
      Self::Schema => "SCHEMA",
      Self::Table => "TABLE",
      Self::View => "VIEW",
    }
  }

  /// Lower-case suffix of the `info.type` tag, e.g. `mariadb_table`.
  pub fn type_suffix(self) -> &'static str {
    match self {
      Self::Schema => "schema",
      Self::Table => "table",
      Self::View => "view",
    }
  }

  /// Build the stable asset id for an object of this kind.
  pub fn asset_id(self, database: &str, name: &str) -> String {
    format!("{database}.{}.{name}", self.id_segment())
  }
}

impl fmt::Display for AssetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.type_suffix())
  }
}

/// A scalar property value. Serialised untagged, so the registry sees plain
/// JSON strings, booleans and numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
  Bool(bool),
  Integer(i64),
  String(String),
}

impl From<bool> for PropertyValue {
  fn from(v: bool) -> Self { Self::Bool(v) }
}

impl From<i64> for PropertyValue {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<String> for PropertyValue {
  fn from(v: String) -> Self { Self::String(v) }
}

impl From<&str> for PropertyValue {
  fn from(v: &str) -> Self { Self::String(v.to_owned()) }
}

/// Fixed descriptor fields of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
  pub name:           String,
  /// `database.name` for tables and views, just `name` for schemas.
  pub qualified_name: String,
  /// `{source}_{kind}`, e.g. `sqlite_view`.
  #[serde(rename = "type")]
  pub kind_tag:       String,
  pub status:         String,
  /// Catalog remark; empty when the catalog has none.
  pub description:    String,
  pub source:         String,
  pub source_id:      String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetColumn {
  pub name:        String,
  #[serde(rename = "type")]
  pub type_name:   String,
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
  pub id:         String,
  pub info:       AssetInfo,
  #[serde(default)]
  pub columns:    Vec<AssetColumn>,
  #[serde(default)]
  pub properties: BTreeMap<String, PropertyValue>,
}

impl Asset {
  pub fn property(&self, key: &str) -> Option<&PropertyValue> {
    self.properties.get(key)
  }

  pub fn set_property(
    &mut self,
    key: impl Into<String>,
    value: impl Into<PropertyValue>,
  ) {
    self.properties.insert(key.into(), value.into());
  }

  /// Which kind this asset describes, recovered from its type tag.
  pub fn kind(&self) -> Option<AssetKind> {
    let (_, suffix) = self.info.kind_tag.rsplit_once('_')?;
    [AssetKind::Schema, AssetKind::Table, AssetKind::View]
      .into_iter()
      .find(|k| k.type_suffix() == suffix)
  }
}
