//! SQL schema for the local state store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One snapshot per connector; saves replace the whole row.
CREATE TABLE IF NOT EXISTS connector_state (
    connector_id TEXT PRIMARY KEY,
    state_json   TEXT NOT NULL,   -- JSON object
    updated_at   TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
