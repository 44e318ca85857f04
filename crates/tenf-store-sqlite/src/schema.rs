//! SQL schema for the blob table.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per blob key. Values are whole JSON documents; a write replaces
-- the document wholesale.
CREATE TABLE IF NOT EXISTS blobs (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
