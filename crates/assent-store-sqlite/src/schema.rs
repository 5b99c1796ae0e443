//! SQL schema for the Assent SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
///
/// Timestamps are fixed-width RFC 3339 strings (see `encode::encode_dt`), so
/// text comparison orders them chronologically.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    uuid      TEXT PRIMARY KEY,
    email     TEXT,            -- lower-cased
    username  TEXT
);

-- Document versions are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS documents (
    name        TEXT NOT NULL CHECK (name <> ''),
    content     TEXT NOT NULL CHECK (content <> ''),
    valid_from  TEXT NOT NULL CHECK (valid_from <> ''),
    PRIMARY KEY (name, valid_from)
);

-- History is monotonic per name.
CREATE TRIGGER IF NOT EXISTS documents_valid_from_order
BEFORE INSERT ON documents
WHEN EXISTS (
    SELECT 1 FROM documents
    WHERE name = NEW.name AND valid_from >= NEW.valid_from
)
BEGIN
    SELECT RAISE(ABORT, 'documents_valid_from_order');
END;

-- Agreements are append-only too.
CREATE TABLE IF NOT EXISTS agreements (
    agreement_id   INTEGER PRIMARY KEY,
    user_uuid      TEXT NOT NULL REFERENCES users(uuid),
    document_name  TEXT NOT NULL,
    date           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS users_email_idx      ON users(email);
CREATE INDEX IF NOT EXISTS agreements_user_idx  ON agreements(user_uuid, document_name, date);
CREATE INDEX IF NOT EXISTS agreements_doc_idx   ON agreements(document_name, date);

PRAGMA user_version = 1;
";
