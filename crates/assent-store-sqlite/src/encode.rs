//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed nanosecond
//! fraction, so lexical order equals chronological order. UUIDs are stored as
//! hyphenated lowercase strings.

use assent_core::{agreement::Agreement, document::DocumentVersion, user::User};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `documents` row.
pub struct RawVersion {
  pub name:       String,
  pub content:    String,
  pub valid_from: String,
}

impl RawVersion {
  /// Column order: `name, content, valid_from`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      name:       row.get(0)?,
      content:    row.get(1)?,
      valid_from: row.get(2)?,
    })
  }

  pub fn into_version(self) -> Result<DocumentVersion> {
    Ok(DocumentVersion {
      name:       self.name,
      content:    self.content,
      valid_from: decode_dt(&self.valid_from)?,
    })
  }
}

/// Raw strings read directly from an `agreements` row.
pub struct RawAgreement {
  pub user_uuid:     String,
  pub document_name: String,
  pub date:          String,
}

impl RawAgreement {
  /// Column order: `user_uuid, document_name, date`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_uuid:     row.get(0)?,
      document_name: row.get(1)?,
      date:          row.get(2)?,
    })
  }

  pub fn into_agreement(self) -> Result<Agreement> {
    Ok(Agreement {
      user_uuid:     decode_uuid(&self.user_uuid)?,
      document_name: self.document_name,
      date:          decode_dt(&self.date)?,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub uuid:     String,
  pub email:    Option<String>,
  pub username: Option<String>,
}

impl RawUser {
  /// Column order: `uuid, email, username`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      uuid:     row.get(0)?,
      email:    row.get(1)?,
      username: row.get(2)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      uuid:     decode_uuid(&self.uuid)?,
      email:    self.email,
      username: self.username,
    })
  }
}
