//! Document versions: immutable snapshots of a named document.
//!
//! A document is nothing more than the set of versions sharing a `name`.
//! Versions are append-only and strictly ordered by `valid_from`; each one is
//! in force from its `valid_from` until the next version supersedes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, timestamp};

// ─── DocumentVersion ─────────────────────────────────────────────────────────

/// One stored version of a document. Identity is `(name, valid_from)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVersion {
  pub name:       String,
  pub content:    String,
  pub valid_from: DateTime<Utc>,
}

// ─── NewVersion ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::TermsStore::put_version`].
///
/// `valid_from` is optional only so that a missing timestamp can be reported
/// as [`Error::InvalidInput`] instead of being silently defaulted.
#[derive(Debug, Clone)]
pub struct NewVersion {
  pub name:       String,
  pub content:    String,
  pub valid_from: Option<DateTime<Utc>>,
}

impl NewVersion {
  pub fn new(
    name: impl Into<String>,
    content: impl Into<String>,
    valid_from: DateTime<Utc>,
  ) -> Self {
    Self {
      name:       name.into(),
      content:    content.into(),
      valid_from: Some(valid_from),
    }
  }

  /// Check the field-level constraints and produce the version to store.
  pub fn validate(self) -> Result<DocumentVersion> {
    if self.name.is_empty() {
      return Err(Error::InvalidInput("document name must not be empty".into()));
    }
    if self.content.is_empty() {
      return Err(Error::InvalidInput(
        "document content must not be empty".into(),
      ));
    }
    let valid_from = self
      .valid_from
      .ok_or_else(|| Error::InvalidInput("valid_from is required".into()))?;
    let valid_from = timestamp::check("valid_from", valid_from)?;

    Ok(DocumentVersion { name: self.name, content: self.content, valid_from })
  }
}

// ─── Append decision ─────────────────────────────────────────────────────────

/// What a store should do with a validated candidate given the current latest
/// version of the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Append {
  /// Content is unchanged; keep the existing latest version as-is.
  Unchanged,
  /// The candidate extends the history.
  Insert,
}

/// Decide whether `candidate` may be appended after `latest`.
///
/// Unchanged content wins over ordering: re-putting the current content is a
/// no-op whatever its timestamp. Otherwise `valid_from` must be strictly later
/// than the latest version's, and strictly later than `last_agreed`, the
/// newest agreement date recorded for the document. A version taking effect
/// at or before that agreement would re-attribute it.
pub fn check_append(
  latest: Option<&DocumentVersion>,
  last_agreed: Option<DateTime<Utc>>,
  candidate: &DocumentVersion,
) -> Result<Append> {
  if let Some(latest) = latest {
    if latest.content == candidate.content {
      return Ok(Append::Unchanged);
    }
    if candidate.valid_from <= latest.valid_from {
      return Err(Error::OrderingViolation {
        name:      candidate.name.clone(),
        latest:    latest.valid_from,
        attempted: candidate.valid_from,
      });
    }
  }

  if let Some(agreed) = last_agreed
    && candidate.valid_from <= agreed
  {
    return Err(Error::VersionPrecedesAgreement {
      name: candidate.name.clone(),
      agreed,
      attempted: candidate.valid_from,
    });
  }

  Ok(Append::Insert)
}
