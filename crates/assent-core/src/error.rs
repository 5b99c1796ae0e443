//! Error types for `assent-core`.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("document not found: {0:?}")]
  DocumentNotFound(String),

  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// A version was offered with a `valid_from` that does not come strictly
  /// after the latest stored version of the same document.
  #[error(
    "document {name:?} cannot take a version valid from {attempted}: latest \
     version is valid from {latest}"
  )]
  OrderingViolation {
    name:      String,
    latest:    DateTime<Utc>,
    attempted: DateTime<Utc>,
  },

  /// A version was offered that would take effect at or before an
  /// agreement already recorded against the document, which would move that
  /// agreement onto the new version.
  #[error(
    "document {name:?} cannot take a version valid from {attempted}: an \
     agreement is recorded at {agreed}"
  )]
  VersionPrecedesAgreement {
    name:      String,
    agreed:    DateTime<Utc>,
    attempted: DateTime<Utc>,
  },

  #[error("no version of document {name:?} is in force at {date}")]
  DocumentNotInForce { name: String, date: DateTime<Utc> },

  /// Agreement references a user that does not exist and auto-provisioning
  /// is disabled.
  #[error("agreement references unknown user {0}")]
  UnknownUser(Uuid),

  /// Agreement references a document name with no versions at all.
  #[error("agreement references unknown document {0:?}")]
  UnknownDocument(String),

  #[error("email address already in use: {0}")]
  EmailTaken(String),
}

/// The taxonomy class of an [`Error`], used by transports to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  InvalidInput,
  OrderingViolation,
  DocumentNotInForce,
  ReferentialViolation,
  Conflict,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::UserNotFound(_) | Self::DocumentNotFound(_) => ErrorKind::NotFound,
      Self::InvalidInput(_) => ErrorKind::InvalidInput,
      Self::OrderingViolation { .. } | Self::VersionPrecedesAgreement { .. } => {
        ErrorKind::OrderingViolation
      }
      Self::DocumentNotInForce { .. } => ErrorKind::DocumentNotInForce,
      Self::UnknownUser(_) | Self::UnknownDocument(_) => {
        ErrorKind::ReferentialViolation
      }
      Self::EmailTaken(_) => ErrorKind::Conflict,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
