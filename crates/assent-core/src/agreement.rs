//! Agreements: a user's acceptance of a document at a point in time.
//!
//! An agreement does not name a version. It records *when* the user accepted
//! a document; the version it covers is whichever one was in force at that
//! moment, resolved through [`crate::interval`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, timestamp};

/// A recorded acceptance. Append-only; never updated or revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
  pub user_uuid:     Uuid,
  pub document_name: String,
  pub date:          DateTime<Utc>,
}

/// Input to [`crate::store::TermsStore::record_agreement`].
///
/// `date` is normally "now", stamped by the caller; see
/// [`crate::policy::AgreementPolicy::resolve_date`].
#[derive(Debug, Clone)]
pub struct NewAgreement {
  pub user_uuid:     Uuid,
  pub document_name: String,
  pub date:          DateTime<Utc>,
}

impl NewAgreement {
  pub fn new(
    user_uuid: Uuid,
    document_name: impl Into<String>,
    date: DateTime<Utc>,
  ) -> Self {
    Self { user_uuid, document_name: document_name.into(), date }
  }

  pub fn validate(self) -> Result<Agreement> {
    if self.document_name.is_empty() {
      return Err(Error::InvalidInput("document_name must not be empty".into()));
    }
    Ok(Agreement {
      user_uuid:     self.user_uuid,
      document_name: self.document_name,
      date:          timestamp::check("date", self.date)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn empty_document_name_is_invalid() {
    let date = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
    let err = NewAgreement::new(Uuid::nil(), "", date).validate().unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
  }

  #[test]
  fn five_digit_year_is_invalid() {
    let date = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
    let err = NewAgreement::new(Uuid::nil(), "terms", date)
      .validate()
      .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
  }
}
