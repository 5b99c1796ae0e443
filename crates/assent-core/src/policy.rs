//! Caller-level policy for recording agreements.
//!
//! Two questions are left open by the ledger itself: whether an agreement may
//! implicitly create its user, and whether a caller may choose the agreement
//! date instead of taking server time. Both are explicit toggles here.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AgreementPolicy {
  /// Create a bare user record when an agreement names an unknown uuid.
  /// When `false`, such agreements fail with
  /// [`Error::UnknownUser`](crate::Error::UnknownUser).
  pub auto_provision_users: bool,
  /// Honour a client-supplied agreement date. When `false`, any supplied
  /// date is ignored in favour of server time.
  pub accept_client_dates:  bool,
}

impl Default for AgreementPolicy {
  fn default() -> Self {
    Self { auto_provision_users: true, accept_client_dates: false }
  }
}

impl AgreementPolicy {
  /// Pick the date to record for an agreement received at `now`.
  pub fn resolve_date(
    &self,
    supplied: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
  ) -> DateTime<Utc> {
    match supplied {
      Some(date) if self.accept_client_dates => date,
      _ => now,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn default_provisions_users_and_uses_server_time() {
    let policy = AgreementPolicy::default();
    assert!(policy.auto_provision_users);

    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let past = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(policy.resolve_date(Some(past), now), now);
    assert_eq!(policy.resolve_date(None, now), now);
  }

  #[test]
  fn client_dates_honoured_when_enabled() {
    let policy = AgreementPolicy { accept_client_dates: true, ..Default::default() };

    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let past = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(policy.resolve_date(Some(past), now), past);
    assert_eq!(policy.resolve_date(None, now), now);
  }
}
