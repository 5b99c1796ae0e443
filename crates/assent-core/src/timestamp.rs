//! Bounds on the timestamps the ledger accepts.
//!
//! Stores persist timestamps as four-digit-year RFC 3339 text, so anything
//! outside years 0000..=9999 is refused at validation time.

use chrono::{DateTime, Datelike as _, Utc};

use crate::{Error, Result};

pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

/// Reject `at` if its year falls outside [`MIN_YEAR`]..=[`MAX_YEAR`].
pub fn check(field: &str, at: DateTime<Utc>) -> Result<DateTime<Utc>> {
  if (MIN_YEAR..=MAX_YEAR).contains(&at.year()) {
    Ok(at)
  } else {
    Err(Error::InvalidInput(format!(
      "{field} {at} is outside years {MIN_YEAR:04}-{MAX_YEAR}"
    )))
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn four_digit_years_pass() {
    for year in [0, 1970, 9999] {
      let at = Utc.with_ymd_and_hms(year, 6, 1, 0, 0, 0).unwrap();
      assert_eq!(check("date", at).unwrap(), at);
    }
  }

  #[test]
  fn years_beyond_four_digits_fail() {
    for year in [-1, 10000] {
      let at = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
      assert!(matches!(check("date", at), Err(Error::InvalidInput(_))));
    }
  }
}
