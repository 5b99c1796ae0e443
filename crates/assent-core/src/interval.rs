//! Validity intervals.
//!
//! Version `v_i` of a document is in force over the half-open range
//! `[v_i.valid_from, v_{i+1}.valid_from)`; the latest version's range is
//! unbounded above. Over one document's history the intervals therefore tile
//! `[first.valid_from, +inf)` with no gaps and no overlaps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::DocumentVersion;

/// A half-open time range `[from, until)`. `until == None` means +infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityInterval {
  pub from:  DateTime<Utc>,
  pub until: Option<DateTime<Utc>>,
}

impl ValidityInterval {
  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    at >= self.from && self.until.is_none_or(|until| at < until)
  }

  /// Whether `at` lies at or beyond the upper bound.
  pub fn ends_before(&self, at: DateTime<Utc>) -> bool {
    self.until.is_some_and(|until| at >= until)
  }
}

/// Derive the validity interval of each version in `history`.
///
/// `history` must hold the versions of a single document ordered by
/// `valid_from` ascending; the output is index-aligned with it.
pub fn intervals(history: &[DocumentVersion]) -> Vec<ValidityInterval> {
  history
    .iter()
    .enumerate()
    .map(|(i, v)| ValidityInterval {
      from:  v.valid_from,
      until: history.get(i + 1).map(|next| next.valid_from),
    })
    .collect()
}

/// Index of the version of `history` in force at `at`, if any.
///
/// Same ordering requirement as [`intervals`]. A date before the first
/// version yields `None`; any later date lands in exactly one interval.
pub fn in_force_at(history: &[DocumentVersion], at: DateTime<Utc>) -> Option<usize> {
  history
    .partition_point(|v| v.valid_from <= at)
    .checked_sub(1)
}

/// The interval of the version in force at `at`, if any.
pub fn interval_at(
  history: &[DocumentVersion],
  at: DateTime<Utc>,
) -> Option<ValidityInterval> {
  let i = in_force_at(history, at)?;
  Some(ValidityInterval {
    from:  history[i].valid_from,
    until: history.get(i + 1).map(|next| next.valid_from),
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
  }

  fn history(dates: &[DateTime<Utc>]) -> Vec<DocumentVersion> {
    dates
      .iter()
      .enumerate()
      .map(|(i, d)| DocumentVersion {
        name:       "terms".into(),
        content:    format!("v{i}"),
        valid_from: *d,
      })
      .collect()
  }

  #[test]
  fn intervals_tile_history_without_gaps() {
    let h = history(&[at(2001, 1, 1), at(2002, 1, 1), at(2003, 6, 1)]);
    let iv = intervals(&h);

    assert_eq!(iv.len(), 3);
    assert_eq!(iv[0].from, h[0].valid_from);
    for pair in iv.windows(2) {
      assert_eq!(pair[0].until, Some(pair[1].from));
    }
    assert_eq!(iv[2].until, None);
  }

  #[test]
  fn interval_is_half_open() {
    let h = history(&[at(2001, 1, 1), at(2002, 1, 1)]);
    let iv = intervals(&h);

    assert!(iv[0].contains(at(2001, 1, 1)));
    assert!(!iv[0].contains(at(2002, 1, 1)));
    assert!(iv[1].contains(at(2002, 1, 1)));
    assert!(iv[1].contains(at(2100, 1, 1)));
  }

  #[test]
  fn every_date_after_first_version_is_in_exactly_one_interval() {
    let h = history(&[at(2001, 1, 1), at(2002, 1, 1), at(2003, 1, 1)]);
    let iv = intervals(&h);

    for probe in [at(2001, 1, 1), at(2001, 7, 1), at(2002, 1, 1), at(2050, 1, 1)] {
      let hits = iv.iter().filter(|i| i.contains(probe)).count();
      assert_eq!(hits, 1, "probe {probe}");
    }
    assert!(iv.iter().all(|i| !i.contains(at(2000, 12, 31))));
  }

  #[test]
  fn in_force_at_finds_current_version() {
    let h = history(&[at(2001, 1, 1), at(2002, 1, 1)]);

    assert_eq!(in_force_at(&h, at(2000, 6, 1)), None);
    assert_eq!(in_force_at(&h, at(2001, 1, 1)), Some(0));
    assert_eq!(in_force_at(&h, at(2001, 6, 1)), Some(0));
    assert_eq!(in_force_at(&h, at(2002, 1, 1)), Some(1));
    assert_eq!(in_force_at(&[], at(2002, 1, 1)), None);
  }

  #[test]
  fn interval_at_matches_intervals() {
    let h = history(&[at(2001, 1, 1), at(2002, 1, 1)]);
    assert_eq!(interval_at(&h, at(2001, 6, 1)), Some(intervals(&h)[0]));
    assert_eq!(interval_at(&h, at(1999, 1, 1)), None);
  }
}
