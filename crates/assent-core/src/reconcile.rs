//! Reconciliation of document history against a user's agreements.
//!
//! For every version of every document, find the user's agreement (if any)
//! whose date falls inside that version's validity interval. The result is
//! never stored; it is recomputed from the two append-only logs on each read.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{agreement::Agreement, document::DocumentVersion, interval};

// ─── View ────────────────────────────────────────────────────────────────────

/// One version of one document, annotated with when the user accepted it.
///
/// `agreement_date` always serialises, as `null` when absent, so consumers
/// can tell "not agreed" apart from "field not returned".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
  pub name:           String,
  pub content:        String,
  pub valid_from:     DateTime<Utc>,
  pub agreement_date: Option<DateTime<Utc>>,
}

/// Which reconciliation entries to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFilter {
  #[default]
  All,
  /// Only versions the user has accepted.
  Agreed,
  /// Only versions still awaiting acceptance.
  Outstanding,
}

impl DocumentFilter {
  /// Map an optional `agreed=<bool>` query flag onto a filter.
  pub fn from_agreed(agreed: Option<bool>) -> Self {
    match agreed {
      None => Self::All,
      Some(true) => Self::Agreed,
      Some(false) => Self::Outstanding,
    }
  }

  pub fn keeps(self, doc: &UserDocument) -> bool {
    match self {
      Self::All => true,
      Self::Agreed => doc.agreement_date.is_some(),
      Self::Outstanding => doc.agreement_date.is_none(),
    }
  }
}

// ─── Algorithm ───────────────────────────────────────────────────────────────

/// Join `versions` with one user's `agreements` by validity interval.
///
/// `versions` may span any number of documents and arrive in any order.
/// `agreements` should belong to a single user. Each version matches at most
/// one agreement: the earliest whose date lies in its interval. Agreements
/// dated before a document's first version match nothing.
///
/// Output is ordered by agreement date with absent dates first, ties broken
/// by `(name, valid_from)`.
pub fn reconcile(
  mut versions: Vec<DocumentVersion>,
  agreements: &[Agreement],
  filter: DocumentFilter,
) -> Vec<UserDocument> {
  versions.sort_by(|a, b| {
    a.name.cmp(&b.name).then(a.valid_from.cmp(&b.valid_from))
  });

  let mut dates: HashMap<&str, Vec<DateTime<Utc>>> = HashMap::new();
  for a in agreements {
    dates.entry(a.document_name.as_str()).or_default().push(a.date);
  }
  for d in dates.values_mut() {
    d.sort_unstable();
  }

  let mut matched: Vec<Option<DateTime<Utc>>> = Vec::with_capacity(versions.len());
  for history in versions.chunk_by(|a, b| a.name == b.name) {
    let accepted = dates
      .get(history[0].name.as_str())
      .map(Vec::as_slice)
      .unwrap_or_default();
    matched.extend(merge(history, accepted));
  }

  let mut out: Vec<UserDocument> = versions
    .into_iter()
    .zip(matched)
    .map(|(v, agreement_date)| UserDocument {
      name: v.name,
      content: v.content,
      valid_from: v.valid_from,
      agreement_date,
    })
    .filter(|doc| filter.keeps(doc))
    .collect();

  out.sort_by(|a, b| {
    a.agreement_date
      .cmp(&b.agreement_date)
      .then_with(|| a.name.cmp(&b.name))
      .then(a.valid_from.cmp(&b.valid_from))
  });
  out
}

/// Two-pointer merge of one document's sorted history with sorted agreement
/// dates. Returns the matched date per version, index-aligned with `history`.
fn merge(
  history: &[DocumentVersion],
  accepted: &[DateTime<Utc>],
) -> Vec<Option<DateTime<Utc>>> {
  let mut j = 0;
  interval::intervals(history)
    .into_iter()
    .map(|iv| {
      while j < accepted.len() && accepted[j] < iv.from {
        j += 1;
      }
      let hit = accepted.get(j).copied().filter(|d| iv.contains(*d));
      // Later agreements inside the same interval are duplicates.
      while j < accepted.len() && !iv.ends_before(accepted[j]) {
        j += 1;
      }
      hit
    })
    .collect()
}
