//! The `TermsStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `assent-store-sqlite`).
//! Higher layers (`assent-api`, `assent-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  agreement::{Agreement, NewAgreement},
  document::{DocumentVersion, NewVersion},
  policy::AgreementPolicy,
  reconcile::{DocumentFilter, UserDocument},
  user::{NewUser, User, UserPatch},
};

// ─── Write outcome ───────────────────────────────────────────────────────────

/// Result of an idempotent write: either a new record was stored, or an
/// equivalent one already existed and nothing changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Written<T> {
  Created(T),
  Existing(T),
}

impl<T> Written<T> {
  pub fn is_created(&self) -> bool { matches!(self, Self::Created(_)) }

  pub fn get(&self) -> &T {
    match self {
      Self::Created(t) | Self::Existing(t) => t,
    }
  }

  pub fn into_inner(self) -> T {
    match self {
      Self::Created(t) | Self::Existing(t) => t,
    }
  }
}

// ─── Error classification ────────────────────────────────────────────────────

/// Backend error types expose the domain error they carry, if any, so that
/// transports can map invariant violations without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn domain(&self) -> Option<&crate::Error>;
}

impl StoreError for crate::Error {
  fn domain(&self) -> Option<&crate::Error> { Some(self) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an Assent store backend.
///
/// Document versions and agreements are append-only. Each write checks its
/// invariants and inserts as one atomic unit; reads that touch more than one
/// table observe a single consistent snapshot.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TermsStore: Send + Sync {
  type Error: StoreError;

  // ── Document history ──────────────────────────────────────────────────

  /// Append a version to a document's history.
  ///
  /// Returns `Existing(latest)` without writing if `input.content` equals the
  /// latest content. Fails with
  /// [`Error::OrderingViolation`](crate::Error::OrderingViolation) if
  /// `valid_from` does not come after the latest version's, and with
  /// [`Error::VersionPrecedesAgreement`](crate::Error::VersionPrecedesAgreement)
  /// if it does not come after every agreement recorded for the document.
  fn put_version(
    &self,
    input: NewVersion,
  ) -> impl Future<Output = Result<Written<DocumentVersion>, Self::Error>> + Send + '_;

  /// The most recent version of `name`, or `None` if it has no versions.
  fn latest_version<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<DocumentVersion>, Self::Error>> + Send + 'a;

  /// Every version of `name`, ordered by `valid_from` ascending.
  fn version_history<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Vec<DocumentVersion>, Self::Error>> + Send + 'a;

  /// Every version of every document, grouped by name and ordered by
  /// `valid_from` within each group.
  fn list_all_versions(
    &self,
  ) -> impl Future<Output = Result<Vec<DocumentVersion>, Self::Error>> + Send + '_;

  // ── Agreements ────────────────────────────────────────────────────────

  /// Record that a user accepted the version of a document in force at
  /// `input.date`.
  ///
  /// Unknown users are created first when `policy.auto_provision_users` is
  /// set. Returns `Existing` if the user already has an agreement inside the
  /// same version's validity interval.
  fn record_agreement(
    &self,
    input: NewAgreement,
    policy: AgreementPolicy,
  ) -> impl Future<Output = Result<Written<Agreement>, Self::Error>> + Send + '_;

  /// All agreements of a user, ordered by date ascending.
  fn list_agreements(
    &self,
    user_uuid: Uuid,
  ) -> impl Future<Output = Result<Vec<Agreement>, Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Get-or-create a user with no fields besides the uuid.
  fn ensure_user(
    &self,
    uuid: Uuid,
  ) -> impl Future<Output = Result<Written<User>, Self::Error>> + Send + '_;

  /// Create a user with optional email and username. An existing uuid is
  /// returned unchanged; an email held by another user is rejected.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Written<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by uuid. Returns `None` if not found.
  fn get_user(
    &self,
    uuid: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Batch lookup; the output is index-aligned with `uuids`.
  fn get_users<'a>(
    &'a self,
    uuids: &'a [Uuid],
  ) -> impl Future<Output = Result<Vec<Option<User>>, Self::Error>> + Send + 'a;

  /// All users registered under `email` (compared case-insensitively).
  fn find_users_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;

  /// Apply a partial update. Returns `None` if the user does not exist.
  fn patch_user(
    &self,
    uuid: Uuid,
    patch: UserPatch,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Reconciliation ────────────────────────────────────────────────────

  /// Reconcile all document history against the user's agreements; see
  /// [`crate::reconcile::reconcile`]. An unknown user simply has no
  /// agreements.
  fn user_documents(
    &self,
    user_uuid: Uuid,
    filter: DocumentFilter,
  ) -> impl Future<Output = Result<Vec<UserDocument>, Self::Error>> + Send + '_;
}
