//! [`SqliteStore`]: the SQLite implementation of [`TermsStore`].

use std::path::Path;

use assent_core::{
  agreement::{Agreement, NewAgreement},
  document::{Append, DocumentVersion, NewVersion, check_append},
  interval,
  policy::AgreementPolicy,
  reconcile::{self, DocumentFilter, UserDocument},
  store::{TermsStore, Written},
  user::{NewUser, User, UserPatch, normalize_email},
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use crate::{
  encode::{RawAgreement, RawUser, RawVersion, decode_dt, encode_dt, encode_uuid},
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Assent store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside an `IMMEDIATE` transaction. The transaction commits only
  /// if `f` succeeds; any error rolls back every statement it issued.
  async fn write<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let outcome = f(&tx);
        if outcome.is_ok() {
          tx.commit()?;
        }
        Ok(outcome)
      })
      .await?
  }

  /// Run `f` inside a read transaction so multi-query reads see one snapshot.
  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        Ok(f(&tx))
      })
      .await?
  }
}

// ─── Queries ─────────────────────────────────────────────────────────────────
//
// Synchronous helpers run on the connection thread, inside `read`/`write`.

fn latest_version(conn: &Connection, name: &str) -> Result<Option<DocumentVersion>> {
  conn
    .query_row(
      "SELECT name, content, valid_from FROM documents
       WHERE name = ?1 ORDER BY valid_from DESC LIMIT 1",
      rusqlite::params![name],
      RawVersion::from_row,
    )
    .optional()?
    .map(RawVersion::into_version)
    .transpose()
}

fn version_history(conn: &Connection, name: &str) -> Result<Vec<DocumentVersion>> {
  let mut stmt = conn.prepare(
    "SELECT name, content, valid_from FROM documents
     WHERE name = ?1 ORDER BY valid_from",
  )?;
  let raws = stmt
    .query_map(rusqlite::params![name], RawVersion::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawVersion::into_version).collect()
}

fn all_versions(conn: &Connection) -> Result<Vec<DocumentVersion>> {
  let mut stmt = conn.prepare(
    "SELECT name, content, valid_from FROM documents ORDER BY name, valid_from",
  )?;
  let raws = stmt
    .query_map([], RawVersion::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawVersion::into_version).collect()
}

fn agreements_for(conn: &Connection, user_uuid: Uuid) -> Result<Vec<Agreement>> {
  let mut stmt = conn.prepare(
    "SELECT user_uuid, document_name, date FROM agreements
     WHERE user_uuid = ?1 ORDER BY date, agreement_id",
  )?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(user_uuid)], RawAgreement::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawAgreement::into_agreement).collect()
}

/// Newest agreement date recorded against `name`, across all users.
fn last_agreement_date(conn: &Connection, name: &str) -> Result<Option<DateTime<Utc>>> {
  let raw: Option<String> = conn.query_row(
    "SELECT MAX(date) FROM agreements WHERE document_name = ?1",
    rusqlite::params![name],
    |row| row.get(0),
  )?;
  raw.as_deref().map(decode_dt).transpose()
}

fn get_user(conn: &Connection, uuid: Uuid) -> Result<Option<User>> {
  conn
    .query_row(
      "SELECT uuid, email, username FROM users WHERE uuid = ?1",
      rusqlite::params![encode_uuid(uuid)],
      RawUser::from_row,
    )
    .optional()?
    .map(RawUser::into_user)
    .transpose()
}

fn insert_user(conn: &Connection, user: &User) -> Result<()> {
  conn.execute(
    "INSERT INTO users (uuid, email, username) VALUES (?1, ?2, ?3)",
    rusqlite::params![encode_uuid(user.uuid), user.email, user.username],
  )?;
  Ok(())
}

/// Whether `email` belongs to some user other than `uuid`.
fn email_taken(conn: &Connection, email: &str, uuid: Uuid) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM users WHERE email = ?1 AND uuid <> ?2 LIMIT 1",
        rusqlite::params![email, encode_uuid(uuid)],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

// ─── TermsStore impl ─────────────────────────────────────────────────────────

impl TermsStore for SqliteStore {
  type Error = crate::Error;

  // ── Document history ──────────────────────────────────────────────────────

  async fn put_version(&self, input: NewVersion) -> Result<Written<DocumentVersion>> {
    let candidate = input.validate()?;

    let written = self
      .write(move |conn| {
        let latest = latest_version(conn, &candidate.name)?;
        let last_agreed = last_agreement_date(conn, &candidate.name)?;
        match (check_append(latest.as_ref(), last_agreed, &candidate)?, latest) {
          (Append::Unchanged, Some(latest)) => Ok(Written::Existing(latest)),
          _ => {
            conn.execute(
              "INSERT INTO documents (name, content, valid_from) VALUES (?1, ?2, ?3)",
              rusqlite::params![
                candidate.name,
                candidate.content,
                encode_dt(candidate.valid_from),
              ],
            )?;
            Ok(Written::Created(candidate))
          }
        }
      })
      .await?;

    match &written {
      Written::Created(v) => {
        tracing::info!(name = %v.name, valid_from = %v.valid_from, "document version appended");
      }
      Written::Existing(v) => {
        tracing::debug!(name = %v.name, "document content unchanged; no new version");
      }
    }
    Ok(written)
  }

  async fn latest_version(&self, name: &str) -> Result<Option<DocumentVersion>> {
    let name = name.to_owned();
    self.read(move |conn| latest_version(conn, &name)).await
  }

  async fn version_history(&self, name: &str) -> Result<Vec<DocumentVersion>> {
    let name = name.to_owned();
    self.read(move |conn| version_history(conn, &name)).await
  }

  async fn list_all_versions(&self) -> Result<Vec<DocumentVersion>> {
    self.read(all_versions).await
  }

  // ── Agreements ────────────────────────────────────────────────────────────

  async fn record_agreement(
    &self,
    input:  NewAgreement,
    policy: AgreementPolicy,
  ) -> Result<Written<Agreement>> {
    let agreement = input.validate()?;

    self
      .write(move |conn| {
        if get_user(conn, agreement.user_uuid)?.is_none() {
          if !policy.auto_provision_users {
            return Err(assent_core::Error::UnknownUser(agreement.user_uuid).into());
          }
          insert_user(conn, &User::provisioned(agreement.user_uuid))?;
          tracing::info!(user = %agreement.user_uuid, "provisioned user from agreement");
        }

        let history = version_history(conn, &agreement.document_name)?;
        if history.is_empty() {
          return Err(
            assent_core::Error::UnknownDocument(agreement.document_name.clone()).into(),
          );
        }
        let in_force = interval::interval_at(&history, agreement.date).ok_or_else(|| {
          assent_core::Error::DocumentNotInForce {
            name: agreement.document_name.clone(),
            date: agreement.date,
          }
        })?;

        let user_str = encode_uuid(agreement.user_uuid);
        let prior: Option<RawAgreement> = conn
          .query_row(
            "SELECT user_uuid, document_name, date FROM agreements
             WHERE user_uuid = ?1 AND document_name = ?2
               AND date >= ?3 AND (?4 IS NULL OR date < ?4)
             ORDER BY date LIMIT 1",
            rusqlite::params![
              user_str,
              agreement.document_name,
              encode_dt(in_force.from),
              in_force.until.map(encode_dt),
            ],
            RawAgreement::from_row,
          )
          .optional()?;
        if let Some(prior) = prior {
          return Ok(Written::Existing(prior.into_agreement()?));
        }

        conn.execute(
          "INSERT INTO agreements (user_uuid, document_name, date) VALUES (?1, ?2, ?3)",
          rusqlite::params![user_str, agreement.document_name, encode_dt(agreement.date)],
        )?;
        Ok(Written::Created(agreement))
      })
      .await
  }

  async fn list_agreements(&self, user_uuid: Uuid) -> Result<Vec<Agreement>> {
    self.read(move |conn| agreements_for(conn, user_uuid)).await
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn ensure_user(&self, uuid: Uuid) -> Result<Written<User>> {
    self
      .write(move |conn| {
        if let Some(user) = get_user(conn, uuid)? {
          return Ok(Written::Existing(user));
        }
        let user = User::provisioned(uuid);
        insert_user(conn, &user)?;
        Ok(Written::Created(user))
      })
      .await
  }

  async fn create_user(&self, input: NewUser) -> Result<Written<User>> {
    let user = User::from(input);

    self
      .write(move |conn| {
        if let Some(existing) = get_user(conn, user.uuid)? {
          return Ok(Written::Existing(existing));
        }
        if let Some(email) = &user.email
          && email_taken(conn, email, user.uuid)?
        {
          return Err(assent_core::Error::EmailTaken(email.clone()).into());
        }
        insert_user(conn, &user)?;
        Ok(Written::Created(user))
      })
      .await
  }

  async fn get_user(&self, uuid: Uuid) -> Result<Option<User>> {
    self.read(move |conn| get_user(conn, uuid)).await
  }

  async fn get_users(&self, uuids: &[Uuid]) -> Result<Vec<Option<User>>> {
    let uuids = uuids.to_vec();
    self
      .read(move |conn| uuids.into_iter().map(|id| get_user(conn, id)).collect())
      .await
  }

  async fn find_users_by_email(&self, email: &str) -> Result<Vec<User>> {
    let Some(email) = normalize_email(email) else {
      return Ok(Vec::new());
    };
    self
      .read(move |conn| {
        let mut stmt = conn
          .prepare("SELECT uuid, email, username FROM users WHERE email = ?1 ORDER BY uuid")?;
        let raws = stmt
          .query_map(rusqlite::params![email], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawUser::into_user).collect()
      })
      .await
  }

  async fn patch_user(&self, uuid: Uuid, patch: UserPatch) -> Result<Option<User>> {
    self
      .write(move |conn| {
        let Some(mut user) = get_user(conn, uuid)? else {
          return Ok(None);
        };
        patch.apply(&mut user);

        if let Some(email) = &user.email
          && email_taken(conn, email, uuid)?
        {
          return Err(assent_core::Error::EmailTaken(email.clone()).into());
        }

        conn.execute(
          "UPDATE users SET email = ?2, username = ?3 WHERE uuid = ?1",
          rusqlite::params![encode_uuid(uuid), user.email, user.username],
        )?;
        Ok(Some(user))
      })
      .await
  }

  // ── Reconciliation ────────────────────────────────────────────────────────

  async fn user_documents(
    &self,
    user_uuid: Uuid,
    filter:    DocumentFilter,
  ) -> Result<Vec<UserDocument>> {
    let (versions, agreements) = self
      .read(move |conn| Ok((all_versions(conn)?, agreements_for(conn, user_uuid)?)))
      .await?;

    Ok(reconcile::reconcile(versions, &agreements, filter))
  }
}
