//! Users: minimal identity records that agreements hang off.
//!
//! A user may be created explicitly, or implicitly (uuid only) the first time
//! an agreement names an unknown uuid.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user record. JSON field names follow the wire format consumers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  #[serde(rename = "user_uuid")]
  pub uuid:     Uuid,
  #[serde(rename = "user_email")]
  pub email:    Option<String>,
  pub username: Option<String>,
}

impl User {
  /// A bare record carrying only an identifier.
  pub fn provisioned(uuid: Uuid) -> Self {
    Self { uuid, email: None, username: None }
  }
}

/// Input to [`crate::store::TermsStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub uuid:     Uuid,
  pub email:    Option<String>,
  pub username: Option<String>,
}

impl From<NewUser> for User {
  fn from(u: NewUser) -> Self {
    User {
      uuid:     u.uuid,
      email:    u.email.as_deref().and_then(normalize_email),
      username: u.username,
    }
  }
}

/// Partial update for [`crate::store::TermsStore::patch_user`].
/// `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
  #[serde(rename = "user_email")]
  pub email:    Option<String>,
  pub username: Option<String>,
}

impl UserPatch {
  pub fn is_empty(&self) -> bool {
    self.email.is_none() && self.username.is_none()
  }

  /// Apply this patch to `user` in place. A blank email clears the field.
  pub fn apply(self, user: &mut User) {
    if let Some(email) = self.email {
      user.email = normalize_email(&email);
    }
    if let Some(username) = self.username {
      user.username = Some(username);
    }
  }
}

/// Trimmed and lower-cased, or `None` when nothing is left after trimming.
pub fn normalize_email(email: &str) -> Option<String> {
  let email = email.trim();
  (!email.is_empty()).then(|| email.to_lowercase())
}
