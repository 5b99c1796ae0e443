//! Handlers for `/documents` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/documents/{name}` | Body: `{"content":"..."}`; `valid_from` is server time |
//! | `GET`  | `/documents/{name}` | Latest version; 404 if the document has none |
//! | `GET`  | `/documents/{name}/versions` | Full history, oldest first |

use assent_core::{
  document::{DocumentVersion, NewVersion},
  store::TermsStore,
};
use axum::{
  Json,
  extract::{Path, State},
  response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{ApiState, error::ApiError, written_status};

// ─── Put ──────────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /documents/{name}`. Any other fields (a `name`
/// or `valid_from` from an older client) are ignored.
#[derive(Debug, Deserialize)]
pub struct PutBody {
  pub content: String,
}

/// `PUT /documents/{name}`: 201 + the new version, or 200 + the unchanged
/// latest version when the content is identical.
pub async fn put<S>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
  Json(body): Json<PutBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TermsStore,
{
  let written = state
    .store
    .put_version(NewVersion::new(name, body.content, Utc::now()))
    .await
    .map_err(ApiError::store)?;
  Ok((written_status(&written), Json(written.into_inner())))
}

// ─── Get latest ───────────────────────────────────────────────────────────────

/// `GET /documents/{name}`
pub async fn get_latest<S>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
) -> Result<Json<DocumentVersion>, ApiError>
where
  S: TermsStore,
{
  let version = state
    .store
    .latest_version(&name)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("document {name:?} not found")))?;
  Ok(Json(version))
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /documents/{name}/versions`: 404 if the document has no versions.
pub async fn history<S>(
  State(state): State<ApiState<S>>,
  Path(name): Path<String>,
) -> Result<Json<Vec<DocumentVersion>>, ApiError>
where
  S: TermsStore,
{
  let versions = state
    .store
    .version_history(&name)
    .await
    .map_err(ApiError::store)?;
  if versions.is_empty() {
    return Err(ApiError::NotFound(format!("document {name:?} not found")));
  }
  Ok(Json(versions))
}
