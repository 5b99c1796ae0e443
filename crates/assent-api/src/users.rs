//! Handlers for `/users` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/users` | `?uuids=a,b` or `?email=...`; one is required |
//! | `POST`  | `/users` | Body: [`CreateBody`]; 201 whether or not the user existed |
//! | `GET`   | `/users/{uuid}` | 404 if not found |
//! | `PATCH` | `/users/{uuid}` | Body: `{"user_email":"...","username":"..."}`; 202 |
//! | `GET`   | `/users/{uuid}/documents` | Reconciled documents; `?agreed=false` for outstanding only |

use assent_core::{
  reconcile::{DocumentFilter, UserDocument},
  store::TermsStore,
  user::{NewUser, User, UserPatch},
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Comma-separated uuids; results keep this order, `null` for misses.
  pub uuids: Option<String>,
  pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UsersBody {
  pub users: Vec<Option<User>>,
}

/// `GET /users?uuids=<a,b,...>` or `GET /users?email=<address>`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<UsersBody>, ApiError>
where
  S: TermsStore,
{
  if let Some(raw) = params.uuids.as_deref().filter(|s| !s.is_empty()) {
    let uuids = raw
      .split(',')
      .map(|s| {
        Uuid::parse_str(s.trim())
          .map_err(|_| ApiError::BadRequest(format!("bad uuid: {s}")))
      })
      .collect::<Result<Vec<_>, _>>()?;
    let users = state.store.get_users(&uuids).await.map_err(ApiError::store)?;
    return Ok(Json(UsersBody { users }));
  }

  if let Some(email) = params.email.as_deref().filter(|s| !s.is_empty()) {
    let users = state
      .store
      .find_users_by_email(email)
      .await
      .map_err(ApiError::store)?;
    return Ok(Json(UsersBody { users: users.into_iter().map(Some).collect() }));
  }

  Err(ApiError::BadRequest(
    "requires either a uuids or email query param".into(),
  ))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub user_uuid:  Uuid,
  pub user_email: Option<String>,
  pub username:   Option<String>,
}

/// `POST /users`: 201 whether or not the uuid was already registered.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TermsStore,
{
  if body.username.as_deref() == Some("") {
    return Err(ApiError::BadRequest("username must not be empty".into()));
  }
  let written = state
    .store
    .create_user(NewUser {
      uuid:     body.user_uuid,
      email:    body.user_email,
      username: body.username,
    })
    .await
    .map_err(ApiError::store)?;
  if written.is_created() {
    tracing::info!(user = %written.get().uuid, "user created");
  }
  Ok(StatusCode::CREATED)
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/{uuid}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(uuid): Path<Uuid>,
) -> Result<Json<User>, ApiError>
where
  S: TermsStore,
{
  let user = state
    .store
    .get_user(uuid)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {uuid} not found")))?;
  Ok(Json(user))
}

// ─── Patch ────────────────────────────────────────────────────────────────────

/// `PATCH /users/{uuid}`: returns 202 + the updated user.
pub async fn patch<S>(
  State(state): State<ApiState<S>>,
  Path(uuid): Path<Uuid>,
  Json(body): Json<UserPatch>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TermsStore,
{
  if body.is_empty() {
    return Err(ApiError::BadRequest(
      "patch must set user_email or username".into(),
    ));
  }
  let user = state
    .store
    .patch_user(uuid, body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {uuid} not found")))?;
  Ok((StatusCode::ACCEPTED, Json(user)))
}

// ─── Documents ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DocumentsParams {
  /// `false`: only versions awaiting acceptance; `true`: only accepted ones.
  pub agreed: Option<bool>,
}

/// `GET /users/{uuid}/documents[?agreed=false]`
pub async fn documents<S>(
  State(state): State<ApiState<S>>,
  Path(uuid): Path<Uuid>,
  Query(params): Query<DocumentsParams>,
) -> Result<Json<Vec<UserDocument>>, ApiError>
where
  S: TermsStore,
{
  let docs = state
    .store
    .user_documents(uuid, DocumentFilter::from_agreed(params.agreed))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(docs))
}
