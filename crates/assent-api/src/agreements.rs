//! Handlers for agreement endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/agreements` | Body: [`CreateBody`]; 201 created, 200 if already agreed |
//! | `GET`  | `/users/{uuid}/agreements` | Oldest first |

use assent_core::{
  agreement::{Agreement, NewAgreement},
  store::TermsStore,
};
use axum::{
  Json,
  extract::{Path, State},
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, written_status};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub user_uuid:     Uuid,
  pub document_name: String,
  /// Only honoured when the policy accepts client dates.
  pub date:          Option<DateTime<Utc>>,
}

/// `POST /agreements`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TermsStore,
{
  if body.date.is_some() && !state.policy.accept_client_dates {
    tracing::debug!(user = %body.user_uuid, "ignoring client-supplied agreement date");
  }
  let date = state.policy.resolve_date(body.date, Utc::now());

  let written = state
    .store
    .record_agreement(
      NewAgreement::new(body.user_uuid, body.document_name, date),
      state.policy,
    )
    .await
    .map_err(ApiError::store)?;

  if written.is_created() {
    let a = written.get();
    tracing::info!(user = %a.user_uuid, document = %a.document_name, "agreement recorded");
  }
  Ok((written_status(&written), Json(written.into_inner())))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users/{uuid}/agreements`
pub async fn list_for_user<S>(
  State(state): State<ApiState<S>>,
  Path(uuid): Path<Uuid>,
) -> Result<Json<Vec<Agreement>>, ApiError>
where
  S: TermsStore,
{
  let agreements = state
    .store
    .list_agreements(uuid)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(agreements))
}
