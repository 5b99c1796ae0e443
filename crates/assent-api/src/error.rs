//! API error type and [`axum::response::IntoResponse`] implementation.

use assent_core::{ErrorKind, store::StoreError};
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The request contradicts stored state (history order, unique email).
  #[error("conflict: {0}")]
  Conflict(String),

  /// The request is well-formed but violates an invariant of the ledger.
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error by the domain error it carries, if any.
  pub fn store<E: StoreError>(e: E) -> Self {
    let Some(kind) = e.domain().map(assent_core::Error::kind) else {
      return ApiError::Store(Box::new(e));
    };
    let message = e.to_string();
    match kind {
      ErrorKind::NotFound => ApiError::NotFound(message),
      ErrorKind::InvalidInput => ApiError::BadRequest(message),
      ErrorKind::OrderingViolation | ErrorKind::Conflict => ApiError::Conflict(message),
      ErrorKind::DocumentNotInForce | ErrorKind::ReferentialViolation => {
        ApiError::Unprocessable(message)
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
