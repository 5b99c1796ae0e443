//! JSON REST API for Assent.
//!
//! Exposes an axum [`Router`] backed by any [`assent_core::store::TermsStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(assent_api::api_router(store.clone(), policy))
//! ```

pub mod agreements;
pub mod documents;
pub mod error;
pub mod users;

use std::sync::Arc;

use assent_core::{
  policy::AgreementPolicy,
  store::{TermsStore, Written},
};
use axum::{
  Json, Router,
  http::StatusCode,
  routing::{get, post},
};
use serde_json::{Value, json};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:  Arc<S>,
  pub policy: AgreementPolicy,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), policy: self.policy }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, policy: AgreementPolicy) -> Router<()>
where
  S: TermsStore + Send + Sync + 'static,
{
  Router::new()
    .route("/", get(status))
    // Documents
    .route(
      "/documents/{name}",
      get(documents::get_latest::<S>).put(documents::put::<S>),
    )
    .route("/documents/{name}/versions", get(documents::history::<S>))
    // Agreements
    .route("/agreements", post(agreements::create::<S>))
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route("/users/{uuid}", get(users::get_one::<S>).patch(users::patch::<S>))
    .route("/users/{uuid}/agreements", get(agreements::list_for_user::<S>))
    .route("/users/{uuid}/documents", get(users::documents::<S>))
    .with_state(ApiState { store, policy })
}

/// 201 for a stored record, 200 when an idempotent write changed nothing.
fn written_status<T>(written: &Written<T>) -> StatusCode {
  if written.is_created() { StatusCode::CREATED } else { StatusCode::OK }
}

/// `GET /`: liveness probe.
async fn status() -> Json<Value> { Json(json!({ "ok": true })) }
