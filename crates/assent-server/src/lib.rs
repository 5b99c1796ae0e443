//! HTTP server assembly for Assent.
//!
//! Wraps the [`assent_api`] router with HTTP Basic auth and request tracing,
//! configured from `config.toml` and `ASSENT_*` environment variables.

pub mod auth;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use assent_core::{policy::AgreementPolicy, store::TermsStore};
use axum::{Router, middleware};
use config::{
  Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// under `ASSENT_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  pub auth_username:        String,
  /// argon2 PHC string; generate with `assent --hash-password`.
  pub auth_password_hash:   String,
  #[serde(default = "default_true")]
  pub auto_provision_users: bool,
  #[serde(default)]
  pub accept_client_dates:  bool,
}

fn default_true() -> bool { true }

impl ServerConfig {
  /// Layer `ASSENT_*` environment variables over the TOML file at `path`
  /// (which may be absent) over built-in defaults.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_sources(
      Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(Environment::with_prefix("ASSENT")),
    )
  }

  fn from_sources(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder
      .set_default("host", "0.0.0.0")?
      .set_default("port", 8080_i64)?
      .set_default("store_path", "assent.db")?
      .build()?
      .try_deserialize()
  }

  /// `store_path` with a leading `~/` expanded against `$HOME`.
  pub fn resolved_store_path(&self) -> PathBuf {
    match (self.store_path.strip_prefix("~"), std::env::var_os("HOME")) {
      (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
      _ => self.store_path.clone(),
    }
  }

  pub fn policy(&self) -> AgreementPolicy {
    AgreementPolicy {
      auto_provision_users: self.auto_provision_users,
      accept_client_dates:  self.accept_client_dates,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application [`Router`] for `store`.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: TermsStore + Send + Sync + 'static,
{
  let auth = Arc::new(AuthConfig {
    username:      config.auth_username.clone(),
    password_hash: config.auth_password_hash.clone(),
  });

  assent_api::api_router(store, config.policy())
    .layer(middleware::from_fn_with_state(auth, require_auth))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use assent_store_sqlite::SqliteStore;
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
  use tower::ServiceExt as _;

  use super::*;

  fn test_config() -> ServerConfig {
    ServerConfig {
      host:                 "127.0.0.1".to_string(),
      port:                 0,
      store_path:           PathBuf::from(":memory:"),
      auth_username:        "admin".to_string(),
      auth_password_hash:   auth::hash_password("hunter2").unwrap(),
      auto_provision_users: true,
      accept_client_dates:  false,
    }
  }

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    router(Arc::new(store), &test_config())
  }

  #[tokio::test]
  async fn status_route_is_public() {
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let res = app().await.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn api_routes_require_credentials() {
    let req = Request::builder()
      .uri("/documents/tos")
      .body(Body::empty())
      .unwrap();
    let res = app().await.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn authenticated_requests_reach_the_api() {
    let creds = B64.encode("admin:hunter2");
    let req = Request::builder()
      .uri("/documents/tos")
      .header(header::AUTHORIZATION, format!("Basic {creds}"))
      .body(Body::empty())
      .unwrap();
    let res = app().await.oneshot(req).await.unwrap();
    // Authenticated, but no such document yet.
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn policy_follows_config() {
    let mut cfg = test_config();
    cfg.auto_provision_users = false;
    cfg.accept_client_dates = true;
    let policy = cfg.policy();
    assert!(!policy.auto_provision_users);
    assert!(policy.accept_client_dates);
  }

  #[test]
  fn defaults_fill_in_missing_settings() {
    let cfg = ServerConfig::from_sources(
      Config::builder()
        .set_override("auth_username", "admin")
        .unwrap()
        .set_override("auth_password_hash", "x")
        .unwrap(),
    )
    .unwrap();
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("assent.db"));
    assert!(cfg.auto_provision_users);
    assert!(!cfg.accept_client_dates);
  }

  #[test]
  fn store_path_without_tilde_is_untouched() {
    let mut cfg = test_config();
    cfg.store_path = PathBuf::from("/var/lib/assent/assent.db");
    assert_eq!(cfg.resolved_store_path(), cfg.store_path);
  }

  #[test]
  fn missing_credentials_are_an_error() {
    assert!(ServerConfig::from_sources(Config::builder()).is_err());
  }
}
