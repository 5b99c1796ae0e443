//! HTTP Basic auth for the API, checked against an argon2 password hash.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand_core::OsRng;

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// argon2 PHC string, as printed by `assent --hash-password`.
  pub password_hash: String,
}

impl AuthConfig {
  /// Whether the request headers carry this instance's credentials.
  pub fn admits(&self, headers: &HeaderMap) -> bool {
    let Some((username, password)) = basic_credentials(headers) else {
      return false;
    };
    if username != self.username {
      return false;
    }
    PasswordHash::new(&self.password_hash).is_ok_and(|hash| {
      Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
    })
  }
}

/// Hash `password` into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Decode `Authorization: Basic <base64 user:pass>`.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let encoded = headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Basic ")?;
  let decoded = String::from_utf8(B64.decode(encoded).ok()?).ok()?;
  let (username, password) = decoded.split_once(':')?;
  Some((username.to_owned(), password.to_owned()))
}

/// Rejection for missing or wrong credentials.
#[derive(Debug)]
pub struct Unauthorized;

impl IntoResponse for Unauthorized {
  fn into_response(self) -> Response {
    let mut res = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    res.headers_mut().insert(
      header::WWW_AUTHENTICATE,
      HeaderValue::from_static("Basic realm=\"assent\""),
    );
    res
  }
}

/// Middleware guarding every route except the `/` liveness probe.
pub async fn require_auth(
  State(auth): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Response {
  if req.uri().path() == "/" || auth.admits(req.headers()) {
    return next.run(req).await;
  }
  tracing::warn!(path = %req.uri().path(), "rejected unauthenticated request");
  Unauthorized.into_response()
}

#[cfg(test)]
mod tests {
  use axum::{Router, body::Body, middleware, routing::get};
  use tower::ServiceExt as _;

  use super::*;

  fn make_config(password: &str) -> AuthConfig {
    AuthConfig {
      username:      "user".to_string(),
      password_hash: hash_password(password).unwrap(),
    }
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  fn headers(value: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    map
  }

  #[test]
  fn correct_credentials() {
    let config = make_config("secret");
    assert!(config.admits(&headers(&basic("user", "secret"))));
  }

  #[test]
  fn wrong_password() {
    let config = make_config("secret");
    assert!(!config.admits(&headers(&basic("user", "wrong"))));
  }

  #[test]
  fn wrong_username() {
    let config = make_config("secret");
    assert!(!config.admits(&headers(&basic("admin", "secret"))));
  }

  #[test]
  fn missing_header() {
    let config = make_config("secret");
    assert!(!config.admits(&HeaderMap::new()));
  }

  #[test]
  fn corrupt_stored_hash_admits_nobody() {
    let config = AuthConfig {
      username:      "user".to_string(),
      password_hash: "not-a-phc-string".to_string(),
    };
    assert!(!config.admits(&headers(&basic("user", "secret"))));
  }

  #[test]
  fn hashes_are_salted() {
    assert_ne!(hash_password("secret").unwrap(), hash_password("secret").unwrap());
  }

  #[test]
  fn invalid_base64() {
    let config = make_config("secret");
    assert!(!config.admits(&headers("Basic !!!not-base64!!!")));
  }

  fn guarded(config: AuthConfig) -> Router {
    Router::new()
      .route("/", get(|| async { "ok" }))
      .route("/users/x", get(|| async { "secret" }))
      .layer(middleware::from_fn_with_state(Arc::new(config), require_auth))
  }

  #[tokio::test]
  async fn middleware_exempts_status_route() {
    let app = guarded(make_config("secret"));
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn middleware_challenges_unauthenticated_requests() {
    let app = guarded(make_config("secret"));
    let req = Request::builder().uri("/users/x").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn middleware_admits_valid_credentials() {
    let app = guarded(make_config("secret"));
    let req = Request::builder()
      .uri("/users/x")
      .header(header::AUTHORIZATION, basic("user", "secret"))
      .body(Body::empty())
      .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
  }
}
