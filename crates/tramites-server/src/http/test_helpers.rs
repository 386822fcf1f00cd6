//! Shared helpers for HTTP handler tests.
//!
//! Each test builds a fresh in-memory state with the clock pinned to
//! Wednesday 2024-06-12 (noon, civil time), so the submission window is
//! always {2024-06-11, 2024-06-10}.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::NaiveDateTime;
use serde_json::Value;
use tower::ServiceExt;

use tramites_core::clock::FixedClock;

use crate::auth::TokenManager;
use crate::blobstore::LocalBlobStore;
use crate::storage::{Database, NewUserParams, User, unix_timestamp};

use super::cookies::SESSION_COOKIE;
use super::{AppState, CookieSettings, router};

/// 18:00 UTC is 12:00 in Costa Rica; 2024-06-12 is a Wednesday.
pub const TEST_NOW_UTC: &str = "2024-06-12 18:00:00";

pub async fn test_state() -> AppState {
    let dir = tempfile::tempdir().unwrap().keep();
    let now = NaiveDateTime::parse_from_str(TEST_NOW_UTC, "%Y-%m-%d %H:%M:%S")
        .unwrap()
        .and_utc();

    AppState {
        db: Database::open_in_memory().await.unwrap(),
        tokens: TokenManager::new(b"test-secret", 3600),
        cookies: CookieSettings::default(),
        blobs: Arc::new(LocalBlobStore::new(dir, "/files")),
        clock: Arc::new(FixedClock(now)),
        fonts_dir: PathBuf::from("fonts"),
    }
}

/// Create a user directly in storage and open a session for them.
/// Returns the user and a ready-to-send `Cookie` header value. The stored
/// hash is not a real argon2 hash; password-based login tests go through
/// the register endpoint instead.
pub async fn auth_user(state: &AppState, cedula: &str) -> (User, String) {
    let id = uuid::Uuid::new_v4().to_string();
    let user = state
        .db
        .create_user(
            &id,
            &NewUserParams {
                cedula,
                nombre: "Ana",
                segundo_nombre: None,
                primer_apellido: "Mora",
                segundo_apellido: "Jiménez",
                posicion: "Docente",
                categoria: "MT6",
                instancia: "Diurna",
                password_hash: "not-a-real-hash",
                must_change_password: false,
            },
        )
        .await
        .unwrap();

    let session_id = uuid::Uuid::new_v4().to_string();
    state
        .db
        .create_session(&session_id, &user.id, unix_timestamp() + 3600)
        .await
        .unwrap();
    let (token, _) = state.tokens.issue(&user.id, &session_id).unwrap();

    (user, format!("{SESSION_COOKIE}={token}"))
}

/// `auth_user` plus a role assignment.
pub async fn auth_user_with_role(state: &AppState, cedula: &str, slug: &str) -> (User, String) {
    let (user, cookie) = auth_user(state, cedula).await;
    grant_role(state, &user.id, slug).await;
    (user, cookie)
}

pub async fn grant_role(state: &AppState, user_id: &str, slug: &str) {
    let role = state.db.get_role_by_slug(slug).await.unwrap();
    state.db.assign_role(user_id, role.id).await.unwrap();
}

/// Fire a JSON request at a fresh router over the shared state and
/// collect the decoded response.
pub async fn request(
    state: &AppState,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let req = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

/// Pull the `Set-Cookie` value out of a raw response.
pub async fn raw_request(
    state: &AppState,
    method: &str,
    uri: &str,
    body: Value,
) -> (StatusCode, Option<String>, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, set_cookie, value)
}

/// The cookie pair (`name=value`) from a full `Set-Cookie` header.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .to_string()
}
