//! Tests for the authentication endpoints.

use axum::http::StatusCode;
use serde_json::json;

use super::test_helpers::{auth_user, cookie_pair, raw_request, request, test_state};

fn alice_register() -> serde_json::Value {
    json!({
        "cedula": "101110111",
        "nombre": "Ana",
        "primer_apellido": "Mora",
        "segundo_apellido": "Jiménez",
        "posicion": "Docente",
        "categoria": "MT6",
        "instancia": "Diurna",
        "password": "secreta123",
    })
}

async fn login(
    state: &super::AppState,
    cedula: &str,
    password: &str,
) -> (StatusCode, Option<String>, serde_json::Value) {
    raw_request(
        state,
        "POST",
        "/api/login",
        json!({ "cedula": cedula, "password": password }),
    )
    .await
}

#[tokio::test]
async fn register_login_and_me_flow() {
    let state = test_state().await;

    let (status, body) = request(&state, "POST", "/api/register", None, Some(alice_register())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ok"], json!(true));

    let (status, set_cookie, body) = login(&state, "101110111", "secreta123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cedula"], json!("101110111"));
    assert_eq!(body["must_change_password"], json!(true));

    let set_cookie = set_cookie.unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));

    let cookie = cookie_pair(&set_cookie);
    let (status, body) = request(&state, "GET", "/api/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["cedula"], json!("101110111"));
    // no assigned roles: the display default applies
    assert_eq!(body["roles"], json!(["normal_user"]));
    // the password hash never leaves the server
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn wrong_password_and_unknown_cedula_are_both_unauthorized() {
    let state = test_state().await;
    request(&state, "POST", "/api/register", None, Some(alice_register())).await;

    let (status, _, wrong) = login(&state, "101110111", "incorrecta").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, unknown) = login(&state, "999999999", "secreta123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // identical bodies: no way to probe which cedulas exist
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn register_validates_required_fields() {
    let state = test_state().await;

    let mut body = alice_register();
    body["nombre"] = json!("");
    let (status, resp) = request(&state, "POST", "/api/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["error"].as_str().unwrap().contains("nombre"));
}

#[tokio::test]
async fn duplicate_cedula_conflicts() {
    let state = test_state().await;

    request(&state, "POST", "/api/register", None, Some(alice_register())).await;
    let (status, body) = request(&state, "POST", "/api/register", None, Some(alice_register())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("La cédula ya está registrada"));
}

#[tokio::test]
async fn omitted_password_gets_default_and_forces_change() {
    let state = test_state().await;

    let mut body = alice_register();
    body.as_object_mut().unwrap().remove("password");
    let (status, _) = request(&state, "POST", "/api/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = login(&state, "101110111", "Temporal01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["must_change_password"], json!(true));
}

#[tokio::test]
async fn change_password_rotates_the_credential() {
    let state = test_state().await;
    request(&state, "POST", "/api/register", None, Some(alice_register())).await;

    let (_, set_cookie, _) = login(&state, "101110111", "secreta123").await;
    let cookie = cookie_pair(&set_cookie.unwrap());

    let (status, _) = request(
        &state,
        "POST",
        "/api/change-password",
        Some(&cookie),
        Some(json!({ "new_password": "nueva456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = login(&state, "101110111", "secreta123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, body) = login(&state, "101110111", "nueva456").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["must_change_password"], json!(false));
}

#[tokio::test]
async fn short_password_is_rejected() {
    let state = test_state().await;
    let (_, cookie) = auth_user(&state, "101").await;

    let (status, _) = request(
        &state,
        "POST",
        "/api/change-password",
        Some(&cookie),
        Some(json!({ "new_password": "corta" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let state = test_state().await;
    let (_, cookie) = auth_user(&state, "101").await;

    let (status, _) = request(&state, "GET", "/api/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&state, "POST", "/api/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));

    // the token still carries a valid signature, but the session is gone
    let (status, _) = request(&state, "GET", "/api/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_without_session_still_clears_the_cookie() {
    let state = test_state().await;

    let (status, set_cookie, _) = raw_request(&state, "POST", "/api/logout", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(set_cookie.unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn me_requires_authentication() {
    let state = test_state().await;

    let (status, body) = request(&state, "GET", "/api/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("No autenticado"));

    let (status, _) = request(
        &state,
        "GET",
        "/api/me",
        Some("session_token=garbage"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
