//! Tests for the administration endpoints.

use axum::http::StatusCode;
use serde_json::json;

use super::test_helpers::{auth_user, auth_user_with_role, request, test_state};

#[tokio::test]
async fn role_endpoints_reject_unprivileged_callers() {
    let state = test_state().await;
    let (_, cookie) = auth_user(&state, "101").await;

    let body = json!({ "cedula": "101", "role_slug": "admin" });

    let (status, _) = request(&state, "GET", "/api/admin/roles", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, resp) = request(
        &state,
        "POST",
        "/api/admin/roles",
        Some(&cookie),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(resp["error"], json!("No autorizado"));

    // no cookie at all is a 401, not a 403
    let (status, _) = request(&state, "GET", "/api/admin/roles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn assign_and_remove_role_flow() {
    let state = test_state().await;
    let (_, admin_cookie) = auth_user_with_role(&state, "900", "admin").await;
    let (target, target_cookie) = auth_user(&state, "101").await;

    let body = json!({ "cedula": "101", "role_slug": "staff_manager" });

    let (status, _) = request(
        &state,
        "POST",
        "/api/admin/roles",
        Some(&admin_cookie),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        state.db.user_role_slugs(&target.id).await.unwrap(),
        vec!["staff_manager"]
    );

    // assigned role shows up through /api/me
    let (_, me) = request(&state, "GET", "/api/me", Some(&target_cookie), None).await;
    assert_eq!(me["roles"], json!(["staff_manager"]));

    let (status, resp) = request(
        &state,
        "POST",
        "/api/admin/roles",
        Some(&admin_cookie),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(resp["error"], json!("El usuario ya tiene ese rol"));

    let (status, _) = request(
        &state,
        "DELETE",
        "/api/admin/roles",
        Some(&admin_cookie),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &state,
        "DELETE",
        "/api/admin/roles",
        Some(&admin_cookie),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_assignment_unknown_user_or_role_is_not_found() {
    let state = test_state().await;
    let (_, cookie) = auth_user_with_role(&state, "900", "dev").await;

    let (status, _) = request(
        &state,
        "POST",
        "/api/admin/roles",
        Some(&cookie),
        Some(json!({ "cedula": "nope", "role_slug": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &state,
        "POST",
        "/api/admin/roles",
        Some(&cookie),
        Some(json!({ "cedula": "900", "role_slug": "supremo" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_revocation_locks_out_the_victim() {
    let state = test_state().await;
    let (_, admin_cookie) = auth_user_with_role(&state, "900", "admin").await;
    let (victim, victim_cookie) = auth_user(&state, "101").await;

    let (status, body) = request(&state, "GET", "/api/admin/sessions", Some(&admin_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let sessions = body["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);

    let victim_session = sessions
        .iter()
        .find(|s| s["user_id"] == json!(victim.id))
        .unwrap();

    let (status, _) = request(
        &state,
        "DELETE",
        "/api/admin/sessions",
        Some(&admin_cookie),
        Some(json!({ "id": victim_session["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(&state, "GET", "/api/me", Some(&victim_cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // rows are flagged, never deleted
    let (_, body) = request(&state, "GET", "/api/admin/sessions", Some(&admin_cookie), None).await;
    assert_eq!(body["sessions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn staff_listing_is_paginated_and_searchable() {
    let state = test_state().await;
    let (_, cookie) = auth_user_with_role(&state, "900", "staff_manager").await;
    auth_user(&state, "101").await;
    auth_user(&state, "202").await;

    let (status, body) = request(
        &state,
        "GET",
        "/api/admin/staff?page=1&page_size=2",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
    // every row carries effective roles
    assert!(body["users"][0]["roles"].is_array());

    let (_, body) = request(
        &state,
        "GET",
        "/api/admin/staff?search=202",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["users"][0]["cedula"], json!("202"));
}

#[tokio::test]
async fn staff_update_is_admin_only_and_validated() {
    let state = test_state().await;
    let (_, manager_cookie) = auth_user_with_role(&state, "900", "staff_manager").await;
    let (_, admin_cookie) = auth_user_with_role(&state, "901", "admin").await;
    let (target, _) = auth_user(&state, "101").await;

    let uri = format!("/api/admin/staff/{}", target.id);

    let (status, _) = request(
        &state,
        "PUT",
        &uri,
        Some(&manager_cookie),
        Some(json!({ "nombre": "María" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &state,
        "PUT",
        &uri,
        Some(&admin_cookie),
        Some(json!({ "nombre": "Ana123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &state,
        "PUT",
        &uri,
        Some(&admin_cookie),
        Some(json!({ "nombre": "María José", "posicion": "Orientadora" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nombre"], json!("María José"));
    assert_eq!(body["posicion"], json!("Orientadora"));
    // untouched fields survive the partial update
    assert_eq!(body["primer_apellido"], json!("Mora"));
}

#[tokio::test]
async fn staff_delete_is_a_soft_delete() {
    let state = test_state().await;
    let (_, admin_cookie) = auth_user_with_role(&state, "900", "admin").await;
    let (target, target_cookie) = auth_user(&state, "101").await;

    let uri = format!("/api/admin/staff/{}", target.id);

    let (status, _) = request(&state, "DELETE", &uri, Some(&admin_cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(&state, "GET", &uri, Some(&admin_cookie), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the tombstoned user can no longer resolve a session
    let (status, _) = request(&state, "GET", "/api/me", Some(&target_cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&state, "DELETE", &uri, Some(&admin_cookie), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn time_control_round_trip() {
    let state = test_state().await;
    let (_, cookie) = auth_user_with_role(&state, "900", "dev").await;

    let (status, body) = request(&state, "GET", "/api/admin/time-control", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["offset_minutes"], json!(0));
    assert_eq!(body["civil_today"], json!("2024-06-12"));
    assert_eq!(body["civil_time"], json!("12:00"));

    // -2 days via the breakdown form
    let (status, body) = request(
        &state,
        "PUT",
        "/api/admin/time-control",
        Some(&cookie),
        Some(json!({ "days": -2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["offset_minutes"], json!(-2880));

    let (_, body) = request(&state, "GET", "/api/admin/time-control", Some(&cookie), None).await;
    assert_eq!(body["civil_today"], json!("2024-06-10"));

    let (status, body) = request(&state, "DELETE", "/api/admin/time-control", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["offset_minutes"], json!(0));
}

#[tokio::test]
async fn time_control_offset_is_clamped() {
    let state = test_state().await;
    let (_, cookie) = auth_user_with_role(&state, "900", "admin").await;

    let (status, body) = request(
        &state,
        "PUT",
        "/api/admin/time-control",
        Some(&cookie),
        Some(json!({ "offset_minutes": 99_999_999 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["offset_minutes"], json!(1_576_800));
}

#[tokio::test]
async fn time_control_requires_an_offset() {
    let state = test_state().await;
    let (_, cookie) = auth_user_with_role(&state, "900", "admin").await;

    let (status, _) = request(
        &state,
        "PUT",
        "/api/admin/time-control",
        Some(&cookie),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
