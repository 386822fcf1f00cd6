//! Attendance-omission justification endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use tramites_core::RequestKind;
use tramites_core::roles;

use crate::storage::NewOmisionParams;

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::identity;
use super::responder;
use super::solicitudes::{ListQuery, ResponderRequest};

#[derive(Debug, Deserialize)]
pub struct OmisionCreateRequest {
    pub fecha_omision: String,
    pub tipo_omision: String,
    pub justificacion: String,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<OmisionCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;

    if req.fecha_omision.trim().is_empty()
        || req.tipo_omision.trim().is_empty()
        || req.justificacion.trim().is_empty()
    {
        return Err(ApiError::Validation(
            "fecha_omision, tipo_omision y justificacion son obligatorios".to_string(),
        ));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let nombre = auth.user.display_name();

    state
        .db
        .create_omision(
            &id,
            &NewOmisionParams {
                user_cedula: &auth.user.cedula,
                nombre_suscriptor: Some(&nombre),
                posicion: Some(&auth.user.posicion),
                instancia: Some(&auth.user.instancia),
                fecha_omision: &req.fecha_omision,
                tipo_omision: &req.tipo_omision,
                justificacion: &req.justificacion,
            },
        )
        .await?;

    info!(user_id = %auth.user.id, omision_id = %id, "omision created");
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "id": id }))))
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;
    let (limit, offset) = query.bounds();

    let owner = (!auth.holds_any(roles::REQUEST_MANAGERS)).then_some(auth.user.cedula.as_str());
    let rows = state.db.list_omisiones(owner, limit, offset).await?;

    Ok(Json(json!({ "omisiones": rows })))
}

pub async fn get_one(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;

    let omision = state.db.get_omision(&id).await?;
    if omision.user_cedula != auth.user.cedula && !auth.holds_any(roles::REQUEST_MANAGERS) {
        return Err(ApiError::Forbidden);
    }

    Ok(Json(json!({ "omision": omision })))
}

pub async fn responder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<ResponderRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;
    identity::require_any_role(&auth, &[roles::ADMIN])?;

    let body = responder::respond(
        &state,
        &auth,
        RequestKind::Omision,
        &id,
        &req.decision,
        req.comentario.as_deref(),
    )
    .await?;

    Ok(Json(body))
}
