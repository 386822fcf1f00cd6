//! Infrastructure damage report endpoints.
//!
//! Reports differ from the other kinds in who may see and resolve them:
//! the `infra_manager` role sits alongside `admin`/`dev` for viewing and
//! alongside `admin` for resolution.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use tramites_core::RequestKind;
use tramites_core::roles;

use crate::storage::NewReporteParams;

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::identity;
use super::responder;
use super::solicitudes::{ListQuery, ResponderRequest};

const RESOLVERS: &[&str] = &[roles::ADMIN, roles::INFRA_MANAGER];

#[derive(Debug, Deserialize)]
pub struct ReporteCreateRequest {
    pub tipo_reporte: String,
    pub reporte: String,
    pub lugar: String,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ReporteCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;

    if req.tipo_reporte.trim().is_empty()
        || req.reporte.trim().is_empty()
        || req.lugar.trim().is_empty()
    {
        return Err(ApiError::Validation(
            "tipo_reporte, reporte y lugar son obligatorios".to_string(),
        ));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let nombre = auth.user.display_name();

    state
        .db
        .create_reporte(
            &id,
            &NewReporteParams {
                user_cedula: &auth.user.cedula,
                nombre_suscriptor: Some(&nombre),
                posicion: Some(&auth.user.posicion),
                instancia: Some(&auth.user.instancia),
                tipo_reporte: &req.tipo_reporte,
                reporte: &req.reporte,
                lugar: &req.lugar,
            },
        )
        .await?;

    info!(user_id = %auth.user.id, reporte_id = %id, "reporte created");
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "id": id }))))
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;
    let (limit, offset) = query.bounds();

    let owner = (!auth.holds_any(roles::INFRA_VIEWERS)).then_some(auth.user.cedula.as_str());
    let rows = state.db.list_reportes(owner, limit, offset).await?;

    Ok(Json(json!({ "reportes": rows })))
}

pub async fn get_one(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;

    let reporte = state.db.get_reporte(&id).await?;
    if reporte.user_cedula != auth.user.cedula && !auth.holds_any(roles::INFRA_VIEWERS) {
        return Err(ApiError::Forbidden);
    }

    Ok(Json(json!({ "reporte": reporte })))
}

pub async fn responder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<ResponderRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;
    identity::require_any_role(&auth, RESOLVERS)?;

    let body = responder::respond(
        &state,
        &auth,
        RequestKind::Reporte,
        &id,
        &req.decision,
        req.comentario.as_deref(),
    )
    .await?;

    Ok(Json(body))
}
