//! Permission request endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use tramites_core::RequestKind;
use tramites_core::roles;

use crate::storage::{AdjuntoParams, NewSolicitudParams, Solicitud};

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::identity::{self, AuthInfo};
use super::responder;

/// Attachment reference carried in a create request: the file itself was
/// already stored through the upload endpoint.
#[derive(Debug, Deserialize)]
pub struct AdjuntoInput {
    pub path: Option<String>,
    pub public_url: Option<String>,
    pub mime: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SolicitudCreateRequest {
    pub tipo_general: Option<String>,
    pub tipo_solicitud: String,
    pub familiar: Option<String>,
    #[serde(default)]
    pub es_rango: bool,
    pub fecha_inicio: String,
    pub fecha_fin: Option<String>,
    pub jornada: Option<String>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub hora: Option<String>,
    pub cantidad: Option<String>,
    pub unidad: Option<String>,
    pub observaciones: Option<String>,
    pub hora_salida: Option<String>,
    pub adjunto_url: Option<String>,
    pub adjunto_mime: Option<String>,
    #[serde(default)]
    pub adjuntos: Vec<AdjuntoInput>,
}

fn can_view(auth: &AuthInfo, owner_cedula: &str) -> bool {
    auth.user.cedula == owner_cedula || auth.holds_any(roles::REQUEST_MANAGERS)
}

/// Link attachments after the main insert. A failed link never rolls the
/// record back; it is logged and the response stays 201.
async fn link_adjuntos(state: &AppState, auth: &AuthInfo, solicitud_id: &str, adjuntos: &[AdjuntoInput]) {
    for adjunto in adjuntos {
        let result = state
            .db
            .add_solicitud_adjunto(
                solicitud_id,
                &AdjuntoParams {
                    path: adjunto.path.as_deref(),
                    public_url: adjunto.public_url.as_deref(),
                    mime: adjunto.mime.as_deref(),
                    uploaded_by_cedula: &auth.user.cedula,
                },
            )
            .await;

        if let Err(e) = result {
            warn!(solicitud_id = %solicitud_id, error = %e, "attachment link failed");
        }
    }
}

#[instrument(skip_all, fields(endpoint = "solicitudes_create"))]
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SolicitudCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;

    let fecha_fin = req.fecha_fin.as_deref().unwrap_or("");
    let required = [
        ("fecha_inicio", req.fecha_inicio.as_str()),
        ("fecha_fin", fecha_fin),
        ("tipo_solicitud", req.tipo_solicitud.as_str()),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("Campo requerido: {name}")));
        }
    }

    let id = uuid::Uuid::new_v4().to_string();
    let nombre = auth.user.display_name();

    state
        .db
        .create_solicitud(
            &id,
            &NewSolicitudParams {
                user_cedula: &auth.user.cedula,
                nombre_solicitante: Some(&nombre),
                posicion: Some(&auth.user.posicion),
                instancia: Some(&auth.user.instancia),
                tipo_general: req.tipo_general.as_deref(),
                tipo_solicitud: &req.tipo_solicitud,
                familiar: req.familiar.as_deref(),
                es_rango: req.es_rango,
                fecha_inicio: &req.fecha_inicio,
                fecha_fin,
                jornada: req.jornada.as_deref(),
                hora_inicio: req.hora_inicio.as_deref(),
                hora_fin: req.hora_fin.as_deref(),
                hora_compact: req.hora.as_deref(),
                cantidad: req.cantidad.as_deref(),
                unidad: req.unidad.as_deref(),
                observaciones: req.observaciones.as_deref(),
                hora_salida: req.hora_salida.as_deref(),
                adjunto_url: req.adjunto_url.as_deref(),
                adjunto_mime: req.adjunto_mime.as_deref(),
            },
        )
        .await?;

    link_adjuntos(&state, &auth, &id, &req.adjuntos).await;

    info!(user_id = %auth.user.id, solicitud_id = %id, "solicitud created");
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "id": id }))))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListQuery {
    pub fn bounds(&self) -> (u32, u32) {
        (self.limit.unwrap_or(50).clamp(1, 200), self.offset.unwrap_or(0))
    }
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;
    let (limit, offset) = query.bounds();

    let owner = (!auth.holds_any(roles::REQUEST_MANAGERS)).then_some(auth.user.cedula.as_str());
    let rows = state.db.list_solicitudes(owner, limit, offset).await?;

    Ok(Json(json!({ "solicitudes": rows })))
}

async fn load_visible(
    state: &AppState,
    auth: &AuthInfo,
    id: &str,
) -> ApiResult<Solicitud> {
    let solicitud = state.db.get_solicitud(id).await?;
    if !can_view(auth, &solicitud.user_cedula) {
        return Err(ApiError::Forbidden);
    }
    Ok(solicitud)
}

pub async fn get_one(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;

    let solicitud = load_visible(&state, &auth, &id).await?;
    let adjuntos = state.db.list_solicitud_adjuntos(&id).await?;

    Ok(Json(json!({ "solicitud": solicitud, "adjuntos": adjuntos })))
}

#[derive(Debug, Deserialize)]
pub struct ResponderRequest {
    pub decision: String,
    pub comentario: Option<String>,
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
        RequestKind::Solicitud,
        &id,
        &req.decision,
        req.comentario.as_deref(),
    )
    .await?;

    Ok(Json(body))
}

pub async fn pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;

    let solicitud = load_visible(&state, &auth, &id).await?;
    let adjuntos = state.db.list_solicitud_adjuntos(&id).await?;

    // genpdf rendering is CPU-bound; keep it off the async workers
    let fonts_dir = state.fonts_dir.clone();
    let bytes = tokio::task::spawn_blocking(move || {
        crate::pdf::render_solicitud(&solicitud, &adjuntos, &fonts_dir)
    })
    .await
    .map_err(|e| ApiError::Internal(e.into()))??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"solicitud-{id}.pdf\""),
            ),
        ],
        bytes,
    ))
}
