//! Absence justification endpoints.
//!
//! Creation is the one place the submission window is enforced: every
//! justified date, and the linked solicitud's effective last date, must
//! fall on one of the two business days before the adjusted "today".

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use tramites_core::RequestKind;
use tramites_core::clock::{civil_time_hm, civil_today};
use tramites_core::roles;
use tramites_core::workdays::{format_ymd, parse_ymd, previous_business_days};

use crate::storage::{AdjuntoParams, NewJustificacionParams};

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::identity::{self, AuthInfo};
use super::responder;
use super::solicitudes::{AdjuntoInput, ListQuery, ResponderRequest};

#[derive(Debug, Deserialize)]
pub struct JustificacionCreateRequest {
    pub linked_solicitud_id: Option<String>,
    pub tipo_general: Option<String>,
    pub tipo_justificacion: String,
    #[serde(default)]
    pub es_rango: bool,
    pub fecha_inicio: String,
    pub fecha_fin: Option<String>,
    pub jornada: Option<String>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub cantidad: Option<String>,
    pub unidad: Option<String>,
    pub hora_salida: Option<String>,
    pub observaciones: Option<String>,
    pub familiar: Option<String>,
    pub adjunto_url: Option<String>,
    pub adjunto_mime: Option<String>,
    #[serde(default)]
    pub adjuntos: Vec<AdjuntoInput>,
}

fn check_window(allowed: &[NaiveDate], raw: &str) -> Result<(), ApiError> {
    let date = parse_ymd(raw)?;
    if allowed.contains(&date) {
        Ok(())
    } else {
        Err(ApiError::Conflict(format!(
            "La fecha {raw} no corresponde a los dos días hábiles anteriores"
        )))
    }
}

#[instrument(skip_all, fields(endpoint = "justificaciones_create"))]
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<JustificacionCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;

    if req.fecha_inicio.trim().is_empty() || req.tipo_justificacion.trim().is_empty() {
        return Err(ApiError::Validation(
            "fecha_inicio y tipo_justificacion son obligatorios".to_string(),
        ));
    }

    let tc = state.db.get_time_control().await?;
    let today = civil_today(state.clock.as_ref(), tc.offset_minutes);
    let allowed = previous_business_days(today, 2);

    check_window(&allowed, &req.fecha_inicio)?;

    let fecha_fin = req
        .fecha_fin
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&req.fecha_inicio);
    if req.es_rango {
        check_window(&allowed, fecha_fin)?;
    }

    if let Some(solicitud_id) = req.linked_solicitud_id.as_deref() {
        let solicitud = state
            .db
            .get_solicitud(solicitud_id)
            .await
            .map_err(|_| ApiError::NotFound("Solicitud no encontrada".to_string()))?;

        if solicitud.user_cedula != auth.user.cedula {
            return Err(ApiError::Forbidden);
        }
        check_window(&allowed, solicitud.effective_last_date())?;
    }

    let id = uuid::Uuid::new_v4().to_string();
    let nombre = auth.user.display_name();
    let justificacion_fecha = format_ymd(today);
    let justificacion_hora = civil_time_hm(state.clock.as_ref(), tc.offset_minutes);

    state
        .db
        .create_justificacion(
            &id,
            &NewJustificacionParams {
                linked_solicitud_id: req.linked_solicitud_id.as_deref(),
                user_cedula: &auth.user.cedula,
                nombre_suscriptor: Some(&nombre),
                posicion: Some(&auth.user.posicion),
                instancia: Some(&auth.user.instancia),
                tipo_general: req.tipo_general.as_deref(),
                tipo_justificacion: &req.tipo_justificacion,
                es_rango: req.es_rango,
                fecha_inicio: &req.fecha_inicio,
                fecha_fin,
                jornada: req.jornada.as_deref(),
                hora_inicio: req.hora_inicio.as_deref(),
                hora_fin: req.hora_fin.as_deref(),
                cantidad: req.cantidad.as_deref(),
                unidad: req.unidad.as_deref(),
                hora_salida: req.hora_salida.as_deref(),
                justificacion_fecha: &justificacion_fecha,
                justificacion_hora: &justificacion_hora,
                observaciones: req.observaciones.as_deref(),
                familiar: req.familiar.as_deref(),
                adjunto_url: req.adjunto_url.as_deref(),
                adjunto_mime: req.adjunto_mime.as_deref(),
            },
        )
        .await?;

    // best-effort attachment links, same policy as solicitudes
    for adjunto in &req.adjuntos {
        let result = state
            .db
            .add_justificacion_adjunto(
                &id,
                &AdjuntoParams {
                    path: adjunto.path.as_deref(),
                    public_url: adjunto.public_url.as_deref(),
                    mime: adjunto.mime.as_deref(),
                    uploaded_by_cedula: &auth.user.cedula,
                },
            )
            .await;

        if let Err(e) = result {
            warn!(justificacion_id = %id, error = %e, "attachment link failed");
        }
    }

    info!(user_id = %auth.user.id, justificacion_id = %id, "justificacion created");
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
    let rows = state.db.list_justificaciones(owner, limit, offset).await?;

    Ok(Json(json!({ "justificaciones": rows })))
}

fn can_view(auth: &AuthInfo, owner_cedula: &str) -> bool {
    auth.user.cedula == owner_cedula || auth.holds_any(roles::REQUEST_MANAGERS)
}

pub async fn get_one(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;

    let justificacion = state.db.get_justificacion(&id).await?;
    if !can_view(&auth, &justificacion.user_cedula) {
        return Err(ApiError::Forbidden);
    }
    let adjuntos = state.db.list_justificacion_adjuntos(&id).await?;

    Ok(Json(json!({ "justificacion": justificacion, "adjuntos": adjuntos })))
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
        RequestKind::Justificacion,
        &id,
        &req.decision,
        req.comentario.as_deref(),
    )
    .await?;

    Ok(Json(body))
}
