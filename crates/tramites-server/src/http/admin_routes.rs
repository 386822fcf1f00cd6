//! Administration endpoints: role assignment, session oversight, staff
//! management, and the server clock offset.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use tramites_core::clock::{civil_now, civil_time_hm, civil_today, clamp_offset};
use tramites_core::workdays::format_ymd;
use tramites_core::roles;

use crate::storage::{DatabaseError, User};

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::identity::{self, AuthInfo};

const ADMIN_OR_DEV: &[&str] = &[roles::ADMIN, roles::DEV];
const STAFF_VIEWERS: &[&str] = &[roles::ADMIN, roles::STAFF_MANAGER];

async fn require_role(
    state: &AppState,
    headers: &HeaderMap,
    required: &[&str],
) -> Result<AuthInfo, ApiError> {
    let auth = identity::require_auth(state, headers).await?;
    identity::require_any_role(&auth, required)?;
    Ok(auth)
}

// =========================================================================
// Roles
// =========================================================================

pub async fn list_roles(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    require_role(&state, &headers, ADMIN_OR_DEV).await?;

    let roles = state.db.list_roles().await?;
    Ok(Json(json!({ "roles": roles })))
}

#[derive(Debug, Deserialize)]
pub struct RoleChangeRequest {
    pub cedula: String,
    pub role_slug: String,
}

#[instrument(skip(state, headers), fields(endpoint = "assign_role"))]
pub async fn assign_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RoleChangeRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = require_role(&state, &headers, ADMIN_OR_DEV).await?;

    let user = state
        .db
        .get_user_by_cedula(&req.cedula)
        .await
        .map_err(|_| ApiError::NotFound("Usuario no encontrado".to_string()))?;
    let role = state
        .db
        .get_role_by_slug(&req.role_slug)
        .await
        .map_err(|_| ApiError::NotFound("Rol no encontrado".to_string()))?;

    state.db.assign_role(&user.id, role.id).await.map_err(|e| match e {
        DatabaseError::Duplicate(_) => {
            ApiError::Conflict("El usuario ya tiene ese rol".to_string())
        }
        other => other.into(),
    })?;

    info!(admin = %auth.user.id, user_id = %user.id, role = %role.slug, "role assigned");
    Ok(Json(json!({ "ok": true })))
}

pub async fn remove_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RoleChangeRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = require_role(&state, &headers, ADMIN_OR_DEV).await?;

    let user = state
        .db
        .get_user_by_cedula(&req.cedula)
        .await
        .map_err(|_| ApiError::NotFound("Usuario no encontrado".to_string()))?;
    let role = state
        .db
        .get_role_by_slug(&req.role_slug)
        .await
        .map_err(|_| ApiError::NotFound("Rol no encontrado".to_string()))?;

    if !state.db.remove_role(&user.id, role.id).await? {
        return Err(ApiError::NotFound(
            "El usuario no tiene ese rol".to_string(),
        ));
    }

    info!(admin = %auth.user.id, user_id = %user.id, role = %role.slug, "role removed");
    Ok(Json(json!({ "ok": true })))
}

// =========================================================================
// Sessions
// =========================================================================

pub async fn list_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    require_role(&state, &headers, ADMIN_OR_DEV).await?;

    let sessions = state.db.list_sessions().await?;
    Ok(Json(json!({ "sessions": sessions })))
}

#[derive(Debug, Deserialize)]
pub struct RevokeSessionRequest {
    pub id: String,
}

pub async fn revoke_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RevokeSessionRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = require_role(&state, &headers, ADMIN_OR_DEV).await?;

    if !state.db.revoke_session(&req.id).await? {
        return Err(ApiError::NotFound("Sesión no encontrada".to_string()));
    }

    info!(admin = %auth.user.id, session_id = %req.id, "session revoked");
    Ok(Json(json!({ "ok": true })))
}

// =========================================================================
// Staff
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct StaffListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
}

async fn with_roles(state: &AppState, user: User) -> ApiResult<serde_json::Value> {
    let assigned = state.db.user_role_slugs(&user.id).await?;
    let effective = roles::effective_roles(&assigned);

    let mut value = serde_json::to_value(&user)
        .map_err(|e| ApiError::Internal(e.into()))?;
    if let Some(map) = value.as_object_mut() {
        map.insert("roles".to_string(), json!(effective));
    }
    Ok(value)
}

pub async fn list_staff(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StaffListQuery>,
) -> ApiResult<impl IntoResponse> {
    require_role(&state, &headers, STAFF_VIEWERS).await?;

    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * page_size;

    let (users, total) = state
        .db
        .list_users(query.search.as_deref().filter(|s| !s.is_empty()), page_size, offset)
        .await?;

    let mut rows = Vec::with_capacity(users.len());
    for user in users {
        rows.push(with_roles(&state, user).await?);
    }

    Ok(Json(json!({
        "users": rows,
        "total": total,
        "page": page,
        "page_size": page_size,
    })))
}

pub async fn get_staff(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    require_role(&state, &headers, STAFF_VIEWERS).await?;

    let user = state.db.get_user(&id).await?;
    Ok(Json(with_roles(&state, user).await?))
}

#[derive(Debug, Deserialize)]
pub struct StaffUpdateRequest {
    pub nombre: Option<String>,
    pub segundo_nombre: Option<String>,
    pub primer_apellido: Option<String>,
    pub segundo_apellido: Option<String>,
    pub posicion: Option<String>,
    pub categoria: Option<String>,
    pub instancia: Option<String>,
}

fn validate_name(field: &str, value: &str) -> Result<(), ApiError> {
    let ok = !value.trim().is_empty()
        && value.chars().all(|c| c.is_alphabetic() || c == ' ');
    if ok {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "El campo {field} solo admite letras y espacios"
        )))
    }
}

pub async fn update_staff(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<StaffUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = require_role(&state, &headers, &[roles::ADMIN]).await?;

    let mut user = state.db.get_user(&id).await?;

    if let Some(nombre) = req.nombre {
        validate_name("nombre", &nombre)?;
        user.nombre = nombre.trim().to_string();
    }
    if let Some(segundo) = req.segundo_nombre {
        if segundo.trim().is_empty() {
            user.segundo_nombre = None;
        } else {
            validate_name("segundo_nombre", &segundo)?;
            user.segundo_nombre = Some(segundo.trim().to_string());
        }
    }
    if let Some(apellido) = req.primer_apellido {
        validate_name("primer_apellido", &apellido)?;
        user.primer_apellido = apellido.trim().to_string();
    }
    if let Some(apellido) = req.segundo_apellido {
        validate_name("segundo_apellido", &apellido)?;
        user.segundo_apellido = apellido.trim().to_string();
    }
    if let Some(posicion) = req.posicion {
        if posicion.trim().is_empty() {
            return Err(ApiError::Validation(
                "El campo posicion es obligatorio".to_string(),
            ));
        }
        user.posicion = posicion.trim().to_string();
    }
    if let Some(categoria) = req.categoria {
        user.categoria = categoria.trim().to_string();
    }
    if let Some(instancia) = req.instancia {
        user.instancia = instancia.trim().to_string();
    }

    state.db.update_user(&user).await?;

    info!(admin = %auth.user.id, user_id = %user.id, "staff record updated");
    Ok(Json(with_roles(&state, state.db.get_user(&id).await?).await?))
}

pub async fn delete_staff(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let auth = require_role(&state, &headers, &[roles::ADMIN]).await?;

    if !state.db.soft_delete_user(&id).await? {
        return Err(ApiError::NotFound("Usuario no encontrado".to_string()));
    }

    info!(admin = %auth.user.id, user_id = %id, "staff record soft-deleted");
    Ok(Json(json!({ "ok": true })))
}

// =========================================================================
// Server clock offset
// =========================================================================

pub async fn get_time_control(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    require_role(&state, &headers, ADMIN_OR_DEV).await?;

    let tc = state.db.get_time_control().await?;
    let now = civil_now(state.clock.as_ref(), tc.offset_minutes);

    Ok(Json(json!({
        "offset_minutes": tc.offset_minutes,
        "updated_at": tc.updated_at,
        "civil_now": now.to_rfc3339(),
        "civil_today": format_ymd(civil_today(state.clock.as_ref(), tc.offset_minutes)),
        "civil_time": civil_time_hm(state.clock.as_ref(), tc.offset_minutes),
    })))
}

/// Either a direct `offset_minutes` or a days/hours/minutes breakdown.
#[derive(Debug, Deserialize)]
pub struct TimeControlRequest {
    pub offset_minutes: Option<i64>,
    pub days: Option<i64>,
    pub hours: Option<i64>,
    pub minutes: Option<i64>,
}

impl TimeControlRequest {
    fn total_minutes(&self) -> Option<i64> {
        if let Some(direct) = self.offset_minutes {
            return Some(direct);
        }
        if self.days.is_none() && self.hours.is_none() && self.minutes.is_none() {
            return None;
        }
        Some(
            self.days.unwrap_or(0) * 24 * 60
                + self.hours.unwrap_or(0) * 60
                + self.minutes.unwrap_or(0),
        )
    }
}

pub async fn set_time_control(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TimeControlRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = require_role(&state, &headers, ADMIN_OR_DEV).await?;

    let requested = req.total_minutes().ok_or_else(|| {
        ApiError::Validation("Se requiere offset_minutes o days/hours/minutes".to_string())
    })?;
    let clamped = clamp_offset(requested);

    state.db.set_time_offset(clamped).await?;

    info!(admin = %auth.user.id, offset_minutes = clamped, "clock offset set");
    Ok(Json(json!({ "ok": true, "offset_minutes": clamped })))
}

pub async fn reset_time_control(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let auth = require_role(&state, &headers, ADMIN_OR_DEV).await?;

    state.db.set_time_offset(0).await?;

    info!(admin = %auth.user.id, "clock offset reset");
    Ok(Json(json!({ "ok": true, "offset_minutes": 0 })))
}
