//! Authentication endpoints: login, logout, identity, registration, and
//! password change.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::SET_COOKIE};
use axum::response::{AppendHeaders, IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use tramites_core::roles;

use crate::auth::password;
use crate::storage::{DatabaseError, NewUserParams, unix_timestamp};

use super::AppState;
use super::cookies;
use super::error::{ApiError, ApiResult};
use super::identity;

/// Credential assigned when registration omits a password. The holder is
/// forced through a password change on first login.
const DEFAULT_PASSWORD: &str = "Temporal01";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub cedula: String,
    pub password: String,
}

#[instrument(skip(state, req), fields(endpoint = "login"))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    // Unknown cedula and wrong password produce the same answer so the
    // endpoint cannot be used to probe which cedulas exist.
    let user = state
        .db
        .get_user_by_cedula(&req.cedula)
        .await
        .map_err(|_| ApiError::InvalidCredentials)?;

    let valid = password::verify_password(&req.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password verification failed: {e}")))?;

    if !valid {
        warn!(cedula = %req.cedula, "failed login attempt");
        return Err(ApiError::InvalidCredentials);
    }

    let session_id = uuid::Uuid::new_v4().to_string();
    let expires_at = unix_timestamp() + state.tokens.ttl_secs();
    state.db.create_session(&session_id, &user.id, expires_at).await?;

    let (token, _exp) = state.tokens.issue(&user.id, &session_id)?;
    let cookie = state.cookies.session_cookie(&token, state.tokens.ttl_secs());

    info!(user_id = %user.id, "user logged in");

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({
            "ok": true,
            "cedula": user.cedula,
            "must_change_password": user.must_change_password,
        })),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    // Best effort: a missing or invalid token still clears the cookie.
    if let Some(token) = cookies::session_token(&headers) {
        if let Some(claims) = state.tokens.verify(token) {
            if let Err(e) = state.db.revoke_session(&claims.sid).await {
                warn!(session_id = %claims.sid, error = %e, "session revocation failed");
            }
        }
    }

    Ok((
        AppendHeaders([(SET_COOKIE, state.cookies.clear_cookie())]),
        Json(json!({ "ok": true })),
    ))
}

pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;

    Ok(Json(json!({
        "user": auth.user,
        "roles": roles::effective_roles(&auth.roles),
    })))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub cedula: String,
    pub nombre: String,
    pub segundo_nombre: Option<String>,
    pub primer_apellido: String,
    pub segundo_apellido: String,
    pub posicion: String,
    pub categoria: String,
    pub instancia: String,
    pub password: Option<String>,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let required = [
            ("cedula", &self.cedula),
            ("nombre", &self.nombre),
            ("primer_apellido", &self.primer_apellido),
            ("segundo_apellido", &self.segundo_apellido),
            ("posicion", &self.posicion),
            ("categoria", &self.categoria),
            ("instancia", &self.instancia),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ApiError::Validation(format!(
                    "El campo {name} es obligatorio"
                )));
            }
        }

        if !self.cedula.chars().all(char::is_alphanumeric) {
            return Err(ApiError::Validation("Cédula inválida".to_string()));
        }

        Ok(())
    }
}

#[instrument(skip(state, req), fields(endpoint = "register"))]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let plain = req.password.as_deref().unwrap_or(DEFAULT_PASSWORD);
    let hash = password::hash_password(plain)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;

    let id = uuid::Uuid::new_v4().to_string();
    let user = state
        .db
        .create_user(
            &id,
            &NewUserParams {
                cedula: req.cedula.trim(),
                nombre: req.nombre.trim(),
                segundo_nombre: req.segundo_nombre.as_deref().map(str::trim),
                primer_apellido: req.primer_apellido.trim(),
                segundo_apellido: req.segundo_apellido.trim(),
                posicion: req.posicion.trim(),
                categoria: req.categoria.trim(),
                instancia: req.instancia.trim(),
                password_hash: &hash,
                must_change_password: true,
            },
        )
        .await
        .map_err(|e| match e {
            DatabaseError::Duplicate(_) => {
                ApiError::Conflict("La cédula ya está registrada".to_string())
            }
            other => other.into(),
        })?;

    info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "id": user.id })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;

    password::check_new_password(&req.new_password).map_err(ApiError::Validation)?;

    let hash = password::hash_password(&req.new_password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;
    state.db.update_password(&auth.user.id, &hash).await?;

    info!(user_id = %auth.user.id, "password changed");

    Ok(Json(json!({ "ok": true })))
}
