//! Attachment upload endpoint.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::info;

use tramites_core::clock::civil_now;

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::identity;

pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let auth = identity::require_auth(&state, &headers).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Formulario inválido: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(ToString::to_string)
            .ok_or_else(|| ApiError::Validation("El archivo no tiene nombre".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Lectura del archivo falló: {e}")))?;

        let tc = state.db.get_time_control().await?;
        let stamp = civil_now(state.clock.as_ref(), tc.offset_minutes).timestamp_millis();

        // the owner segment comes from the session, never the form
        let stored = state
            .blobs
            .put(&auth.user.cedula, &filename, stamp, &data)
            .await?;

        info!(user_id = %auth.user.id, path = %stored.path, size = data.len(), "file uploaded");

        return Ok(Json(json!({
            "publicUrl": stored.public_url,
            "path": stored.path,
        })));
    }

    Err(ApiError::Validation("Falta el campo file".to_string()))
}
