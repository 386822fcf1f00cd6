//! The shared resolution step behind every `responder` endpoint.

use serde_json::{Value, json};
use tracing::info;

use tramites_core::RequestKind;
use tramites_core::clock::civil_now;
use tramites_core::resolution;

use crate::storage::{ResolutionParams, ResolveOutcome};

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::identity::AuthInfo;

const fn already_resolved(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Solicitud => "La solicitud ya está resuelta",
        RequestKind::Justificacion => "La justificación ya está resuelta",
        RequestKind::Omision => "La omisión ya está resuelta",
        RequestKind::Reporte => "El reporte ya está resuelto",
    }
}

const fn not_found(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Solicitud => "Solicitud no encontrada",
        RequestKind::Justificacion => "Justificación no encontrada",
        RequestKind::Omision => "Omisión no encontrada",
        RequestKind::Reporte => "Reporte no encontrado",
    }
}

/// Map the decision label, stamp the resolver identity and the civil
/// timestamp, and apply the conditional transition. First writer wins;
/// the loser gets a 409 and the stored resolution is untouched.
pub async fn respond(
    state: &AppState,
    auth: &AuthInfo,
    kind: RequestKind,
    id: &str,
    decision: &str,
    comentario: Option<&str>,
) -> ApiResult<Value> {
    let estado = resolution::map_decision(kind, decision)?;

    let tc = state.db.get_time_control().await?;
    let resolved_at = civil_now(state.clock.as_ref(), tc.offset_minutes).to_rfc3339();
    let resolved_by_nombre = auth.user.display_name();

    let outcome = state
        .db
        .resolve_request(
            kind,
            id,
            &ResolutionParams {
                estado,
                comentario,
                resolved_by_cedula: &auth.user.cedula,
                resolved_by_nombre: &resolved_by_nombre,
                resolved_at: &resolved_at,
            },
        )
        .await?;

    match outcome {
        ResolveOutcome::Applied => {
            info!(resolver = %auth.user.id, record = %id, ?kind, estado, "request resolved");
            Ok(json!({ "ok": true, "estado": estado }))
        }
        ResolveOutcome::AlreadyResolved => {
            Err(ApiError::Conflict(already_resolved(kind).to_string()))
        }
        ResolveOutcome::NotFound => Err(ApiError::NotFound(not_found(kind).to_string())),
    }
}
