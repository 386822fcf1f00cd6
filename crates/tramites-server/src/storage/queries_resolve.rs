//! The uniform resolution transition, shared by all four record kinds.

use tramites_core::RequestKind;

use super::db::{Database, DatabaseError};

/// Server-stamped resolution fields. `estado` is the terminal state
/// already mapped from the decision label.
pub struct ResolutionParams<'a> {
    pub estado: &'a str,
    pub comentario: Option<&'a str>,
    pub resolved_by_cedula: &'a str,
    pub resolved_by_nombre: &'a str,
    pub resolved_at: &'a str,
}

/// Outcome of a conditional resolution update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The record was pending and is now resolved.
    Applied,
    /// The record exists but was already resolved.
    AlreadyResolved,
    /// No record with that ID.
    NotFound,
}

const fn table_for(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Solicitud => "solicitudes_permiso",
        RequestKind::Justificacion => "justificaciones",
        RequestKind::Omision => "omision_marca",
        RequestKind::Reporte => "reporte_infraestructura",
    }
}

impl Database {
    /// Apply a resolution as a single conditional UPDATE: the write only
    /// lands if the row still satisfies the pending predicate, so two
    /// concurrent resolutions cannot both win (no read-then-write race).
    pub async fn resolve_request(
        &self,
        kind: RequestKind,
        id: &str,
        params: &ResolutionParams<'_>,
    ) -> Result<ResolveOutcome, DatabaseError> {
        let table = table_for(kind);

        let sql = format!(
            "UPDATE {table} SET estado = ?, respuesta_comentario = ?, respuesta_por = ?, \
             respuesta_nombre = ?, respuesta_en = ? \
             WHERE id = ? AND (estado IS NULL OR estado = '' OR lower(estado) LIKE '%pend%')"
        );

        let result = sqlx::query(&sql)
            .bind(params.estado)
            .bind(params.comentario)
            .bind(params.resolved_by_cedula)
            .bind(params.resolved_by_nombre)
            .bind(params.resolved_at)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 1 {
            return Ok(ResolveOutcome::Applied);
        }

        let exists_sql = format!("SELECT 1 FROM {table} WHERE id = ?");
        let exists: Option<(i64,)> = sqlx::query_as(&exists_sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        if exists.is_some() {
            Ok(ResolveOutcome::AlreadyResolved)
        } else {
            Ok(ResolveOutcome::NotFound)
        }
    }
}
