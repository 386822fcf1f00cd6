//! Database queries for justifications and their attachments.

use super::db::{Database, DatabaseError, unix_timestamp};
use super::models::{Adjunto, Justificacion};
use super::queries_solicitudes::AdjuntoParams;

/// Fields for a new justification. `justificacion_fecha`/`hora` are
/// stamped by the server from the civil clock.
pub struct NewJustificacionParams<'a> {
    pub linked_solicitud_id: Option<&'a str>,
    pub user_cedula: &'a str,
    pub nombre_suscriptor: Option<&'a str>,
    pub posicion: Option<&'a str>,
    pub instancia: Option<&'a str>,
    pub tipo_general: Option<&'a str>,
    pub tipo_justificacion: &'a str,
    pub es_rango: bool,
    pub fecha_inicio: &'a str,
    pub fecha_fin: &'a str,
    pub jornada: Option<&'a str>,
    pub hora_inicio: Option<&'a str>,
    pub hora_fin: Option<&'a str>,
    pub cantidad: Option<&'a str>,
    pub unidad: Option<&'a str>,
    pub hora_salida: Option<&'a str>,
    pub justificacion_fecha: &'a str,
    pub justificacion_hora: &'a str,
    pub observaciones: Option<&'a str>,
    pub familiar: Option<&'a str>,
    pub adjunto_url: Option<&'a str>,
    pub adjunto_mime: Option<&'a str>,
}

impl Database {
    /// Insert a justification in the pending state.
    pub async fn create_justificacion(
        &self,
        id: &str,
        params: &NewJustificacionParams<'_>,
    ) -> Result<Justificacion, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO justificaciones (id, linked_solicitud_id, user_cedula, nombre_suscriptor, \
             posicion, instancia, tipo_general, tipo_justificacion, estado, es_rango, fecha_inicio, \
             fecha_fin, jornada, hora_inicio, hora_fin, cantidad, unidad, hora_salida, \
             justificacion_fecha, justificacion_hora, observaciones, familiar, adjunto_url, \
             adjunto_mime, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'Pendiente', ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(params.linked_solicitud_id)
        .bind(params.user_cedula)
        .bind(params.nombre_suscriptor)
        .bind(params.posicion)
        .bind(params.instancia)
        .bind(params.tipo_general)
        .bind(params.tipo_justificacion)
        .bind(params.es_rango)
        .bind(params.fecha_inicio)
        .bind(params.fecha_fin)
        .bind(params.jornada)
        .bind(params.hora_inicio)
        .bind(params.hora_fin)
        .bind(params.cantidad)
        .bind(params.unidad)
        .bind(params.hora_salida)
        .bind(params.justificacion_fecha)
        .bind(params.justificacion_hora)
        .bind(params.observaciones)
        .bind(params.familiar)
        .bind(params.adjunto_url)
        .bind(params.adjunto_mime)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_justificacion(id).await
    }

    /// Get a justification by ID.
    pub async fn get_justificacion(&self, id: &str) -> Result<Justificacion, DatabaseError> {
        sqlx::query_as::<_, Justificacion>("SELECT * FROM justificaciones WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Justificación {id}")))
    }

    /// List justifications, newest first, optionally restricted to an owner.
    pub async fn list_justificaciones(
        &self,
        owner: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Justificacion>, DatabaseError> {
        let rows = if let Some(cedula) = owner {
            sqlx::query_as::<_, Justificacion>(
                "SELECT * FROM justificaciones WHERE user_cedula = ? \
                 ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(cedula)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?
        } else {
            sqlx::query_as::<_, Justificacion>(
                "SELECT * FROM justificaciones ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?
        };

        Ok(rows)
    }

    /// Link an attachment to a justification.
    pub async fn add_justificacion_adjunto(
        &self,
        justificacion_id: &str,
        params: &AdjuntoParams<'_>,
    ) -> Result<(), DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO justificacion_adjuntos (justificacion_id, path, public_url, mime, \
             uploaded_by_cedula, uploaded_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(justificacion_id)
        .bind(params.path)
        .bind(params.public_url)
        .bind(params.mime)
        .bind(params.uploaded_by_cedula)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Attachments linked to a justification, newest first.
    pub async fn list_justificacion_adjuntos(
        &self,
        justificacion_id: &str,
    ) -> Result<Vec<Adjunto>, DatabaseError> {
        let rows = sqlx::query_as::<_, Adjunto>(
            "SELECT path, public_url, mime, uploaded_by_cedula, uploaded_at \
             FROM justificacion_adjuntos WHERE justificacion_id = ? ORDER BY uploaded_at DESC",
        )
        .bind(justificacion_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}
