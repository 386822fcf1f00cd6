//! Database queries for permission requests and their attachments.

use super::db::{Database, DatabaseError, unix_timestamp};
use super::models::{Adjunto, Solicitud};

/// Fields for a new permission request. The owner cedula always comes
/// from the resolved session, never from the client body.
pub struct NewSolicitudParams<'a> {
    pub user_cedula: &'a str,
    pub nombre_solicitante: Option<&'a str>,
    pub posicion: Option<&'a str>,
    pub instancia: Option<&'a str>,
    pub tipo_general: Option<&'a str>,
    pub tipo_solicitud: &'a str,
    pub familiar: Option<&'a str>,
    pub es_rango: bool,
    pub fecha_inicio: &'a str,
    pub fecha_fin: &'a str,
    pub jornada: Option<&'a str>,
    pub hora_inicio: Option<&'a str>,
    pub hora_fin: Option<&'a str>,
    pub hora_compact: Option<&'a str>,
    pub cantidad: Option<&'a str>,
    pub unidad: Option<&'a str>,
    pub observaciones: Option<&'a str>,
    pub hora_salida: Option<&'a str>,
    pub adjunto_url: Option<&'a str>,
    pub adjunto_mime: Option<&'a str>,
}

/// Fields for an attachment link row.
pub struct AdjuntoParams<'a> {
    pub path: Option<&'a str>,
    pub public_url: Option<&'a str>,
    pub mime: Option<&'a str>,
    pub uploaded_by_cedula: &'a str,
}

impl Database {
    /// Insert a permission request in the pending state.
    pub async fn create_solicitud(
        &self,
        id: &str,
        params: &NewSolicitudParams<'_>,
    ) -> Result<Solicitud, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO solicitudes_permiso (id, user_cedula, nombre_solicitante, posicion, instancia, \
             estado, tipo_general, tipo_solicitud, familiar, es_rango, fecha_inicio, fecha_fin, jornada, \
             hora_inicio, hora_fin, hora_compact, cantidad, unidad, observaciones, hora_salida, \
             adjunto_url, adjunto_mime, created_at) \
             VALUES (?, ?, ?, ?, ?, 'Pendiente', ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(params.user_cedula)
        .bind(params.nombre_solicitante)
        .bind(params.posicion)
        .bind(params.instancia)
        .bind(params.tipo_general)
        .bind(params.tipo_solicitud)
        .bind(params.familiar)
        .bind(params.es_rango)
        .bind(params.fecha_inicio)
        .bind(params.fecha_fin)
        .bind(params.jornada)
        .bind(params.hora_inicio)
        .bind(params.hora_fin)
        .bind(params.hora_compact)
        .bind(params.cantidad)
        .bind(params.unidad)
        .bind(params.observaciones)
        .bind(params.hora_salida)
        .bind(params.adjunto_url)
        .bind(params.adjunto_mime)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_solicitud(id).await
    }

    /// Get a permission request by ID.
    pub async fn get_solicitud(&self, id: &str) -> Result<Solicitud, DatabaseError> {
        sqlx::query_as::<_, Solicitud>("SELECT * FROM solicitudes_permiso WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Solicitud {id}")))
    }

    /// List permission requests, newest first. `owner` restricts to a
    /// single cedula; `None` lists everything (privileged callers).
    pub async fn list_solicitudes(
        &self,
        owner: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Solicitud>, DatabaseError> {
        let rows = if let Some(cedula) = owner {
            sqlx::query_as::<_, Solicitud>(
                "SELECT * FROM solicitudes_permiso WHERE user_cedula = ? \
                 ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(cedula)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?
        } else {
            sqlx::query_as::<_, Solicitud>(
                "SELECT * FROM solicitudes_permiso ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?
        };

        Ok(rows)
    }

    /// Link an attachment to a permission request.
    pub async fn add_solicitud_adjunto(
        &self,
        solicitud_id: &str,
        params: &AdjuntoParams<'_>,
    ) -> Result<(), DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO solicitud_adjuntos (solicitud_id, path, public_url, mime, \
             uploaded_by_cedula, uploaded_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(solicitud_id)
        .bind(params.path)
        .bind(params.public_url)
        .bind(params.mime)
        .bind(params.uploaded_by_cedula)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Attachments linked to a permission request, newest first.
    pub async fn list_solicitud_adjuntos(
        &self,
        solicitud_id: &str,
    ) -> Result<Vec<Adjunto>, DatabaseError> {
        let rows = sqlx::query_as::<_, Adjunto>(
            "SELECT path, public_url, mime, uploaded_by_cedula, uploaded_at \
             FROM solicitud_adjuntos WHERE solicitud_id = ? ORDER BY uploaded_at DESC",
        )
        .bind(solicitud_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}
