//! Data models for Trámites storage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub cedula: String,
    pub nombre: String,
    pub segundo_nombre: Option<String>,
    pub primer_apellido: String,
    pub segundo_apellido: String,
    pub posicion: String,
    pub categoria: String,
    pub instancia: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub must_change_password: bool,
    pub deleted_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Full display name, stamped on resolutions as `respuesta_nombre`.
    pub fn display_name(&self) -> String {
        match &self.segundo_nombre {
            Some(segundo) if !segundo.is_empty() => format!(
                "{} {} {} {}",
                self.nombre, segundo, self.primer_apellido, self.segundo_apellido
            ),
            _ => format!(
                "{} {} {}",
                self.nombre, self.primer_apellido, self.segundo_apellido
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub revoked: bool,
}

impl Session {
    /// A session is valid iff not revoked and not past its expiry.
    pub fn is_valid(&self, now: i64) -> bool {
        !self.revoked && now < self.expires_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Solicitud {
    pub id: String,
    pub user_cedula: String,
    pub nombre_solicitante: Option<String>,
    pub posicion: Option<String>,
    pub instancia: Option<String>,
    pub estado: Option<String>,
    pub tipo_general: Option<String>,
    pub tipo_solicitud: String,
    pub familiar: Option<String>,
    pub es_rango: bool,
    pub fecha_inicio: String,
    pub fecha_fin: String,
    pub jornada: Option<String>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub hora_compact: Option<String>,
    pub cantidad: Option<String>,
    pub unidad: Option<String>,
    pub observaciones: Option<String>,
    pub hora_salida: Option<String>,
    pub adjunto_url: Option<String>,
    pub adjunto_mime: Option<String>,
    pub respuesta_comentario: Option<String>,
    pub respuesta_por: Option<String>,
    pub respuesta_nombre: Option<String>,
    pub respuesta_en: Option<String>,
    pub created_at: i64,
}

impl Solicitud {
    /// The date the submission window is measured against: the end of the
    /// range when ranged, otherwise the start.
    pub fn effective_last_date(&self) -> &str {
        if self.es_rango && !self.fecha_fin.is_empty() {
            &self.fecha_fin
        } else {
            &self.fecha_inicio
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Justificacion {
    pub id: String,
    pub linked_solicitud_id: Option<String>,
    pub user_cedula: String,
    pub nombre_suscriptor: Option<String>,
    pub posicion: Option<String>,
    pub instancia: Option<String>,
    pub tipo_general: Option<String>,
    pub tipo_justificacion: String,
    pub estado: Option<String>,
    pub es_rango: bool,
    pub fecha_inicio: String,
    pub fecha_fin: String,
    pub jornada: Option<String>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub cantidad: Option<String>,
    pub unidad: Option<String>,
    pub hora_salida: Option<String>,
    pub justificacion_fecha: Option<String>,
    pub justificacion_hora: Option<String>,
    pub observaciones: Option<String>,
    pub familiar: Option<String>,
    pub adjunto_url: Option<String>,
    pub adjunto_mime: Option<String>,
    pub respuesta_comentario: Option<String>,
    pub respuesta_por: Option<String>,
    pub respuesta_nombre: Option<String>,
    pub respuesta_en: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Omision {
    pub id: String,
    pub user_cedula: String,
    pub nombre_suscriptor: Option<String>,
    pub posicion: Option<String>,
    pub instancia: Option<String>,
    pub fecha_omision: String,
    pub tipo_omision: String,
    pub justificacion: String,
    pub estado: Option<String>,
    pub respuesta_comentario: Option<String>,
    pub respuesta_por: Option<String>,
    pub respuesta_nombre: Option<String>,
    pub respuesta_en: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reporte {
    pub id: String,
    pub user_cedula: String,
    pub nombre_suscriptor: Option<String>,
    pub posicion: Option<String>,
    pub instancia: Option<String>,
    pub tipo_reporte: String,
    pub reporte: String,
    pub lugar: String,
    pub estado: Option<String>,
    pub respuesta_comentario: Option<String>,
    pub respuesta_por: Option<String>,
    pub respuesta_nombre: Option<String>,
    pub respuesta_en: Option<String>,
    pub created_at: i64,
}

/// Attachment link row, shared shape between the two adjunto tables.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Adjunto {
    pub path: Option<String>,
    pub public_url: Option<String>,
    pub mime: Option<String>,
    pub uploaded_by_cedula: Option<String>,
    pub uploaded_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TimeControl {
    pub offset_minutes: i64,
    pub updated_at: i64,
}
