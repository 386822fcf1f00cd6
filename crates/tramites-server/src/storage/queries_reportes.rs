//! Database queries for infrastructure damage reports.

use super::db::{Database, DatabaseError, unix_timestamp};
use super::models::Reporte;

pub struct NewReporteParams<'a> {
    pub user_cedula: &'a str,
    pub nombre_suscriptor: Option<&'a str>,
    pub posicion: Option<&'a str>,
    pub instancia: Option<&'a str>,
    pub tipo_reporte: &'a str,
    pub reporte: &'a str,
    pub lugar: &'a str,
}

impl Database {
    /// Insert an infrastructure report in the pending state.
    pub async fn create_reporte(
        &self,
        id: &str,
        params: &NewReporteParams<'_>,
    ) -> Result<Reporte, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO reporte_infraestructura (id, user_cedula, nombre_suscriptor, posicion, \
             instancia, tipo_reporte, reporte, lugar, estado, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'Pendiente', ?)",
        )
        .bind(id)
        .bind(params.user_cedula)
        .bind(params.nombre_suscriptor)
        .bind(params.posicion)
        .bind(params.instancia)
        .bind(params.tipo_reporte)
        .bind(params.reporte)
        .bind(params.lugar)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_reporte(id).await
    }

    /// Get an infrastructure report by ID.
    pub async fn get_reporte(&self, id: &str) -> Result<Reporte, DatabaseError> {
        sqlx::query_as::<_, Reporte>("SELECT * FROM reporte_infraestructura WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Reporte {id}")))
    }

    /// List infrastructure reports, newest first, optionally restricted
    /// to an owner.
    pub async fn list_reportes(
        &self,
        owner: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Reporte>, DatabaseError> {
        let rows = if let Some(cedula) = owner {
            sqlx::query_as::<_, Reporte>(
                "SELECT * FROM reporte_infraestructura WHERE user_cedula = ? \
                 ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(cedula)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?
        } else {
            sqlx::query_as::<_, Reporte>(
                "SELECT * FROM reporte_infraestructura ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?
        };

        Ok(rows)
    }
}
