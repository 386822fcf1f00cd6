//! Database queries for attendance-omission justifications.

use super::db::{Database, DatabaseError, unix_timestamp};
use super::models::Omision;

pub struct NewOmisionParams<'a> {
    pub user_cedula: &'a str,
    pub nombre_suscriptor: Option<&'a str>,
    pub posicion: Option<&'a str>,
    pub instancia: Option<&'a str>,
    pub fecha_omision: &'a str,
    pub tipo_omision: &'a str,
    pub justificacion: &'a str,
}

impl Database {
    /// Insert an omission record in the pending state.
    pub async fn create_omision(
        &self,
        id: &str,
        params: &NewOmisionParams<'_>,
    ) -> Result<Omision, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO omision_marca (id, user_cedula, nombre_suscriptor, posicion, instancia, \
             fecha_omision, tipo_omision, justificacion, estado, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'Pendiente', ?)",
        )
        .bind(id)
        .bind(params.user_cedula)
        .bind(params.nombre_suscriptor)
        .bind(params.posicion)
        .bind(params.instancia)
        .bind(params.fecha_omision)
        .bind(params.tipo_omision)
        .bind(params.justificacion)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_omision(id).await
    }

    /// Get an omission record by ID.
    pub async fn get_omision(&self, id: &str) -> Result<Omision, DatabaseError> {
        sqlx::query_as::<_, Omision>("SELECT * FROM omision_marca WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Omisión {id}")))
    }

    /// List omission records, newest first, optionally restricted to an owner.
    pub async fn list_omisiones(
        &self,
        owner: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Omision>, DatabaseError> {
        let rows = if let Some(cedula) = owner {
            sqlx::query_as::<_, Omision>(
                "SELECT * FROM omision_marca WHERE user_cedula = ? \
                 ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(cedula)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?
        } else {
            sqlx::query_as::<_, Omision>(
                "SELECT * FROM omision_marca ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?
        };

        Ok(rows)
    }
}
