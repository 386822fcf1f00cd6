//! Database queries for users, roles, sessions, and the clock offset.

use super::db::{Database, DatabaseError, unix_timestamp};
use super::models::{Role, Session, TimeControl, User};

/// Fields for a new user row.
pub struct NewUserParams<'a> {
    pub cedula: &'a str,
    pub nombre: &'a str,
    pub segundo_nombre: Option<&'a str>,
    pub primer_apellido: &'a str,
    pub segundo_apellido: &'a str,
    pub posicion: &'a str,
    pub categoria: &'a str,
    pub instancia: &'a str,
    pub password_hash: &'a str,
    pub must_change_password: bool,
}

impl Database {
    // =========================================================================
    // User queries
    // =========================================================================

    /// Create a new user.
    pub async fn create_user(
        &self,
        id: &str,
        params: &NewUserParams<'_>,
    ) -> Result<User, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO users (id, cedula, nombre, segundo_nombre, primer_apellido, segundo_apellido, \
             posicion, categoria, instancia, password_hash, must_change_password, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(params.cedula)
        .bind(params.nombre)
        .bind(params.segundo_nombre)
        .bind(params.primer_apellido)
        .bind(params.segundo_apellido)
        .bind(params.posicion)
        .bind(params.categoria)
        .bind(params.instancia)
        .bind(params.password_hash)
        .bind(params.must_change_password)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_user(id).await
    }

    /// Get an active (non-deleted) user by ID.
    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ? AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    /// Get an active user by cedula.
    pub async fn get_user_by_cedula(&self, cedula: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE cedula = ? AND deleted_at IS NULL")
            .bind(cedula)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User with cedula {cedula}")))
    }

    /// Page of active users ordered by name, optionally filtered by a
    /// search term over cedula and name fields. Returns the page and the
    /// total count of matching rows.
    pub async fn list_users(
        &self,
        search: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<User>, i64), DatabaseError> {
        let (users, total) = if let Some(term) = search {
            let pattern = format!("%{term}%");
            let users = sqlx::query_as::<_, User>(
                "SELECT * FROM users WHERE deleted_at IS NULL AND \
                 (cedula LIKE ? OR nombre LIKE ? OR primer_apellido LIKE ? OR segundo_apellido LIKE ?) \
                 ORDER BY nombre ASC LIMIT ? OFFSET ?",
            )
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?;

            let row: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM users WHERE deleted_at IS NULL AND \
                 (cedula LIKE ? OR nombre LIKE ? OR primer_apellido LIKE ? OR segundo_apellido LIKE ?)",
            )
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_one(self.pool())
            .await?;

            (users, row.0)
        } else {
            let users = sqlx::query_as::<_, User>(
                "SELECT * FROM users WHERE deleted_at IS NULL ORDER BY nombre ASC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?;

            let row: (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
                    .fetch_one(self.pool())
                    .await?;

            (users, row.0)
        };

        Ok((users, total))
    }

    /// Update a user's editable profile fields.
    pub async fn update_user(&self, user: &User) -> Result<(), DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "UPDATE users SET nombre = ?, segundo_nombre = ?, primer_apellido = ?, \
             segundo_apellido = ?, posicion = ?, categoria = ?, instancia = ?, \
             must_change_password = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&user.nombre)
        .bind(&user.segundo_nombre)
        .bind(&user.primer_apellido)
        .bind(&user.segundo_apellido)
        .bind(&user.posicion)
        .bind(&user.categoria)
        .bind(&user.instancia)
        .bind(user.must_change_password)
        .bind(now)
        .bind(&user.id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Replace a user's password hash and clear the must-change flag.
    pub async fn update_password(&self, user_id: &str, hash: &str) -> Result<(), DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "UPDATE users SET password_hash = ?, must_change_password = 0, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(hash)
        .bind(now)
        .bind(user_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Soft-delete a user. The tombstone excludes the row from every
    /// active query; nothing is physically removed.
    pub async fn soft_delete_user(&self, id: &str) -> Result<bool, DatabaseError> {
        let now = unix_timestamp();

        let result =
            sqlx::query("UPDATE users SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(now)
                .bind(id)
                .execute(self.pool())
                .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Role queries
    // =========================================================================

    /// List every role.
    pub async fn list_roles(&self) -> Result<Vec<Role>, DatabaseError> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY slug ASC")
            .fetch_all(self.pool())
            .await?;
        Ok(roles)
    }

    /// Get a role by slug.
    pub async fn get_role_by_slug(&self, slug: &str) -> Result<Role, DatabaseError> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE slug = ?")
            .bind(slug)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Role {slug}")))
    }

    /// Assign a role to a user. Duplicate assignment surfaces as
    /// [`DatabaseError::Duplicate`].
    pub async fn assign_role(&self, user_id: &str, role_id: i64) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(role_id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Remove a role assignment. Returns whether a row was removed.
    pub async fn remove_role(&self, user_id: &str, role_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role_id = ?")
            .bind(user_id)
            .bind(role_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Assigned role slugs for a user. An empty set is not an error.
    pub async fn user_role_slugs(&self, user_id: &str) -> Result<Vec<String>, DatabaseError> {
        let slugs = sqlx::query_scalar::<_, String>(
            "SELECT r.slug FROM user_roles ur JOIN roles r ON r.id = ur.role_id \
             WHERE ur.user_id = ? ORDER BY r.slug ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(slugs)
    }

    // =========================================================================
    // Session queries
    // =========================================================================

    /// Create a session row. Sessions start unrevoked.
    pub async fn create_session(
        &self,
        id: &str,
        user_id: &str,
        expires_at: i64,
    ) -> Result<Session, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO sessions (id, user_id, created_at, expires_at, revoked) \
             VALUES (?, ?, ?, ?, 0)",
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .execute(self.pool())
        .await?;

        self.get_session(id).await
    }

    /// Get a session by ID.
    pub async fn get_session(&self, id: &str) -> Result<Session, DatabaseError> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Session {id}")))
    }

    /// Revoke a session. Idempotent: revoking an already-revoked session
    /// is not an error. Expired and revoked rows persist for audit.
    pub async fn revoke_session(&self, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE sessions SET revoked = 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All session rows, newest first.
    pub async fn list_sessions(&self) -> Result<Vec<Session>, DatabaseError> {
        let sessions =
            sqlx::query_as::<_, Session>("SELECT * FROM sessions ORDER BY created_at DESC")
                .fetch_all(self.pool())
                .await?;
        Ok(sessions)
    }

    // =========================================================================
    // Clock offset (time_control singleton)
    // =========================================================================

    /// Read the clock-offset singleton.
    pub async fn get_time_control(&self) -> Result<TimeControl, DatabaseError> {
        sqlx::query_as::<_, TimeControl>(
            "SELECT offset_minutes, updated_at FROM time_control WHERE id = 1",
        )
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound("time_control".to_string()))
    }

    /// Overwrite the clock offset. Callers clamp the value first.
    pub async fn set_time_offset(&self, minutes: i64) -> Result<(), DatabaseError> {
        let now = unix_timestamp();

        sqlx::query("UPDATE time_control SET offset_minutes = ?, updated_at = ? WHERE id = 1")
            .bind(minutes)
            .bind(now)
            .execute(self.pool())
            .await?;

        Ok(())
    }
}
