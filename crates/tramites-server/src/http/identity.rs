//! Identity resolution and authorization guards.

use axum::http::HeaderMap;

use tramites_core::roles;

use crate::storage::{User, unix_timestamp};

use super::AppState;
use super::cookies;
use super::error::ApiError;

/// The authenticated caller: a live user plus their assigned role slugs.
/// An empty role set is a valid state (plain staff member).
#[derive(Debug, Clone)]
pub struct AuthInfo {
    pub user: User,
    pub roles: Vec<String>,
}

impl AuthInfo {
    pub fn holds_any(&self, required: &[&str]) -> bool {
        roles::holds_any(&self.roles, required)
    }
}

/// Resolve the caller from the request headers. Any failure along the
/// chain collapses to `None`: cookie absent, token invalid, session
/// missing/revoked/expired, token-session mismatch, or user soft-deleted.
pub async fn resolve(state: &AppState, headers: &HeaderMap) -> Option<AuthInfo> {
    let token = cookies::session_token(headers)?;
    let claims = state.tokens.verify(token)?;

    let session = state.db.get_session(&claims.sid).await.ok()?;
    if !session.is_valid(unix_timestamp()) {
        return None;
    }

    // The token must name the session's owner; a signed token replayed
    // against someone else's session row is rejected.
    if session.user_id != claims.sub {
        return None;
    }

    let user = state.db.get_user(&claims.sub).await.ok()?;
    let roles = state.db.user_role_slugs(&user.id).await.ok()?;

    Some(AuthInfo { user, roles })
}

/// Guard: 401 when the caller cannot be resolved.
pub async fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<AuthInfo, ApiError> {
    resolve(state, headers)
        .await
        .ok_or(ApiError::Unauthenticated)
}

/// Guard: 403 when the assigned role set does not intersect `required`.
/// The `normal_user` display default never satisfies a guard.
pub fn require_any_role(auth: &AuthInfo, required: &[&str]) -> Result<(), ApiError> {
    if auth.holds_any(required) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}
