//! JWT claims embedded in session tokens.

use serde::{Deserialize, Serialize};

/// Claims carried by the `session_token` cookie.
///
/// The token is a capability credential: it names a user and a revocable
/// session row. Signature validity alone is never enough; the session row
/// is re-checked on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Session ID (row in `sessions`).
    pub sid: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}
