//! Session cookie construction and parsing.
//!
//! The session token travels only in the `session_token` cookie, which is
//! always `HttpOnly` with `Path=/`. `SameSite` and `Domain` come from
//! deployment configuration; `Secure` is forced on when `SameSite=None`
//! because browsers drop the cookie otherwise.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use clap::ValueEnum;

pub const SESSION_COOKIE: &str = "session_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl SameSite {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Lax => "Lax",
            Self::Strict => "Strict",
            Self::None => "None",
        }
    }
}

// clap renders defaults through Display, so this must match the
// lowercase possible values derived by `ValueEnum`
impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Lax => "lax",
            Self::Strict => "strict",
            Self::None => "none",
        })
    }
}

#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub same_site: SameSite,
    pub secure: bool,
    pub domain: Option<String>,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            same_site: SameSite::Lax,
            secure: false,
            domain: None,
        }
    }
}

impl CookieSettings {
    fn effective_secure(&self) -> bool {
        self.secure || self.same_site == SameSite::None
    }

    fn attributes(&self) -> String {
        let mut attrs = format!("Path=/; HttpOnly; SameSite={}", self.same_site.as_str());
        if self.effective_secure() {
            attrs.push_str("; Secure");
        }
        if let Some(domain) = &self.domain {
            attrs.push_str("; Domain=");
            attrs.push_str(domain);
        }
        attrs
    }

    /// `Set-Cookie` value carrying a fresh session token.
    pub fn session_cookie(&self, token: &str, max_age_secs: i64) -> String {
        format!(
            "{SESSION_COOKIE}={token}; {}; Max-Age={max_age_secs}",
            self.attributes()
        )
    }

    /// `Set-Cookie` value that expires the session cookie immediately.
    pub fn clear_cookie(&self) -> String {
        format!("{SESSION_COOKIE}=; {}; Max-Age=0", self.attributes())
    }
}

/// Pull the session token out of the `Cookie` request header, if present.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;

    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
    })
}
