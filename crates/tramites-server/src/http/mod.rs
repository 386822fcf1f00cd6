//! HTTP surface of the Trámites server.
//!
//! Thin axum handlers over the storage layer: every privileged handler
//! starts with the identity/role guards, validation happens before any
//! write, and failures come back as structured JSON.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tramites_core::Clock;

use crate::auth::TokenManager;
use crate::blobstore::BlobStore;
use crate::storage::Database;

pub mod cookies;
pub mod error;
pub mod identity;

mod admin_routes;
mod auth_routes;
mod justificaciones;
mod omisiones;
mod reportes;
mod responder;
mod solicitudes;
mod upload;

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
mod admin_routes_tests;
#[cfg(test)]
mod auth_routes_tests;

pub use cookies::CookieSettings;
pub use error::{ApiError, ApiResult};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: TokenManager,
    pub cookies: CookieSettings,
    pub blobs: Arc<dyn BlobStore>,
    pub clock: Arc<dyn Clock>,
    pub fonts_dir: PathBuf,
}

/// Build the API router. The static attachment mount is added by the
/// caller, which knows the blob store's on-disk root.
pub fn router(state: AppState) -> Router {
    Router::new()
        // auth
        .route("/api/login", post(auth_routes::login))
        .route("/api/logout", post(auth_routes::logout))
        .route("/api/me", get(auth_routes::me))
        .route("/api/register", post(auth_routes::register))
        .route("/api/change-password", post(auth_routes::change_password))
        // administration
        .route(
            "/api/admin/roles",
            get(admin_routes::list_roles)
                .post(admin_routes::assign_role)
                .delete(admin_routes::remove_role),
        )
        .route(
            "/api/admin/sessions",
            get(admin_routes::list_sessions).delete(admin_routes::revoke_session),
        )
        .route("/api/admin/staff", get(admin_routes::list_staff))
        .route(
            "/api/admin/staff/{id}",
            get(admin_routes::get_staff)
                .put(admin_routes::update_staff)
                .delete(admin_routes::delete_staff),
        )
        .route(
            "/api/admin/time-control",
            get(admin_routes::get_time_control)
                .put(admin_routes::set_time_control)
                .delete(admin_routes::reset_time_control),
        )
        // permission requests
        .route(
            "/api/solicitudes",
            post(solicitudes::create).get(solicitudes::list),
        )
        .route("/api/solicitudes/{id}", get(solicitudes::get_one))
        .route("/api/solicitudes/{id}/responder", post(solicitudes::responder))
        .route("/api/solicitudes/{id}/pdf", get(solicitudes::pdf))
        // justifications
        .route(
            "/api/justificaciones",
            post(justificaciones::create).get(justificaciones::list),
        )
        .route("/api/justificaciones/{id}", get(justificaciones::get_one))
        .route(
            "/api/justificaciones/{id}/responder",
            post(justificaciones::responder),
        )
        // attendance-omission justifications
        .route(
            "/api/omisionmarca",
            post(omisiones::create).get(omisiones::list),
        )
        .route("/api/omisionmarca/{id}", get(omisiones::get_one))
        .route("/api/omisionmarca/{id}/responder", post(omisiones::responder))
        // infrastructure reports
        .route(
            "/api/reporteinf",
            post(reportes::create).get(reportes::list),
        )
        .route("/api/reporteinf/{id}", get(reportes::get_one))
        .route("/api/reporteinf/{id}/responder", post(reportes::responder))
        // uploads
        .route("/api/upload", post(upload::upload))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
