//! SQLite storage for the Trámites server.
//!
//! Provides persistence for users, roles, sessions, the four request
//! record kinds with their attachments, and the clock-offset singleton.

mod db;
mod models;
mod queries;
mod queries_justificaciones;
mod queries_omisiones;
mod queries_reportes;
mod queries_resolve;
mod queries_solicitudes;


pub use db::{Database, DatabaseError, unix_timestamp};
pub use models::*;
pub use queries::NewUserParams;
pub use queries_justificaciones::NewJustificacionParams;
pub use queries_omisiones::NewOmisionParams;
pub use queries_reportes::NewReporteParams;
pub use queries_resolve::{ResolutionParams, ResolveOutcome};
pub use queries_solicitudes::{AdjuntoParams, NewSolicitudParams};
