//! Trámites Server Library
//!
//! Core functionality for the Trámites service:
//! - SQLite storage for users, roles, sessions, and the four request kinds
//! - Cookie-borne JWT sessions and argon2 password hashing
//! - axum HTTP handlers with role-based guards
//! - Local blob store for attachments and PDF export of solicitudes

pub mod auth;
pub mod blobstore;
pub mod http;
pub mod pdf;
pub mod storage;
