//! Trámites Core Library
//!
//! Shared domain logic for the Trámites service:
//! - Role slugs and the effective-role rule
//! - Resolution state machine (decision labels, pending predicate)
//! - Business-day submission window
//! - Civil clock for Costa Rica with a persisted test offset

pub mod clock;
pub mod error;
pub mod resolution;
pub mod roles;
pub mod workdays;

pub use clock::{Clock, SystemClock};
pub use error::{Error, Result};
pub use resolution::RequestKind;
