//! Role slugs and the effective-role rule.
//!
//! Roles are stored as a user/role join; a user with no assignment is
//! reported as `normal_user` for display purposes only. Guards always
//! check the assigned set, never the display default.

pub const ADMIN: &str = "admin";
pub const DEV: &str = "dev";
pub const STAFF_MANAGER: &str = "staff_manager";
pub const INFRA_MANAGER: &str = "infra_manager";
pub const VIEWER: &str = "viewer";
pub const NORMAL_USER: &str = "normal_user";

/// Every role slug the system recognizes.
pub const ALL_SLUGS: &[&str] = &[ADMIN, DEV, STAFF_MANAGER, INFRA_MANAGER, VIEWER, NORMAL_USER];

/// Roles that may see and resolve permission requests and justifications.
pub const REQUEST_MANAGERS: &[&str] = &[ADMIN, DEV, STAFF_MANAGER];

/// Roles that may see infrastructure reports.
pub const INFRA_VIEWERS: &[&str] = &[ADMIN, DEV, INFRA_MANAGER];

/// Effective roles as reported to clients: the assigned set, or
/// `normal_user` when nothing is assigned. Presentation default only.
pub fn effective_roles(assigned: &[String]) -> Vec<String> {
    if assigned.is_empty() {
        vec![NORMAL_USER.to_string()]
    } else {
        assigned.to_vec()
    }
}

/// Whether the assigned set intersects the required set.
pub fn holds_any(assigned: &[String], required: &[&str]) -> bool {
    assigned.iter().any(|r| required.contains(&r.as_str()))
}
