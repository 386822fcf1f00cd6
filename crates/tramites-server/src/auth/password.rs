//! Credential handling for staff accounts.
//!
//! Passwords are stored as argon2id PHC strings; plaintext never reaches
//! the database. Self-chosen passwords pass through [`check_new_password`]
//! so registration and the change-password endpoint enforce the same rule
//! with the same Spanish message.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Minimum length accepted for a self-chosen password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validate a password a user picked for themselves. The error string is
/// the body the HTTP layer returns as-is.
pub fn check_new_password(plain: &str) -> Result<(), String> {
    if plain.len() < MIN_PASSWORD_LEN {
        return Err(format!(
            "La contraseña debe tener al menos {MIN_PASSWORD_LEN} caracteres"
        ));
    }
    Ok(())
}

/// argon2id hash with a fresh random salt, in PHC string form.
pub fn hash_password(plain: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(plain.as_bytes(), &salt)?
        .to_string())
}

/// Check a login attempt against the stored hash. A mismatch is
/// `Ok(false)`; a stored value that is not a PHC string is an error.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(stored)?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_credential_round_trips() {
        let hash = hash_password("Temporal01").unwrap();
        assert!(verify_password("Temporal01", &hash).unwrap());
        assert!(!verify_password("Temporal02", &hash).unwrap());
    }

    #[test]
    fn equal_passwords_get_distinct_salts() {
        // two staff accounts registered with the default credential must
        // not share a hash
        let h1 = hash_password("Temporal01").unwrap();
        let h2 = hash_password("Temporal01").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn malformed_stored_hash_is_an_error_not_a_match() {
        assert!(verify_password("Temporal01", "no-es-un-hash").is_err());
    }

    #[test]
    fn new_password_length_rule() {
        assert!(check_new_password("corta").is_err());
        assert_eq!(
            check_new_password("corta").unwrap_err(),
            "La contraseña debe tener al menos 6 caracteres"
        );
        assert!(check_new_password("nueva456").is_ok());
    }
}
