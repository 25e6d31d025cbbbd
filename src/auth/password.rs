use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    // Hash with the live parameters, so a failed lookup costs as much as a real check.
    static ref DUMMY_HASH: Option<String> = hash_password("not-a-real-account-password").ok();
}

/// Rejects passwords that are too short or blank.
pub fn validate_password(plain: &str) -> Result<(), AppError> {
    if plain.trim().is_empty() {
        return Err(AppError::Validation("Password must not be blank".into()));
    }
    if plain.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must contain at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Runs a full argon2 verification against a throwaway hash. Used when no
/// account matches, so response time does not reveal which emails exist.
/// Always `false`.
pub fn verify_dummy(plain: &str) -> bool {
    match DUMMY_HASH.as_deref() {
        Some(hash) => {
            let _ = verify_password(plain, hash);
        }
        None => {
            let _ = hash_password(plain);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct-horse-battery-staple").expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        assert!(verify_password("anything", "not-a-valid-hash").is_err());
    }

    #[test]
    fn dummy_verification_never_matches() {
        assert!(!verify_dummy("not-a-real-account-password-guess"));
        assert!(!verify_dummy(""));
        let hash = DUMMY_HASH.as_deref().expect("dummy hash");
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn short_and_blank_passwords_are_rejected() {
        assert!(matches!(validate_password("short"), Err(AppError::Validation(_))));
        assert!(matches!(validate_password("        "), Err(AppError::Validation(_))));
        assert!(validate_password("long-enough").is_ok());
    }
}
