use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::password::{hash_password, validate_password},
    config::AdminBootstrap,
    error::AppError,
    users::{
        repo::UserStore,
        repo_types::{NewUser, User},
    },
};

pub const MAX_EMAIL_LEN: usize = 255;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalizes and validates an email for storage.
pub fn clean_email(raw: &str) -> Result<String, AppError> {
    let email = normalize_email(raw);
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".into()));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(AppError::Validation(format!(
            "Email must be at most {MAX_EMAIL_LEN} characters"
        )));
    }
    if !is_valid_email(&email) {
        return Err(AppError::Validation("Enter a valid email address".into()));
    }
    Ok(email)
}

/// Creates an account from `profile`, replacing its email with the
/// normalized one and its password hash with the hash of `password`.
pub async fn create_account(
    store: &dyn UserStore,
    email: &str,
    password: &str,
    profile: NewUser,
) -> Result<User, AppError> {
    let email = clean_email(email)?;
    validate_password(password)?;

    if store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict(
            "A user with this email already exists".into(),
        ));
    }

    let password_hash = hash_password(password)?;
    let user = store
        .create(NewUser {
            email,
            password_hash,
            ..profile
        })
        .await?;

    info!(user_id = user.id, email = %user.email, is_admin = user.is_admin, "account created");
    Ok(user)
}

/// Makes sure the configured superuser exists. An existing account with
/// the same email is left as it is.
pub async fn ensure_superuser(store: &dyn UserStore, admin: &AdminBootstrap) -> anyhow::Result<()> {
    let email = normalize_email(&admin.email);
    if let Some(existing) = store.find_by_email(&email).await? {
        info!(user_id = existing.id, "superuser already present");
        return Ok(());
    }

    let profile = NewUser {
        is_admin: true,
        is_superuser: true,
        ..NewUser::default()
    };
    create_account(store, &email, &admin.password, profile).await?;
    Ok(())
}
