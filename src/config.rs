use std::fmt;

use anyhow::{bail, Context};

/// Minimum accepted length of an HMAC signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

pub const DEFAULT_TTL_MINUTES: i64 = 60 * 24;
/// Upper bound on the session lifetime: one year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

/// HMAC secret identified by the `kid` it is published under.
#[derive(Clone)]
pub struct SigningKey {
    pub id: String,
    pub secret: String,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Key used to sign new tokens.
    pub current: SigningKey,
    /// Keys that are no longer used for signing but still verify.
    pub retired: Vec<SigningKey>,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

impl JwtConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_TTL_MINUTES).contains(&self.ttl_minutes) {
            bail!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}");
        }
        for key in std::iter::once(&self.current).chain(&self.retired) {
            if key.id.is_empty() {
                bail!("signing key id must not be empty");
            }
            if key.secret.len() < MIN_SECRET_LEN {
                bail!(
                    "signing key {:?} is shorter than {} bytes",
                    key.id,
                    MIN_SECRET_LEN
                );
            }
        }
        if self.retired.iter().any(|k| k.id == self.current.id) {
            bail!("retired key reuses the current key id {:?}", self.current.id);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub secure: bool,
}

/// Credentials of the superuser ensured at startup.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub admin: Option<AdminBootstrap>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let retired = match std::env::var("JWT_RETIRED_KEYS") {
            Ok(raw) => parse_retired_keys(&raw)?,
            Err(_) => Vec::new(),
        };
        let jwt = JwtConfig {
            current: SigningKey {
                id: std::env::var("JWT_KEY_ID").unwrap_or_else(|_| "primary".into()),
                secret: read_secret()?,
            },
            retired,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "user-accounts".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "user-accounts-clients".into()),
            ttl_minutes: parse_ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok().as_deref())?,
        };
        jwt.validate()?;

        let cookie = CookieConfig {
            secure: std::env::var("COOKIE_SECURE")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        };

        let admin = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminBootstrap { email, password }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt,
            cookie,
            admin,
        })
    }
}

/// The signing secret comes from `JWT_SECRET`, or from the file named by
/// `JWT_SECRET_FILE` (a mounted secret).
fn read_secret() -> anyhow::Result<String> {
    if let Ok(secret) = std::env::var("JWT_SECRET") {
        return Ok(secret);
    }
    let path = std::env::var("JWT_SECRET_FILE")
        .context("either JWT_SECRET or JWT_SECRET_FILE must be set")?;
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("read JWT secret from {path}"))?;
    Ok(raw.trim().to_string())
}

pub fn parse_ttl_minutes(raw: Option<&str>) -> anyhow::Result<i64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_TTL_MINUTES),
        Some(v) => v
            .parse::<i64>()
            .with_context(|| format!("JWT_TTL_MINUTES {v:?} is not a whole number of minutes")),
    }
}

/// Parses `kid=secret,kid=secret`.
pub fn parse_retired_keys(raw: &str) -> anyhow::Result<Vec<SigningKey>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, secret) = entry
                .split_once('=')
                .with_context(|| format!("retired key entry {entry:?} is not kid=secret"))?;
            Ok(SigningKey {
                id: id.trim().to_string(),
                secret: secret.trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str, secret: &str) -> SigningKey {
        SigningKey {
            id: id.into(),
            secret: secret.into(),
        }
    }

    fn jwt_config(current: SigningKey, retired: Vec<SigningKey>) -> JwtConfig {
        JwtConfig {
            current,
            retired,
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: 60,
        }
    }

    #[test]
    fn parses_retired_keys() {
        let keys = parse_retired_keys(" old=aaaa , older=bb=cc,").expect("parse");
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].id, "old");
        assert_eq!(keys[0].secret, "aaaa");
        assert_eq!(keys[1].id, "older");
        assert_eq!(keys[1].secret, "bb=cc");
    }

    #[test]
    fn rejects_retired_entry_without_separator() {
        assert!(parse_retired_keys("just-a-secret").is_err());
    }

    #[test]
    fn rejects_short_secret() {
        let cfg = jwt_config(key("primary", "short"), vec![]);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("shorter than"));
    }

    #[test]
    fn rejects_retired_key_reusing_current_id() {
        let secret = "x".repeat(MIN_SECRET_LEN);
        let cfg = jwt_config(key("primary", &secret), vec![key("primary", &secret)]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn accepts_rotated_key_ring() {
        let cfg = jwt_config(
            key("2024-10", &"a".repeat(MIN_SECRET_LEN)),
            vec![key("2024-04", &"b".repeat(MIN_SECRET_LEN))],
        );
        cfg.validate().expect("valid config");
    }

    #[test]
    fn ttl_defaults_to_a_day_and_rejects_garbage() {
        assert_eq!(parse_ttl_minutes(None).expect("default"), DEFAULT_TTL_MINUTES);
        assert_eq!(parse_ttl_minutes(Some(" 90 ")).expect("parse"), 90);
        assert!(parse_ttl_minutes(Some("a day")).is_err());
        assert!(parse_ttl_minutes(Some("99999999999999999999")).is_err());
    }

    #[test]
    fn rejects_out_of_range_ttl() {
        let secret = "x".repeat(MIN_SECRET_LEN);
        let mut cfg = jwt_config(key("primary", &secret), vec![]);
        cfg.ttl_minutes = 0;
        assert!(cfg.validate().is_err());
        cfg.ttl_minutes = 10_000_000_000;
        assert!(cfg.validate().is_err());
        cfg.ttl_minutes = MAX_TTL_MINUTES;
        cfg.validate().expect("a year is allowed");
    }

    #[test]
    fn debug_output_hides_secret() {
        let out = format!("{:?}", key("primary", "super-secret-value"));
        assert!(!out.contains("super-secret-value"));
    }
}
