//! Authentication configuration.
//!
//! Built once at process start and handed to [`crate::TokenCodec::new`];
//! verification code never reads the environment itself.

use chrono::Duration;
use thiserror::Error;

/// Placeholder signing secret, accepted only outside production.
pub const DEV_PLACEHOLDER_SECRET: &str = "clinidoc-dev-secret-do-not-use-in-production";

/// Minimum signing secret length (bytes) enforced in production.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Default token validity: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

pub const ENV_SECRET: &str = "AUTH_TOKEN_SECRET";
pub const ENV_TTL_SECS: &str = "AUTH_TOKEN_TTL_SECS";
pub const ENV_APP_ENV: &str = "APP_ENV";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") || v.eq_ignore_ascii_case("prod") => {
                Environment::Production
            }
            _ => Environment::Development,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("AUTH_TOKEN_SECRET must be set in production")]
    MissingSecret,

    #[error("AUTH_TOKEN_SECRET must be at least 32 bytes in production")]
    WeakSecret,

    #[error("AUTH_TOKEN_TTL_SECS must be a positive integer number of seconds, got '{0}'")]
    InvalidTtl(String),
}

/// Configuration for the token codec.
#[derive(Clone)]
pub struct AuthConfig {
    signing_secret: String,
    token_validity: Duration,
    environment: Environment,
}

impl AuthConfig {
    /// Explicit construction (tests, embedding). No environment checks apply.
    pub fn new(signing_secret: impl Into<String>, token_validity: Duration) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            token_validity,
            environment: Environment::Development,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// A missing secret falls back to [`DEV_PLACEHOLDER_SECRET`] only in
    /// development; in production it is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::parse(lookup(ENV_APP_ENV).as_deref());

        let secret = lookup(ENV_SECRET).filter(|s| !s.trim().is_empty());
        let signing_secret = match (secret, environment) {
            (Some(s), Environment::Production) if s.len() < MIN_PRODUCTION_SECRET_LEN => {
                return Err(ConfigError::WeakSecret);
            }
            (Some(s), _) => s,
            (None, Environment::Production) => return Err(ConfigError::MissingSecret),
            (None, Environment::Development) => {
                tracing::warn!("{ENV_SECRET} not set; using insecure development placeholder");
                DEV_PLACEHOLDER_SECRET.to_string()
            }
        };

        let token_validity = match lookup(ENV_TTL_SECS) {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ConfigError::InvalidTtl(raw.clone()))?;
                if secs <= 0 {
                    return Err(ConfigError::InvalidTtl(raw));
                }
                Duration::try_seconds(secs).ok_or_else(|| ConfigError::InvalidTtl(raw.clone()))?
            }
            None => Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        };

        Ok(Self {
            signing_secret,
            token_validity,
            environment,
        })
    }

    pub fn with_token_validity(mut self, token_validity: Duration) -> Self {
        self.token_validity = token_validity;
        self
    }

    pub fn signing_secret(&self) -> &[u8] {
        self.signing_secret.as_bytes()
    }

    pub fn token_validity(&self) -> Duration {
        self.token_validity
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"<redacted>")
            .field("token_validity", &self.token_validity)
            .field("environment", &self.environment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn development_falls_back_to_placeholder() {
        let cfg = AuthConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.signing_secret(), DEV_PLACEHOLDER_SECRET.as_bytes());
        assert_eq!(cfg.token_validity(), Duration::hours(24));
        assert_eq!(cfg.environment(), Environment::Development);
    }

    #[test]
    fn production_without_secret_is_an_error() {
        let err = AuthConfig::from_lookup(lookup(&[(ENV_APP_ENV, "production")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingSecret);

        let err = AuthConfig::from_lookup(lookup(&[(ENV_APP_ENV, "production"), (ENV_SECRET, "  ")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingSecret);
    }

    #[test]
    fn production_rejects_short_secret() {
        let err = AuthConfig::from_lookup(lookup(&[(ENV_APP_ENV, "prod"), (ENV_SECRET, "short")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::WeakSecret);
    }

    #[test]
    fn production_accepts_explicit_secret_and_ttl() {
        let secret = "0123456789abcdef0123456789abcdef";
        let cfg = AuthConfig::from_lookup(lookup(&[
            (ENV_APP_ENV, "Production"),
            (ENV_SECRET, secret),
            (ENV_TTL_SECS, "3600"),
        ]))
        .unwrap();
        assert_eq!(cfg.signing_secret(), secret.as_bytes());
        assert_eq!(cfg.token_validity(), Duration::hours(1));
        assert_eq!(cfg.environment(), Environment::Production);
    }

    #[test]
    fn non_numeric_ttl_is_rejected() {
        let err = AuthConfig::from_lookup(lookup(&[(ENV_TTL_SECS, "a day")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidTtl("a day".to_string()));
    }

    #[test]
    fn non_positive_or_out_of_range_ttl_is_rejected() {
        for raw in ["0", "-5", "9223372036854775807"] {
            let err = AuthConfig::from_lookup(lookup(&[(ENV_TTL_SECS, raw)])).unwrap_err();
            assert_eq!(err, ConfigError::InvalidTtl(raw.to_string()), "{raw}");
        }
    }

    #[test]
    fn debug_output_redacts_secret() {
        let cfg = AuthConfig::new("super-secret-value", Duration::minutes(5));
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("super-secret-value"));
        assert!(dbg.contains("redacted"));
    }
}
