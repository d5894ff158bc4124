//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads process-wide environment variables;
//! the parsing helpers below take `Option<String>` values so binaries read the environment and
//! tests feed values directly.

use crate::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_MAX_CONNECTIONS,
    DEVELOPMENT_JWT_SECRET, MAX_JWT_EXPIRATION_HOURS,
};
use crate::{RecordError, RecordResult};
use std::str::FromStr;

/// Deployment environment, taken from `APP_ENV`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
    Test,
}

impl FromStr for AppEnvironment {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(RecordError::InvalidConfig(format!(
                "APP_ENV must be development, production or test, got '{other}'"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    database_url: String,
    max_connections: u32,
    jwt_secret: String,
    jwt_expiration_hours: i64,
    environment: AppEnvironment,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidConfig`] if the database URL or signing secret is blank,
    /// if the pool size is zero, or if the token lifetime is outside
    /// `1..=MAX_JWT_EXPIRATION_HOURS`.
    pub fn new(
        database_url: String,
        max_connections: u32,
        jwt_secret: String,
        jwt_expiration_hours: i64,
        environment: AppEnvironment,
    ) -> RecordResult<Self> {
        if database_url.trim().is_empty() {
            return Err(RecordError::InvalidConfig(
                "database_url cannot be empty".into(),
            ));
        }
        if jwt_secret.trim().is_empty() {
            return Err(RecordError::InvalidConfig("jwt_secret cannot be empty".into()));
        }
        if max_connections == 0 {
            return Err(RecordError::InvalidConfig(
                "max_connections must be at least 1".into(),
            ));
        }
        if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&jwt_expiration_hours) {
            return Err(RecordError::InvalidConfig(format!(
                "jwt_expiration_hours must be between 1 and {MAX_JWT_EXPIRATION_HOURS}"
            )));
        }

        Ok(Self {
            database_url,
            max_connections,
            jwt_secret,
            jwt_expiration_hours,
            environment,
        })
    }

    /// Resolve configuration from the process environment.
    ///
    /// Reads `APP_ENV`, `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`, `JWT_SECRET` and
    /// `JWT_EXPIRATION_HOURS`. Intended to be called exactly once from a binary's `main`.
    pub fn from_process_env() -> RecordResult<Self> {
        let var = |key: &str| std::env::var(key).ok();

        let environment = app_environment_from_env_value(var("APP_ENV"))?;
        Self::new(
            var("DATABASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            max_connections_from_env_value(var("DATABASE_MAX_CONNECTIONS"))?,
            jwt_secret_from_env_value(var("JWT_SECRET"), environment)?,
            jwt_expiration_hours_from_env_value(var("JWT_EXPIRATION_HOURS"))?,
            environment,
        )
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn jwt_expiration_hours(&self) -> i64 {
        self.jwt_expiration_hours
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `APP_ENV`. Missing or blank values mean development.
pub fn app_environment_from_env_value(value: Option<String>) -> RecordResult<AppEnvironment> {
    non_blank(value)
        .map(|v| v.parse())
        .transpose()
        .map(|env| env.unwrap_or(AppEnvironment::Development))
}

/// Parse `JWT_EXPIRATION_HOURS`, falling back to the default when unset.
pub fn jwt_expiration_hours_from_env_value(value: Option<String>) -> RecordResult<i64> {
    match non_blank(value) {
        None => Ok(DEFAULT_JWT_EXPIRATION_HOURS),
        Some(v) => match v.parse::<i64>() {
            Ok(hours) if (1..=MAX_JWT_EXPIRATION_HOURS).contains(&hours) => Ok(hours),
            _ => Err(RecordError::InvalidConfig(format!(
                "JWT_EXPIRATION_HOURS must be an integer between 1 and \
                 {MAX_JWT_EXPIRATION_HOURS}, got '{v}'"
            ))),
        },
    }
}

/// Parse `DATABASE_MAX_CONNECTIONS`, falling back to the default when unset.
pub fn max_connections_from_env_value(value: Option<String>) -> RecordResult<u32> {
    match non_blank(value) {
        None => Ok(DEFAULT_MAX_CONNECTIONS),
        Some(v) => match v.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(RecordError::InvalidConfig(format!(
                "DATABASE_MAX_CONNECTIONS must be a positive integer, got '{v}'"
            ))),
        },
    }
}

/// Resolve the token signing secret.
///
/// Outside development an explicit `JWT_SECRET` is mandatory; the well-known development
/// secret is never used in production or test deployments.
pub fn jwt_secret_from_env_value(
    value: Option<String>,
    environment: AppEnvironment,
) -> RecordResult<String> {
    match (non_blank(value), environment) {
        (Some(secret), _) => Ok(secret),
        (None, AppEnvironment::Development) => {
            tracing::warn!("JWT_SECRET not set; using the development signing secret");
            Ok(DEVELOPMENT_JWT_SECRET.into())
        }
        (None, _) => Err(RecordError::InvalidConfig(
            "JWT_SECRET must be set outside development".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_environment_defaults_to_development() {
        assert_eq!(
            app_environment_from_env_value(None).unwrap(),
            AppEnvironment::Development
        );
        assert_eq!(
            app_environment_from_env_value(Some("  ".into())).unwrap(),
            AppEnvironment::Development
        );
        assert_eq!(
            app_environment_from_env_value(Some("Production".into())).unwrap(),
            AppEnvironment::Production
        );
    }

    #[test]
    fn test_app_environment_rejects_unknown_value() {
        let err = app_environment_from_env_value(Some("staging".into()))
            .expect_err("unknown environment should fail");
        assert!(matches!(err, RecordError::InvalidConfig(_)));
    }

    #[test]
    fn test_jwt_expiration_hours_parsing() {
        assert_eq!(
            jwt_expiration_hours_from_env_value(None).unwrap(),
            DEFAULT_JWT_EXPIRATION_HOURS
        );
        assert_eq!(
            jwt_expiration_hours_from_env_value(Some("48".into())).unwrap(),
            48
        );
        assert!(jwt_expiration_hours_from_env_value(Some("0".into())).is_err());
        assert!(jwt_expiration_hours_from_env_value(Some("soon".into())).is_err());
        assert_eq!(
            jwt_expiration_hours_from_env_value(Some(MAX_JWT_EXPIRATION_HOURS.to_string()))
                .unwrap(),
            MAX_JWT_EXPIRATION_HOURS
        );
        assert!(jwt_expiration_hours_from_env_value(Some("1000000000000".into())).is_err());
        assert!(jwt_expiration_hours_from_env_value(Some(i64::MAX.to_string())).is_err());
    }

    #[test]
    fn test_max_connections_parsing() {
        assert_eq!(
            max_connections_from_env_value(None).unwrap(),
            DEFAULT_MAX_CONNECTIONS
        );
        assert_eq!(max_connections_from_env_value(Some("4".into())).unwrap(), 4);
        assert!(max_connections_from_env_value(Some("-1".into())).is_err());
    }

    #[test]
    fn test_jwt_secret_required_outside_development() {
        assert_eq!(
            jwt_secret_from_env_value(None, AppEnvironment::Development).unwrap(),
            DEVELOPMENT_JWT_SECRET
        );
        assert!(jwt_secret_from_env_value(None, AppEnvironment::Production).is_err());
        assert_eq!(
            jwt_secret_from_env_value(Some("s3cret".into()), AppEnvironment::Production)
                .unwrap(),
            "s3cret"
        );
    }

    #[test]
    fn test_core_config_rejects_blank_values() {
        let err = CoreConfig::new(
            " ".into(),
            1,
            "secret".into(),
            24,
            AppEnvironment::Test,
        )
        .expect_err("blank database url should fail");
        assert!(matches!(err, RecordError::InvalidConfig(_)));

        let err = CoreConfig::new(
            "sqlite::memory:".into(),
            1,
            "secret".into(),
            0,
            AppEnvironment::Test,
        )
        .expect_err("zero token lifetime should fail");
        assert!(matches!(err, RecordError::InvalidConfig(_)));

        let err = CoreConfig::new(
            "sqlite::memory:".into(),
            1,
            "secret".into(),
            MAX_JWT_EXPIRATION_HOURS + 1,
            AppEnvironment::Test,
        )
        .expect_err("overlong token lifetime should fail");
        assert!(matches!(err, RecordError::InvalidConfig(_)));
    }
}
