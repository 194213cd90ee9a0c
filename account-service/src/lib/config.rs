use std::env;

use auth::TokenCodec;
use auth::MIN_SECRET_LENGTH;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Run mode in which a missing signing secret is fatal.
pub const PRODUCTION_MODE: &str = "production";

/// Upper bound on `auth.token_lifetime_hours` (one year).
pub const MAX_TOKEN_LIFETIME_HOURS: i64 = 8_760;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_run_mode")]
    pub run_mode: String,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Session token configuration.
#[derive(Deserialize, Clone)]
pub struct AuthConfig {
    /// Token signing secret. Required in production.
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "default_token_lifetime_hours")]
    pub token_lifetime_hours: i64,
}

// Never print the secret itself
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("token_lifetime_hours", &self.token_lifetime_hours)
            .finish()
    }
}

/// Where the signing secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    Configured,
    Ephemeral,
}

fn default_run_mode() -> String {
    "development".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_token_lifetime_hours() -> i64 {
    24
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, AUTH__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| default_run_mode());
        Self::load_with(run_mode, Environment::default().separator("__"))
    }

    fn load_with(run_mode: String, environment: Environment) -> Result<Self, ConfigError> {
        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: AUTH__SECRET=... overrides auth.secret
            .add_source(environment)
            .set_override("run_mode", run_mode)?
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.auth.validate(config.is_production())?;

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.run_mode == PRODUCTION_MODE
    }
}

impl AuthConfig {
    /// Check the secret and lifetime against the run mode.
    ///
    /// # Errors
    /// * `Message` - Secret missing in production, secret too short, or
    ///   lifetime outside 1 to `MAX_TOKEN_LIFETIME_HOURS`
    pub fn validate(&self, production: bool) -> Result<(), ConfigError> {
        match &self.secret {
            None if production => {
                return Err(ConfigError::Message(
                    "auth.secret must be set in production (AUTH__SECRET)".to_string(),
                ))
            }
            Some(secret) if secret.len() < MIN_SECRET_LENGTH => {
                return Err(ConfigError::Message(format!(
                    "auth.secret must be at least {} bytes, got {}",
                    MIN_SECRET_LENGTH,
                    secret.len()
                )))
            }
            _ => {}
        }

        if !(1..=MAX_TOKEN_LIFETIME_HOURS).contains(&self.token_lifetime_hours) {
            return Err(ConfigError::Message(format!(
                "auth.token_lifetime_hours must be between 1 and {}, got {}",
                MAX_TOKEN_LIFETIME_HOURS, self.token_lifetime_hours
            )));
        }

        Ok(())
    }

    /// Resolve the signing secret, generating an ephemeral one when none is
    /// configured. Call `validate` first: it rejects a missing secret in
    /// production.
    pub fn signing_secret(&self) -> (Vec<u8>, SecretSource) {
        match &self.secret {
            Some(secret) => (secret.as_bytes().to_vec(), SecretSource::Configured),
            None => (
                TokenCodec::generate_secret().to_vec(),
                SecretSource::Ephemeral,
            ),
        }
    }

    pub fn token_lifetime(&self) -> Duration {
        Duration::hours(self.token_lifetime_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_config(secret: Option<&str>) -> AuthConfig {
        AuthConfig {
            secret: secret.map(str::to_string),
            token_lifetime_hours: 24,
        }
    }

    #[test]
    fn test_production_requires_secret() {
        let result = auth_config(None).validate(true);
        assert!(matches!(result, Err(ConfigError::Message(_))));
    }

    #[test]
    fn test_development_allows_missing_secret() {
        let config = auth_config(None);
        assert!(config.validate(false).is_ok());

        let (first, source) = config.signing_secret();
        let (second, _) = config.signing_secret();
        assert_eq!(source, SecretSource::Ephemeral);
        assert_eq!(first.len(), MIN_SECRET_LENGTH);
        assert_ne!(first, second);
    }

    #[test]
    fn test_short_secret_rejected_in_every_mode() {
        let config = auth_config(Some("too-short"));
        assert!(config.validate(true).is_err());
        assert!(config.validate(false).is_err());
    }

    #[test]
    fn test_configured_secret_used_verbatim() {
        let config = auth_config(Some("a-configured-secret-of-at-least-32-bytes"));
        assert!(config.validate(true).is_ok());

        let (secret, source) = config.signing_secret();
        assert_eq!(source, SecretSource::Configured);
        assert_eq!(secret, b"a-configured-secret-of-at-least-32-bytes".to_vec());
    }

    #[test]
    fn test_non_positive_lifetime_rejected() {
        let config = AuthConfig {
            secret: None,
            token_lifetime_hours: 0,
        };
        assert!(config.validate(false).is_err());
    }

    #[test]
    fn test_lifetime_capped_at_one_year() {
        let mut config = auth_config(None);

        config.token_lifetime_hours = MAX_TOKEN_LIFETIME_HOURS;
        assert!(config.validate(false).is_ok());

        config.token_lifetime_hours = MAX_TOKEN_LIFETIME_HOURS + 1;
        assert!(config.validate(false).is_err());

        config.token_lifetime_hours = 10_000_000_000;
        assert!(config.validate(false).is_err());
    }

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let vars = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<config::Map<String, String>>();
        Environment::default().separator("__").source(Some(vars))
    }

    #[test]
    fn test_load_reads_secret_from_environment_in_production() {
        let secret = "a-production-secret-that-is-40-bytes-long";
        let config = Config::load_with(
            PRODUCTION_MODE.to_string(),
            environment(&[
                ("AUTH__SECRET", secret),
                ("DATABASE__URL", "postgres://db.internal/inventory"),
                ("SERVER__HTTP_PORT", "8080"),
            ]),
        )
        .expect("Production config with AUTH__SECRET should load");

        assert!(config.is_production());
        assert_eq!(config.auth.secret.as_deref(), Some(secret));
        assert_eq!(config.database.url, "postgres://db.internal/inventory");
        assert_eq!(config.server.http_port, 8080);

        let (signing_secret, source) = config.auth.signing_secret();
        assert_eq!(source, SecretSource::Configured);
        assert_eq!(signing_secret, secret.as_bytes().to_vec());
    }

    #[test]
    fn test_load_fails_in_production_without_secret() {
        let result = Config::load_with(PRODUCTION_MODE.to_string(), environment(&[]));
        assert!(matches!(result, Err(ConfigError::Message(_))));
    }

    #[test]
    fn test_load_development_defaults() {
        let config = Config::load_with("development".to_string(), environment(&[]))
            .expect("Development config should load without a secret");

        assert!(!config.is_production());
        assert_eq!(config.auth.secret, None);
        assert_eq!(config.auth.token_lifetime_hours, 24);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = auth_config(Some("a-configured-secret-of-at-least-32-bytes"));
        let printed = format!("{:?}", config);
        assert!(!printed.contains("a-configured-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
