//! Server configuration, loaded from the environment.

use quadro_auth::AuthConfig;
use quadro_db::DbConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
    /// Broadcast buffer for the change-event bus.
    pub event_bus_capacity: usize,
}

impl ServerConfig {
    /// Read configuration from `QUADRO_*` environment variables.
    ///
    /// Database settings fall back to local-development defaults; the
    /// two token secrets have no default and must be set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: var_or("QUADRO_DB_URL", db_defaults.url),
            namespace: var_or("QUADRO_DB_NAMESPACE", db_defaults.namespace),
            database: var_or("QUADRO_DB_DATABASE", db_defaults.database),
            username: var_or("QUADRO_DB_USERNAME", db_defaults.username),
            password: var_or("QUADRO_DB_PASSWORD", db_defaults.password),
        };

        let auth_defaults = AuthConfig::default();
        let auth = AuthConfig {
            access_token_secret: require("QUADRO_ACCESS_TOKEN_SECRET")?,
            refresh_token_secret: require("QUADRO_REFRESH_TOKEN_SECRET")?,
            access_token_lifetime_secs: parsed_or(
                "QUADRO_ACCESS_TOKEN_LIFETIME_SECS",
                auth_defaults.access_token_lifetime_secs,
            )?,
            refresh_token_lifetime_secs: parsed_or(
                "QUADRO_REFRESH_TOKEN_LIFETIME_SECS",
                auth_defaults.refresh_token_lifetime_secs,
            )?,
            issuer: auth_defaults.issuer,
        };

        let event_bus_capacity = parsed_or("QUADRO_EVENT_BUS_CAPACITY", 256)?;

        Ok(Self {
            db,
            auth,
            event_bus_capacity,
        })
    }
}

fn var_or(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
        }),
        Err(_) => Ok(default),
    }
}
