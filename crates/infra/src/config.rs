//! Layered configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. optional TOML file (`CONDOHUB_CONFIG`, default `config/condohub.toml`)
//! 3. environment variables `CONDOHUB__SECTION__KEY`
//!
//! A `.env` file is loaded into the process environment before reading.

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, builder::DefaultState};
use serde::Deserialize;

use condohub_observability::LogFormat;

pub const DEFAULT_CONFIG_PATH: &str = "config/condohub.toml";
const ENV_PREFIX: &str = "CONDOHUB";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub auth: AuthSettings,
    pub hooks: HookSettings,
    pub logging: LoggingSettings,
    #[serde(default)]
    pub bootstrap: Option<BootstrapSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    #[serde(default)]
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub session_ttl_minutes: i64,
    #[serde(default)]
    pub password_pepper: Option<String>,
}

impl AuthSettings {
    /// Longest accepted session lifetime (one year).
    pub const MAX_SESSION_TTL_MINUTES: i64 = 365 * 24 * 60;

    /// Saturates instead of panicking on out-of-range values; `validate`
    /// rejects those at load time.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.session_ttl_minutes).unwrap_or(chrono::Duration::MAX)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HookSettings {
    /// Spawn hooks instead of awaiting them.
    pub detached: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub filter: String,
    pub format: LogFormat,
}

/// First enterprise and administrator, created when the store is empty.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapSettings {
    pub enterprise_name: String,
    pub admin_email: String,
    pub admin_password: String,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("store.backend", "memory")?
        .set_default("store.max_connections", 10)?
        .set_default("auth.session_ttl_minutes", 720)?
        .set_default("hooks.detached", true)?
        .set_default("logging.filter", "info")?
        .set_default("logging.format", "json")
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load from defaults, the optional config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let path = std::env::var("CONDOHUB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let settings: Self = defaults()?
            .add_source(File::with_name(&path).required(false))
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults overlaid with a TOML document. Ignores the environment.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let settings: Self = defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Postgres && self.store.database_url.is_none() {
            return Err(ConfigError::Message(
                "store.database_url is required for the postgres backend".to_string(),
            ));
        }
        if self.auth.session_ttl_minutes <= 0 {
            return Err(ConfigError::Message("auth.session_ttl_minutes must be positive".to_string()));
        }
        if self.auth.session_ttl_minutes > AuthSettings::MAX_SESSION_TTL_MINUTES {
            return Err(ConfigError::Message(format!(
                "auth.session_ttl_minutes must be at most {}",
                AuthSettings::MAX_SESSION_TTL_MINUTES
            )));
        }
        Ok(())
    }
}
