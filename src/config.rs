use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::resolver::ResolverTimeouts;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub agent: AgentSettings,
    pub fallback: FallbackSettings,
    pub recent: RecentSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl AgentSettings {
    /// The agent only runs when switched on and given credentials
    pub fn api_key_if_active(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FallbackSettings {
    pub geocoding_url: String,
    pub forecast_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentSettings {
    pub capacity: usize,
    pub display_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from defaults, files and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables prefixed with WEATHER__
    ///    e.g., WEATHER__SERVER__PORT -> server.port
    /// 4. Plain variables: HOST, PORT, USE_AGENT, OPENAI_API_KEY, AGENT_MODEL,
    ///    LOG_LEVEL, LOG_FORMAT
    pub fn load() -> Result<Self, ConfigError> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(prefixed_env())
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .add_source(prefixed_env())
            .build()?;

        settings.try_deserialize()
    }

    pub fn resolver_timeouts(&self) -> ResolverTimeouts {
        ResolverTimeouts {
            agent: Duration::from_secs(self.agent.timeout_secs),
            fallback: Duration::from_secs(self.fallback.timeout_secs),
        }
    }
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 5000)?
        .set_default("agent.enabled", true)?
        .set_default("agent.base_url", "https://api.openai.com/v1")?
        .set_default("agent.model", "gpt-4o-mini")?
        .set_default("agent.timeout_secs", 120)?
        .set_default(
            "fallback.geocoding_url",
            crate::services::open_meteo::DEFAULT_GEOCODING_URL,
        )?
        .set_default(
            "fallback.forecast_url",
            crate::services::open_meteo::DEFAULT_FORECAST_URL,
        )?
        .set_default("fallback.timeout_secs", 60)?
        .set_default("recent.capacity", crate::core::DEFAULT_CAPACITY as u64)?
        .set_default("recent.display_limit", crate::core::DEFAULT_DISPLAY_LIMIT as u64)?
        .set_default("logging.level", default_log_level())?
        .set_default("logging.format", default_log_format())
}

fn prefixed_env() -> Environment {
    Environment::with_prefix("WEATHER")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the short, unprefixed variables commonly set in `.env` files
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(host) = env::var("HOST") {
        builder = builder.set_override("server.host", host)?;
    }
    if let Ok(port) = env::var("PORT") {
        let port: u16 = port
            .parse()
            .map_err(|e| ConfigError::Message(format!("Invalid PORT '{}': {}", port, e)))?;
        builder = builder.set_override("server.port", i64::from(port))?;
    }
    if let Ok(use_agent) = env::var("USE_AGENT") {
        builder = builder.set_override("agent.enabled", use_agent.trim().eq_ignore_ascii_case("true"))?;
    }
    if let Ok(api_key) = env::var("OPENAI_API_KEY") {
        builder = builder.set_override("agent.api_key", api_key)?;
    }
    if let Ok(model) = env::var("AGENT_MODEL") {
        builder = builder.set_override("agent.model", model)?;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        builder = builder.set_override("logging.level", level.to_lowercase())?;
    }
    if let Ok(format) = env::var("LOG_FORMAT") {
        builder = builder.set_override("logging.format", format.to_lowercase())?;
    }

    builder.build()
}
