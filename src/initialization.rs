use std::env;
use std::fs::read_to_string;
use std::str::FromStr;
use log::{info, LevelFilter};
use serde::Deserialize;
use crate::errors::{ConfigError, UnrecoverableError};
use crate::logging::setup_logger;
use crate::manager_pvwatts::models::ArraySetup;

const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
const API_KEY_ENV: &str = "PVWATTS_API_KEY";

#[derive(Deserialize, Clone)]
pub struct WebServer {
    pub bind_address: String,
    pub bind_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct PvWattsConfig {
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct General {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub log_path: Option<String>,
}

impl General {
    /// Returns the configured log level as a filter
    pub fn level(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError(format!("unknown log level '{}'", self.log_level)))
    }
}

impl Default for General {
    fn default() -> Self {
        Self { log_level: default_log_level(), log_path: None }
    }
}

#[derive(Deserialize, Clone)]
pub struct Config {
    pub web_server: WebServer,
    pub pvwatts: PvWattsConfig,
    #[serde(default)]
    pub array: ArraySetup,
    #[serde(default)]
    pub general: General,
}

fn default_timeout_secs() -> u64 { 30 }

fn default_log_level() -> String { "info".to_string() }

/// Loads configuration and sets up logging
///
/// The path to the config file is taken from the first program argument, and the
/// PVWatts API key from the environment (or a .env file) if present there.
pub fn config() -> Result<Config, UnrecoverableError> {
    let _ = dotenvy::dotenv();

    let path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let toml = read_to_string(&path)
        .map_err(|e| ConfigError(format!("unable to read {}: {}", path, e)))?;

    let config = apply_api_key(parse_config(&toml)?, env::var(API_KEY_ENV).ok())?;
    setup_logger(&config.general)?;

    info!("configuration loaded from {}", path);
    Ok(config)
}

/// Parses and validates configuration given in toml format
///
/// # Arguments
///
/// * 'toml' - the configuration file content
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml)?;
    config.general.level()?;

    if config.pvwatts.timeout_secs == 0 {
        return Err(ConfigError::from("pvwatts.timeout_secs must be greater than zero"));
    }

    Ok(config)
}

/// Overrides the API key from the config file with one from the environment, if given,
/// and makes sure a key is present
///
/// # Arguments
///
/// * 'config' - parsed configuration
/// * 'env_key' - API key found in the environment
pub fn apply_api_key(mut config: Config, env_key: Option<String>) -> Result<Config, ConfigError> {
    if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
        config.pvwatts.api_key = key.trim().to_string();
    }

    if config.pvwatts.api_key.is_empty() {
        return Err(ConfigError(format!("no PVWatts API key given, set {} or pvwatts.api_key", API_KEY_ENV)));
    }

    Ok(config)
}
