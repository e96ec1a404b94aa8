use crate::constants;
use crate::error::{GeocoderError, Result};
use serde::Deserialize;
use std::fs;
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_min_delay_seconds")]
    pub min_delay_seconds: u64,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            GeocoderError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path, e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Fall back to built-in defaults when no config file is present.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Using default configuration: {}", e);
                Config::default()
            }
        }
    }
}

impl GeocodingConfig {
    /// GEOCODER_USER_AGENT overrides the configured agent. Nominatim's usage
    /// policy wants each deployment to identify itself.
    pub fn effective_user_agent(&self) -> String {
        std::env::var("GEOCODER_USER_AGENT")
            .ok()
            .filter(|agent| !agent.trim().is_empty())
            .unwrap_or_else(|| self.user_agent.clone())
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            min_delay_seconds: default_min_delay_seconds(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_base_url() -> String {
    constants::NOMINATIM_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    constants::DEFAULT_USER_AGENT.to_string()
}

fn default_min_delay_seconds() -> u64 {
    constants::DEFAULT_MIN_DELAY_SECONDS
}

fn default_timeout_seconds() -> u64 {
    constants::DEFAULT_TIMEOUT_SECONDS
}

fn default_port() -> u16 {
    constants::DEFAULT_SERVER_PORT
}
