//! Configuration management for the mailpipe handlers.

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Handler configuration with defaults, file, and environment overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The handlers work out-of-the-box with the defaults; deployments override
/// individual settings through environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name of the SES configuration set attached to every outbound send.
    ///
    /// The configuration set routes delivery events to the feedback channel
    /// the notification handler consumes.
    ///
    /// Environment variable: `SES_CONFIG_SET_NAME`
    #[serde(default = "default_config_set_name", alias = "SES_CONFIG_SET_NAME")]
    pub ses_config_set_name: String,

    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Loads configuration from defaults, config file, and environment
    /// variable overrides.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration values.
    fn validate(&self) -> Result<()> {
        if self.ses_config_set_name.is_empty() {
            anyhow::bail!("ses_config_set_name must not be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ses_config_set_name: default_config_set_name(),
            rust_log: default_log_level(),
        }
    }
}

fn default_config_set_name() -> String {
    "my-first-configuration-set".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
