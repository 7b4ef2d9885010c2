//! Configuration file structures for the nimbus bot.
//!
//! This module defines the configuration file format using YAML. The
//! configuration is split into two sections: the Discord webhook settings
//! and the NWS settings.
//!
//! # Configuration File Format
//!
//! ```yaml
//! discord:
//!   # Full webhook URL, including the token
//!   webhook_url: "https://discord.com/api/webhooks/123/abc"
//!
//! nws:
//!   # Base URL of the NWS API (defaults to the production endpoint)
//!   url: "https://api.weather.gov"
//!
//!   # Path to the zone list file, one zone code per line
//!   zones_file: "zones.txt"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Any value can be overridden with a `NIMBUS_` prefixed environment
//! variable, which is the recommended way to keep the webhook token out of
//! the file:
//!
//! ```bash
//! export NIMBUS_DISCORD__WEBHOOK_URL="https://discord.com/api/webhooks/123/abc"
//! ```

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

/// Root configuration structure for the nimbus bot.
///
/// The webhook URL is the only value without a default: failing to provide
/// it is a fatal startup error, since the bot would have nowhere to post.
#[derive(Deserialize, Debug)]
pub struct Config {
    /// Discord webhook configuration
    pub discord: Discord,
    /// NWS API configuration
    #[serde(default)]
    pub nws: Nws,
}

/// Discord webhook configuration.
#[derive(Deserialize, Debug)]
pub struct Discord {
    /// Full webhook URL, including the token.
    ///
    /// Treat this as a secret: anyone holding the URL can post to the
    /// channel. Prefer the `NIMBUS_DISCORD__WEBHOOK_URL` environment
    /// variable over the file.
    pub webhook_url: String,
}

/// NWS API configuration.
#[derive(Deserialize, Debug)]
pub struct Nws {
    /// Base URL of the NWS API.
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Path to the zone list file, one zone code per line.
    #[serde(default = "default_zones_file")]
    pub zones_file: String,
}

impl Default for Nws {
    fn default() -> Self {
        Nws {
            url: default_api_url(),
            zones_file: default_zones_file(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.weather.gov".to_string()
}

fn default_zones_file() -> String {
    "zones.txt".to_string()
}

impl Config {
    /// Loads the configuration from a YAML file with environment variable
    /// overrides.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be parsed or a required value (the
    /// webhook URL) is missing from both the file and the environment.
    pub fn load(path: &str) -> Result<Config, anyhow::Error> {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("NIMBUS_").split("__"))
            .extract()
            .with_context(|| format!("invalid configuration in {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_full_config() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                concat!(
                    "discord:\n",
                    "  webhook_url: \"https://discord.com/api/webhooks/123/abc\"\n",
                    "nws:\n",
                    "  url: \"http://localhost:8080\"\n",
                    "  zones_file: \"my-zones.txt\"\n",
                ),
            )?;

            let config = Config::load("config.yaml").unwrap();
            assert_eq!(
                config.discord.webhook_url,
                "https://discord.com/api/webhooks/123/abc"
            );
            assert_eq!(config.nws.url, "http://localhost:8080");
            assert_eq!(config.nws.zones_file, "my-zones.txt");
            Ok(())
        });
    }

    #[test]
    fn test_load_applies_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                concat!(
                    "discord:\n",
                    "  webhook_url: \"https://discord.com/api/webhooks/123/abc\"\n",
                ),
            )?;

            let config = Config::load("config.yaml").unwrap();
            assert_eq!(config.nws.url, "https://api.weather.gov");
            assert_eq!(config.nws.zones_file, "zones.txt");
            Ok(())
        });
    }

    #[test]
    fn test_load_missing_webhook_url_fails() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "nws: {}\n")?;

            assert!(Config::load("config.yaml").is_err());
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                concat!(
                    "discord:\n",
                    "  webhook_url: \"https://discord.com/api/webhooks/123/from-file\"\n",
                ),
            )?;
            jail.set_env(
                "NIMBUS_DISCORD__WEBHOOK_URL",
                "https://discord.com/api/webhooks/123/from-env",
            );

            let config = Config::load("config.yaml").unwrap();
            assert_eq!(
                config.discord.webhook_url,
                "https://discord.com/api/webhooks/123/from-env"
            );
            Ok(())
        });
    }
}
