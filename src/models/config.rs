//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use scraper::Selector;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::EmbedTemplate;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Channel that holds the tracked message
    pub channel_id: String,

    /// Page the counts are scraped from
    pub url: String,

    /// CSS selector for the aggregate count element
    pub total_count: String,

    /// CSS selector for the per-world count elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worlds_count: Option<String>,

    /// Seconds between poll cycles
    #[serde(default = "defaults::poll_rate")]
    pub poll_rate: u64,

    /// Overrides merged into the generated embed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<EmbedTemplate>,

    /// HTTP client settings for page fetches
    #[serde(default)]
    pub http: HttpConfig,

    /// Discord API settings
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Logging settings for the binary
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        // Used verbatim in API paths, so surrounding whitespace is rejected too
        if self.channel_id.trim().is_empty() {
            return Err(AppError::config("channel_id is empty"));
        }
        if !self.channel_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::config(format!(
                "channel_id must be a numeric id, got '{}'",
                self.channel_id
            )));
        }

        let url = Url::parse(&self.url)
            .map_err(|e| AppError::config(format!("url '{}' is invalid: {e}", self.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::config(format!(
                "url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        check_selector("total_count", &self.total_count)?;
        if let Some(selector) = &self.worlds_count {
            check_selector("worlds_count", selector)?;
        }

        if self.poll_rate == 0 {
            return Err(AppError::config("poll_rate must be > 0"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::config("http.timeout_secs must be > 0"));
        }
        Url::parse(&self.discord.api_base).map_err(|e| {
            AppError::config(format!(
                "discord.api_base '{}' is invalid: {e}",
                self.discord.api_base
            ))
        })?;
        Ok(())
    }

    /// Interval between the end of one cycle and the start of the next.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_rate)
    }
}

fn check_selector(key: &str, selector: &str) -> Result<()> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| AppError::config(format!("{key} selector '{selector}' is invalid: {e:?}")))
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for page requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Discord REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Base URL of the REST API
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Environment variable holding the bot token
    #[serde(default = "defaults::token_env")]
    pub token_env: String,

    /// Inline bot token; takes precedence over `token_env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl DiscordConfig {
    /// Resolve the bot token from the config or the environment.
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = self.token.as_deref().map(str::trim) {
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
        match std::env::var(&self.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(AppError::config(format!(
                "no bot token: set discord.token or the {} environment variable",
                self.token_env
            ))),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            token_env: defaults::token_env(),
            token: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn poll_rate() -> u64 {
        60
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        concat!("member-tracker/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Discord defaults
    pub fn api_base() -> String {
        "https://discord.com/api/v10".into()
    }
    pub fn token_env() -> String {
        "DISCORD_TOKEN".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
