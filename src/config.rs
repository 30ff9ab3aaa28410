//! Process configuration, loaded from environment variables (and `.env`).

use std::env;
use std::time::Duration;

use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discord: DiscordConfig,
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub signup: SignupSettings,
}

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl WebConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Knobs for the signup features themselves.
#[derive(Debug, Clone)]
pub struct SignupSettings {
    /// How long a reaction snapshot may be reused. Zero disables the cache.
    pub reaction_cache_ttl: Duration,
    /// Zone the `/gvg` date builder interprets its dates and times in.
    pub timezone: Tz,
    /// Reaction put on new signup posts when no tracked reactions are configured.
    pub default_signup_reaction: String,
}

fn default_database_url() -> String {
    "sqlite://gvg_signup.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_signup_reaction() -> String {
    "❤️".to_string()
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // .env is optional
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingVar("DISCORD_TOKEN"))?;

        let timezone = match lookup("GVG_TIMEZONE") {
            Some(raw) => raw
                .trim()
                .parse::<Tz>()
                .map_err(|e| ConfigError::InvalidValue("GVG_TIMEZONE", e.to_string()))?,
            None => Tz::UTC,
        };

        let enabled = match lookup("WEB_ENABLED") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue("WEB_ENABLED", raw))?,
            None => true,
        };

        let port = match lookup("WEB_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("WEB_PORT", raw))?,
            None => default_port(),
        };

        Ok(Self {
            discord: DiscordConfig { token },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").unwrap_or_else(default_database_url),
                max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_max_connections),
            },
            web: WebConfig {
                enabled,
                host: lookup("WEB_HOST").unwrap_or_else(default_host),
                port,
            },
            signup: SignupSettings {
                reaction_cache_ttl: Duration::from_secs(
                    lookup("REACTION_CACHE_TTL_SECS")
                        .and_then(|s| s.parse().ok())
                        .unwrap_or_else(default_cache_ttl_secs),
                ),
                timezone,
                default_signup_reaction: lookup("SIGNUP_REACTION")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(default_signup_reaction),
            },
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
