// common/src/config.rs
use config::{Config as ConfigFile, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

const DEFAULT_SESSION_SECRET: &str = "secretkey";

/// Central configuration for the gateway
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_addr: String,
    /// Base URL of the upstream REST API, endpoint paths are appended verbatim
    pub api_base_url: String,
    /// Shared secret the upstream API signs access tokens with
    pub jwt_secret: String,
    /// Secret used to sign the session cookie
    pub session_secret: String,
    /// "development" or "production"
    pub environment: String,
    /// Mounts /session-data and /cookie-data. Never enable in production.
    pub expose_debug_endpoints: bool,

    pub session: SessionConfig,
    pub access_token: AccessTokenConfig,
    pub uploads: UploadConfig,
    pub static_files: StaticFilesConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_seconds: i64,
    pub cleanup_interval_seconds: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessTokenConfig {
    pub cookie_name: String,
    pub max_age_seconds: i64,
    pub leeway_seconds: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub dir: String,
    pub max_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_attempts: usize,
    pub window_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:3009".to_string(),
            api_base_url: "http://127.0.0.1:3000/api".to_string(),
            jwt_secret: String::new(),
            session_secret: DEFAULT_SESSION_SECRET.to_string(),
            environment: "development".to_string(),
            expose_debug_endpoints: false,
            session: SessionConfig::default(),
            access_token: AccessTokenConfig::default(),
            uploads: UploadConfig::default(),
            static_files: StaticFilesConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "agent_gateway.sid".to_string(),
            ttl_seconds: 86400, // 24 hours
            cleanup_interval_seconds: 3600,
        }
    }
}

impl Default for AccessTokenConfig {
    fn default() -> Self {
        Self {
            cookie_name: "accessToken".to_string(),
            max_age_seconds: 900, // 15 minutes
            leeway_seconds: 5,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
            max_bytes: 5 * 1024 * 1024,
            allowed_extensions: vec!["xlsx".into(), "xls".into(), "csv".into()],
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            path: "./public".to_string(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            window_seconds: 60,
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        ConfigFile::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // e.g. APP_SESSION__TTL_SECONDS=3600
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Load from files and environment, then apply the plain deployment variables
    pub fn from_env() -> Self {
        let mut config = match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to defaults and environment variables only");
                Self::default()
            }
        };

        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    /// PORT, API_BASE_URL, JWT_SECRET, SESSION_SECRET, APP_ENV / NODE_ENV
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server_addr = format!("0.0.0.0:{}", port);
        }
        if let Some(url) = lookup("API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(secret) = lookup("SESSION_SECRET") {
            self.session_secret = secret;
        }
        if let Some(environment) = lookup("APP_ENV").or_else(|| lookup("NODE_ENV")) {
            self.environment = environment;
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Refuse to run production with missing or default secrets
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Message("api_base_url must be set".into()));
        }
        if self.is_production() {
            if self.jwt_secret.is_empty() {
                return Err(ConfigError::Message("JWT_SECRET must be set in production".into()));
            }
            if self.session_secret == DEFAULT_SESSION_SECRET {
                return Err(ConfigError::Message(
                    "SESSION_SECRET must be changed from the default in production".into(),
                ));
            }
        }
        Ok(())
    }
}
