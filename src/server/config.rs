use chrono::{Duration, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to load config from environment: {0}")]
    Env(#[source] envy::Error),
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub listen_addr: String,
    pub api_prefix: String,
    pub log_dir: String,
    pub max_connections: u32,
    pub bcrypt_cost: u32,
    pub cookie_secure: bool,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    access_token_expire_minutes: Option<i64>,
    listen_addr: Option<String>,
    api_prefix: Option<String>,
    log_dir: Option<String>,
    max_connections: Option<u32>,
    bcrypt_cost: Option<u32>,
    cookie_secure: Option<bool>,
}

const DEFAULT_TOKEN_MINUTES: i64 = 30;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
// Range bcrypt accepts for its cost factor.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl PartialServerConfig {
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(PartialServerConfig::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ServerConfig {
    /// Loads the configuration from an optional TOML file and the process
    /// environment (including `.env`). Environment variables win.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let env_config = envy::from_env::<PartialServerConfig>().map_err(ConfigError::Env)?;
        Self::merge(config_path.map(Path::new), env_config)
    }

    /// Same as [`ServerConfig::load`], with the environment given as
    /// key/value pairs instead of read from the process.
    pub fn load_from<I>(config_path: Option<&Path>, env_vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env_config = envy::from_iter::<_, PartialServerConfig>(env_vars).map_err(ConfigError::Env)?;
        Self::merge(config_path, env_config)
    }

    fn merge(config_path: Option<&Path>, env_config: PartialServerConfig) -> Result<Self, ConfigError> {
        // 1. Load from file (optional)
        let file_config = match config_path {
            Some(path) => PartialServerConfig::from_file(path)?,
            None => PartialServerConfig::default(),
        };

        // 2. Merge: environment overrides file
        let final_config = ServerConfig {
            database_url: env_config
                .database_url
                .or(file_config.database_url)
                .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            jwt_secret: env_config
                .jwt_secret
                .or(file_config.jwt_secret)
                .ok_or(ConfigError::Missing("JWT_SECRET"))?,
            access_token_expire_minutes: env_config
                .access_token_expire_minutes
                .or(file_config.access_token_expire_minutes)
                .unwrap_or(DEFAULT_TOKEN_MINUTES),
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            api_prefix: env_config
                .api_prefix
                .or(file_config.api_prefix)
                .unwrap_or_else(default_api_prefix),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            max_connections: env_config
                .max_connections
                .or(file_config.max_connections)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            bcrypt_cost: env_config
                .bcrypt_cost
                .or(file_config.bcrypt_cost)
                .unwrap_or(bcrypt::DEFAULT_COST),
            cookie_secure: env_config
                .cookie_secure
                .or(file_config.cookie_secure)
                .unwrap_or(true),
        };

        final_config.validate()?;
        Ok(final_config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.access_token_expire_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: self.access_token_expire_minutes.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        // Expiry is computed as now + ttl for every token.
        let expiry = Duration::try_minutes(self.access_token_expire_minutes)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        if expiry.is_none() {
            return Err(ConfigError::InvalidValue {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: self.access_token_expire_minutes.to_string(),
                reason: "token expiry would be out of range".to_string(),
            });
        }
        if !BCRYPT_COST_RANGE.contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "BCRYPT_COST",
                value: self.bcrypt_cost.to_string(),
                reason: format!(
                    "must be between {} and {}",
                    BCRYPT_COST_RANGE.start(),
                    BCRYPT_COST_RANGE.end()
                ),
            });
        }
        Ok(())
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::try_minutes(self.access_token_expire_minutes)
            .unwrap_or_else(|| Duration::minutes(DEFAULT_TOKEN_MINUTES))
    }
}
