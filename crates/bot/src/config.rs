//! Configuration management for the Courier bot.
//!
//! This module provides TOML-based configuration file loading and saving.
//! The default configuration path is `~/.config/courier/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use explorer::DEFAULT_ITEMS_PER_PAGE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transfer::DEFAULT_PROGRESS_INTERVAL_MS;

/// Public Telegram Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Default upload limit (2 GiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("telegram.api_id is not set")]
    MissingApiId,

    #[error("telegram.api_hash is not set")]
    MissingApiHash,

    #[error("telegram.bot_token is not set")]
    MissingBotToken,

    #[error("access.allowed_user_id is not set")]
    MissingAllowedUser,

    #[error("telegram.api_url must start with http:// or https://, got {0}")]
    InvalidApiUrl(String),

    #[error("telegram.poll_timeout_secs must be between 1 and 60, got {0}")]
    InvalidPollTimeout(u64),

    #[error("browse.items_per_page must be between 1 and 100, got {0}")]
    InvalidItemsPerPage(usize),

    #[error("transfer.max_file_size must be greater than 0, got {0}")]
    InvalidMaxFileSize(u64),

    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),
}

impl ConfigError {
    /// What the operator should do about this error.
    pub fn guidance(&self) -> &'static str {
        match self {
            ConfigError::MissingApiId | ConfigError::MissingApiHash => {
                "Get your API ID and hash from https://my.telegram.org, then set \
                 telegram.api_id / telegram.api_hash (or COURIER_API_ID / COURIER_API_HASH)."
            }
            ConfigError::MissingBotToken => {
                "Create a bot with @BotFather and set telegram.bot_token (or COURIER_BOT_TOKEN)."
            }
            ConfigError::MissingAllowedUser => {
                "Ask @userinfobot for your numeric user ID and set access.allowed_user_id \
                 (or COURIER_ALLOWED_USER_ID)."
            }
            ConfigError::InvalidApiUrl(_) => {
                "Use https://api.telegram.org or the URL of your local Bot API server."
            }
            ConfigError::InvalidPollTimeout(_)
            | ConfigError::InvalidItemsPerPage(_)
            | ConfigError::InvalidMaxFileSize(_)
            | ConfigError::InvalidLogLevel(_) => "Fix the value in the configuration file.",
        }
    }
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for the Courier bot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// General process configuration.
    pub daemon: DaemonConfig,

    /// Telegram credentials and endpoint.
    pub telegram: TelegramConfig,

    /// Who may use the bot.
    pub access: AccessConfig,

    /// Directory browsing settings.
    pub browse: BrowseConfig,

    /// File sending settings.
    pub transfer: TransferConfig,
}

/// General process configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DaemonConfig {
    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
}

/// Telegram credentials and endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelegramConfig {
    /// Application ID from my.telegram.org (0 = unset).
    ///
    /// Together with `api_hash` this provisions a local Bot API server,
    /// which raises the upload limit from 50 MB to 2 GB.
    pub api_id: i64,

    /// Application hash from my.telegram.org.
    pub api_hash: String,

    /// Bot token from @BotFather.
    pub bot_token: String,

    /// Bot API base URL.
    pub api_url: String,

    /// Long-polling timeout for getUpdates, in seconds.
    pub poll_timeout_secs: u64,
}

/// Who may use the bot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AccessConfig {
    /// The only Telegram user allowed to use the bot (0 = unset).
    pub allowed_user_id: i64,
}

/// Directory browsing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowseConfig {
    /// Directory browsing starts at and returns to.
    pub root_path: PathBuf,

    /// Entries per page.
    pub items_per_page: usize,

    /// List entries whose name starts with '.'.
    pub show_hidden: bool,
}

/// File sending settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransferConfig {
    /// Largest file the bot will send, in bytes (default: 2 GiB).
    pub max_file_size: u64,

    /// Minimum time between progress message edits, in milliseconds.
    pub progress_interval_ms: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_id: 0,
            api_hash: String::new(),
            bot_token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            poll_timeout_secs: 30,
        }
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            show_hidden: false,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
        }
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("courier")
        .join("config.toml")
}

/// Returns the default browsing root.
fn default_root_path() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

/// Read a non-empty environment variable.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Read a non-empty numeric environment variable, warning on garbage.
fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env_value(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}: not a number: {}", name, raw);
            None
        }
    }
}

impl Config {
    /// Apply environment variable overrides to the configuration.
    ///
    /// Environment variables take precedence over config file values.
    /// Supported variables:
    /// - COURIER_API_ID, COURIER_API_HASH, COURIER_BOT_TOKEN: Telegram credentials
    /// - COURIER_ALLOWED_USER_ID: The allowed user
    /// - COURIER_ROOT_PATH: Browsing root
    /// - COURIER_LOG_LEVEL: Override log level (trace, debug, info, warn, error)
    ///
    /// Returns the names of the variables that were applied. Logging is not
    /// set up yet when this runs, so the caller reports them.
    pub fn apply_env_overrides(&mut self) -> Vec<&'static str> {
        let mut applied = Vec::new();

        if let Some(api_id) = env_number("COURIER_API_ID") {
            self.telegram.api_id = api_id;
            applied.push("COURIER_API_ID");
        }

        if let Some(api_hash) = env_value("COURIER_API_HASH") {
            self.telegram.api_hash = api_hash;
            applied.push("COURIER_API_HASH");
        }

        if let Some(token) = env_value("COURIER_BOT_TOKEN") {
            self.telegram.bot_token = token;
            applied.push("COURIER_BOT_TOKEN");
        }

        if let Some(user_id) = env_number("COURIER_ALLOWED_USER_ID") {
            self.access.allowed_user_id = user_id;
            applied.push("COURIER_ALLOWED_USER_ID");
        }

        if let Some(root) = env_value("COURIER_ROOT_PATH") {
            self.browse.root_path = PathBuf::from(root);
            applied.push("COURIER_ROOT_PATH");
        }

        if let Some(level) = env_value("COURIER_LOG_LEVEL") {
            self.daemon.log_level = level;
            applied.push("COURIER_LOG_LEVEL");
        }

        applied
    }

    /// Validate the configuration values.
    ///
    /// Unset credentials are errors. A missing root directory is not; it is
    /// reported as a warning at startup since it may be mounted later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.api_id <= 0 {
            return Err(ConfigError::MissingApiId);
        }

        if self.telegram.api_hash.trim().is_empty() {
            return Err(ConfigError::MissingApiHash);
        }

        if self.telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::MissingBotToken);
        }

        if self.access.allowed_user_id == 0 {
            return Err(ConfigError::MissingAllowedUser);
        }

        let url = &self.telegram.api_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidApiUrl(url.clone()));
        }

        if !(1..=60).contains(&self.telegram.poll_timeout_secs) {
            return Err(ConfigError::InvalidPollTimeout(
                self.telegram.poll_timeout_secs,
            ));
        }

        if !(1..=100).contains(&self.browse.items_per_page) {
            return Err(ConfigError::InvalidItemsPerPage(self.browse.items_per_page));
        }

        if self.transfer.max_file_size == 0 {
            return Err(ConfigError::InvalidMaxFileSize(self.transfer.max_file_size));
        }

        let level = self.daemon.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.daemon.log_level.clone()));
        }

        Ok(())
    }

    /// Load configuration from a file.
    ///
    /// If the file does not exist, returns the default configuration.
    /// If the file exists but is invalid TOML, returns an error with
    /// a helpful message.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", format_toml_error(&e)))
    }

    /// Save configuration to a file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}

/// Format a TOML deserialization error for user-friendly display.
fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const ENV_VARS: &[&str] = &[
        "COURIER_API_ID",
        "COURIER_API_HASH",
        "COURIER_BOT_TOKEN",
        "COURIER_ALLOWED_USER_ID",
        "COURIER_ROOT_PATH",
        "COURIER_LOG_LEVEL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    /// A configuration that passes validation.
    fn valid_config() -> Config {
        let mut config = Config::default();
        config.telegram.api_id = 12345678;
        config.telegram.api_hash = "0123456789abcdef".to_string();
        config.telegram.bot_token = "123456:ABC-DEF".to_string();
        config.access.allowed_user_id = 123456789;
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.daemon.log_level, "info");
        assert_eq!(config.telegram.api_url, DEFAULT_API_URL);
        assert_eq!(config.telegram.poll_timeout_secs, 30);
        assert_eq!(config.browse.items_per_page, 12);
        assert!(!config.browse.show_hidden);
        assert_eq!(config.transfer.max_file_size, 2 * 1024 * 1024 * 1024);
        assert_eq!(config.access.allowed_user_id, 0);
    }

    #[test]
    fn test_from_toml_empty() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_toml_partial() {
        let toml = r#"
[telegram]
bot_token = "42:xyz"

[browse]
items_per_page = 5
"#;
        let config = Config::from_toml(toml).unwrap();

        assert_eq!(config.telegram.bot_token, "42:xyz");
        assert_eq!(config.browse.items_per_page, 5);
        assert_eq!(config.telegram.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_from_toml_full() {
        let toml = r#"
[daemon]
log_level = "debug"

[telegram]
api_id = 12345678
api_hash = "abcdef"
bot_token = "1234567890:ABCdef"
api_url = "http://localhost:8081"
poll_timeout_secs = 10

[access]
allowed_user_id = 123456789

[browse]
root_path = "/sdcard"
items_per_page = 20
show_hidden = true

[transfer]
max_file_size = 52428800
progress_interval_ms = 500
"#;
        let config = Config::from_toml(toml).unwrap();

        assert_eq!(config.daemon.log_level, "debug");
        assert_eq!(config.telegram.api_id, 12345678);
        assert_eq!(config.telegram.api_hash, "abcdef");
        assert_eq!(config.telegram.api_url, "http://localhost:8081");
        assert_eq!(config.telegram.poll_timeout_secs, 10);
        assert_eq!(config.access.allowed_user_id, 123456789);
        assert_eq!(config.browse.root_path, PathBuf::from("/sdcard"));
        assert_eq!(config.browse.items_per_page, 20);
        assert!(config.browse.show_hidden);
        assert_eq!(config.transfer.max_file_size, 52428800);
        assert_eq!(config.transfer.progress_interval_ms, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_invalid_syntax() {
        let result = Config::from_toml("[telegram\nbot_token = \"x\"");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_from_toml_wrong_type() {
        let toml = r#"
[access]
allowed_user_id = "me"
"#;
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn test_roundtrip_custom() {
        let mut original = valid_config();
        original.browse.items_per_page = 7;
        original.browse.root_path = PathBuf::from("/srv/files");

        let toml = original.to_toml().unwrap();
        let loaded = Config::from_toml(&toml).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn test_load_missing_file() {
        let config = Config::load("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let original = valid_config();
        original.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "invalid [ toml").unwrap();

        let err = Config::load(&config_path).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.to_string_lossy().contains("courier"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_validate_default_config_missing_credentials() {
        assert_eq!(Config::default().validate(), Err(ConfigError::MissingApiId));
    }

    #[test]
    fn test_validate_each_missing_credential() {
        let mut config = valid_config();
        config.telegram.api_hash = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::MissingApiHash));

        let mut config = valid_config();
        config.telegram.bot_token.clear();
        assert_eq!(config.validate(), Err(ConfigError::MissingBotToken));

        let mut config = valid_config();
        config.access.allowed_user_id = 0;
        assert_eq!(config.validate(), Err(ConfigError::MissingAllowedUser));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_ranges() {
        let mut config = valid_config();
        config.browse.items_per_page = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidItemsPerPage(0)));

        let mut config = valid_config();
        config.browse.items_per_page = 101;
        assert_eq!(config.validate(), Err(ConfigError::InvalidItemsPerPage(101)));

        let mut config = valid_config();
        config.transfer.max_file_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidMaxFileSize(0)));

        let mut config = valid_config();
        config.telegram.poll_timeout_secs = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPollTimeout(0)));
    }

    #[test]
    fn test_validate_api_url() {
        let mut config = valid_config();
        config.telegram.api_url = "ws://example.com".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidApiUrl("ws://example.com".to_string()))
        );
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = valid_config();
        config.daemon.log_level = "WARN".to_string();
        assert!(config.validate().is_ok());

        config.daemon.log_level = "verbose".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel("verbose".to_string()))
        );
    }

    #[test]
    fn test_missing_root_is_not_a_validation_error() {
        let mut config = valid_config();
        config.browse.root_path = PathBuf::from("/definitely/not/here");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_guidance_is_actionable() {
        assert!(ConfigError::MissingBotToken.guidance().contains("@BotFather"));
        assert!(ConfigError::MissingAllowedUser.guidance().contains("@userinfobot"));
        assert!(ConfigError::MissingApiId.guidance().contains("my.telegram.org"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("COURIER_API_ID", "777");
        std::env::set_var("COURIER_API_HASH", "hash");
        std::env::set_var("COURIER_BOT_TOKEN", "1:token");
        std::env::set_var("COURIER_ALLOWED_USER_ID", "42");
        std::env::set_var("COURIER_ROOT_PATH", "/mnt/data");
        std::env::set_var("COURIER_LOG_LEVEL", "debug");

        let mut config = Config::default();
        let applied = config.apply_env_overrides();

        assert_eq!(applied, ENV_VARS.to_vec());
        assert_eq!(config.telegram.api_id, 777);
        assert_eq!(config.telegram.api_hash, "hash");
        assert_eq!(config.telegram.bot_token, "1:token");
        assert_eq!(config.access.allowed_user_id, 42);
        assert_eq!(config.browse.root_path, PathBuf::from("/mnt/data"));
        assert_eq!(config.daemon.log_level, "debug");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_override_empty_does_not_override() {
        clear_env();
        std::env::set_var("COURIER_BOT_TOKEN", "");

        let mut config = valid_config();
        assert!(config.apply_env_overrides().is_empty());
        assert_eq!(config.telegram.bot_token, "123456:ABC-DEF");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_override_bad_number_ignored() {
        clear_env();
        std::env::set_var("COURIER_ALLOWED_USER_ID", "not-a-number");

        let mut config = valid_config();
        config.apply_env_overrides();
        assert_eq!(config.access.allowed_user_id, 123456789);

        clear_env();
    }
}
