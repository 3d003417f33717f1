//! Application configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::utils::validation::validate_url;

/// Env var that overrides `endpoint.apps_script_url`
pub const ENV_APPS_SCRIPT_URL: &str = "DAILY_LOG_APPS_SCRIPT_URL";

/// Env var that overrides `sheet.csv_url`
pub const ENV_SHEET_CSV_URL: &str = "DAILY_LOG_SHEET_CSV_URL";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Main application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub sheet: SheetConfig,
    pub endpoint: EndpointConfig,
    pub reminder: ReminderConfig,
    pub advanced: AdvancedConfig,
}

/// Where the CSV export is read from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SheetConfig {
    /// Full CSV export URL of the tab; empty means no remote source
    pub csv_url: String,
    /// Tab id, informational
    pub sheet_gid: Option<String>,
}

/// Row-mutation endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
    /// Empty string puts the mutation client in mock mode
    pub apps_script_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

/// Column names and recipient for the pending-task digest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderConfig {
    pub recipient_email: Option<String>,
    pub status_column: String,
    pub description_column: String,
    pub date_column: String,
    pub timing_column: String,
}

/// Advanced configuration options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvancedConfig {
    pub enable_logging: bool,
    pub log_level: String, // "error", "warn", "info", "debug", "trace"
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheet: SheetConfig::default(),
            endpoint: EndpointConfig::default(),
            reminder: ReminderConfig::default(),
            advanced: AdvancedConfig::default(),
        }
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            csv_url: String::new(),
            sheet_gid: None,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            apps_script_url: String::new(),
            timeout_seconds: 30,
            user_agent: format!("DailyLogSync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            recipient_email: None,
            status_column: "Status".to_string(),
            description_column: "Description".to_string(),
            date_column: "Date".to_string(),
            timing_column: "Timing".to_string(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
            log_level: "info".to_string(),
        }
    }
}

impl EndpointConfig {
    /// No endpoint configured: mutations are acknowledged locally only
    pub fn is_mock(&self) -> bool {
        self.apps_script_url.trim().is_empty()
    }
}

impl AppConfig {
    /// Load configuration from `config_path`, writing defaults there if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            let config: AppConfig =
                serde_json::from_str(&content).with_context(|| "Failed to parse config file")?;

            tracing::info!("Loaded configuration from: {:?}", config_path);
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Save configuration to `config_path`
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        tracing::info!("Saved configuration to: {:?}", config_path);
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "dailylog", "sync")
            .with_context(|| "Failed to get project directories")?;

        let config_dir = project_dirs.config_dir();
        Ok(config_dir.join("config.json"))
    }

    /// Export configuration as JSON string
    pub fn export(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "Failed to export configuration")
    }

    /// Parse and validate configuration from a JSON string
    pub fn import(json: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(json).with_context(|| "Failed to parse imported configuration")?;

        config
            .validate()
            .with_context(|| "Imported configuration is invalid")?;

        tracing::info!("Imported and validated configuration from JSON");
        Ok(config)
    }

    /// Merge with another configuration, keeping non-empty values from other
    pub fn merge(&mut self, other: &AppConfig) {
        if !other.sheet.csv_url.is_empty() {
            self.sheet.csv_url = other.sheet.csv_url.clone();
        }
        if other.sheet.sheet_gid.is_some() {
            self.sheet.sheet_gid = other.sheet.sheet_gid.clone();
        }

        if !other.endpoint.apps_script_url.is_empty() {
            self.endpoint.apps_script_url = other.endpoint.apps_script_url.clone();
        }
        if other.endpoint.timeout_seconds != 0 {
            self.endpoint.timeout_seconds = other.endpoint.timeout_seconds;
        }
        if !other.endpoint.user_agent.is_empty() {
            self.endpoint.user_agent = other.endpoint.user_agent.clone();
        }

        if other.reminder.recipient_email.is_some() {
            self.reminder.recipient_email = other.reminder.recipient_email.clone();
        }
        for (mine, theirs) in [
            (&mut self.reminder.status_column, &other.reminder.status_column),
            (&mut self.reminder.description_column, &other.reminder.description_column),
            (&mut self.reminder.date_column, &other.reminder.date_column),
            (&mut self.reminder.timing_column, &other.reminder.timing_column),
        ] {
            if !theirs.is_empty() {
                *mine = theirs.clone();
            }
        }

        self.advanced.enable_logging = other.advanced.enable_logging;
        if !other.advanced.log_level.is_empty() {
            self.advanced.log_level = other.advanced.log_level.clone();
        }
    }

    /// Apply environment overrides from `vars`.
    ///
    /// Called once at startup with `std::env::vars()`; tests pass their own map.
    pub fn apply_env_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                ENV_APPS_SCRIPT_URL => {
                    tracing::debug!("Endpoint URL taken from {}", ENV_APPS_SCRIPT_URL);
                    self.endpoint.apps_script_url = value.trim().to_string();
                }
                ENV_SHEET_CSV_URL => {
                    tracing::debug!("Sheet URL taken from {}", ENV_SHEET_CSV_URL);
                    self.sheet.csv_url = value.trim().to_string();
                }
                _ => {}
            }
        }
    }

    /// Get configuration as environment variables (for debugging)
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env_vars = HashMap::new();
        env_vars.insert(ENV_SHEET_CSV_URL.to_string(), self.sheet.csv_url.clone());
        env_vars.insert(
            ENV_APPS_SCRIPT_URL.to_string(),
            self.endpoint.apps_script_url.clone(),
        );
        env_vars.insert(
            "ENDPOINT_TIMEOUT".to_string(),
            self.endpoint.timeout_seconds.to_string(),
        );
        env_vars.insert(
            "ADVANCED_LOG_LEVEL".to_string(),
            self.advanced.log_level.clone(),
        );
        env_vars
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.sheet.csv_url.is_empty() {
            validate_url(&self.sheet.csv_url).with_context(|| "Invalid sheet CSV URL")?;
        }

        if !self.endpoint.is_mock() {
            validate_url(&self.endpoint.apps_script_url)
                .with_context(|| "Invalid mutation endpoint URL")?;
        }

        if self.endpoint.timeout_seconds == 0 || self.endpoint.timeout_seconds > 300 {
            anyhow::bail!("Timeout should be between 1 and 300 seconds");
        }

        if self.reminder.status_column.trim().is_empty()
            || self.reminder.description_column.trim().is_empty()
        {
            anyhow::bail!("Reminder status and description columns must be named");
        }

        if let Some(ref email) = self.reminder.recipient_email {
            if !email.contains('@') {
                anyhow::bail!("Invalid reminder recipient: {}", email);
            }
        }

        if !LOG_LEVELS.contains(&self.advanced.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log level: must be 'error', 'warn', 'info', 'debug', or 'trace'"
            );
        }

        Ok(())
    }
}
