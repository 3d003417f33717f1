//! Daily Log Sync - Core Library
//!
//! This library keeps a personal task log that lives in a spreadsheet: it
//! reads the sheet's CSV export into header-keyed records, tracks them as a
//! task log, sends row mutations to the sheet's web endpoint, and builds the
//! pending-task reminder digest.

pub mod commands;
pub mod core;
pub mod parsers;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    config::AppConfig,
    models::{AppError, AppResult, MutationOutcome, Record},
    mutation_client::MutationClient,
    reminder::{build_digest, ReminderDigest},
    sheet_source::SheetSource,
    task_log::{TaskLog, ViewFilter},
    transport::{ReqwestTransport, SheetTransport},
};

pub use parsers::csv_parser::{parse_csv, parse_csv_text};

use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared between command handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<tokio::sync::RwLock<AppConfig>>,
    /// Where configuration changes are saved
    pub config_path: PathBuf,
    pub source: Arc<SheetSource>,
    pub mutations: Arc<MutationClient>,
    pub task_log: Arc<tokio::sync::RwLock<TaskLog>>,
    /// Why the saved configuration was replaced by defaults, if it was.
    /// Startup runs before logging is installed, so the caller reports it.
    pub config_fallback: Option<String>,
}

impl AppState {
    /// Build the state from the saved configuration and the process
    /// environment. The environment is read here and nowhere else.
    pub fn new() -> anyhow::Result<Self> {
        let config_path = AppConfig::get_config_path()?;
        let (mut config, config_fallback) = Self::load_or_initialize_config(&config_path);
        config.apply_env_overrides(std::env::vars());

        let transport = ReqwestTransport::new(&config.endpoint)
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            config_fallback,
            ..Self::with_config(config, config_path, Arc::new(transport))
        })
    }

    /// Build the state around an explicit configuration and transport
    pub fn with_config(
        config: AppConfig,
        config_path: PathBuf,
        transport: Arc<dyn SheetTransport>,
    ) -> Self {
        let source = SheetSource::new(&config.sheet, transport.clone());
        let mutations = MutationClient::new(config.endpoint.clone(), transport);

        Self {
            config: Arc::new(tokio::sync::RwLock::new(config)),
            config_path,
            source: Arc::new(source),
            mutations: Arc::new(mutations),
            task_log: Arc::new(tokio::sync::RwLock::new(TaskLog::default())),
            config_fallback: None,
        }
    }

    fn load_or_initialize_config(config_path: &std::path::Path) -> (AppConfig, Option<String>) {
        match AppConfig::load_from(config_path) {
            Ok(cfg) => match cfg.validate() {
                Ok(()) => (cfg, None),
                Err(err) => (
                    AppConfig::default(),
                    Some(format!(
                        "Invalid configuration detected ({}), falling back to defaults",
                        err
                    )),
                ),
            },
            Err(err) => (
                AppConfig::default(),
                Some(format!(
                    "Failed to load configuration from disk: {}. Using defaults",
                    err
                )),
            ),
        }
    }

    /// Log the config fallback, once a subscriber is installed
    pub fn report_config_fallback(&self) {
        if let Some(reason) = &self.config_fallback {
            tracing::warn!("{}", reason);
        }
    }
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize the library with default settings
pub fn init() -> anyhow::Result<()> {
    utils::logging::init_tracing(None);

    tracing::info!("📚 {} v{} initialized", NAME, VERSION);
    Ok(())
}
