//! Configuration command handlers
//!
//! Getting, updating, resetting, and importing/exporting settings. Endpoint
//! and sheet addresses are resolved when the state is built, so changes to
//! them take effect on the next start.

use std::path::Path;
use tracing::{error, info};

use crate::core::{
    models::{AppError, AppResult},
    AppConfig,
};
use crate::AppState;

/// Get current application configuration
pub async fn get_config(state: &AppState) -> Result<AppConfig, String> {
    info!("⚙️ Getting application configuration");

    let config = state.config.read().await;
    Ok(config.clone())
}

/// Update application configuration
pub async fn update_config(state: &AppState, new_config: AppConfig) -> Result<(), String> {
    info!("🔧 Updating application configuration");

    match update_config_impl(state, new_config).await {
        Ok(()) => {
            info!("✅ Configuration updated successfully");
            Ok(())
        }
        Err(e) => {
            error!("❌ Failed to update configuration: {}", e);
            Err(e.to_string())
        }
    }
}

/// Reset configuration to default values
pub async fn reset_config(state: &AppState) -> Result<AppConfig, String> {
    info!("🔄 Resetting configuration to defaults");

    match update_config_impl(state, AppConfig::default()).await {
        Ok(()) => {
            info!("✅ Configuration reset successfully");
            Ok(AppConfig::default())
        }
        Err(e) => {
            error!("❌ Failed to reset configuration: {}", e);
            Err(e.to_string())
        }
    }
}

/// Export configuration to file
pub async fn export_config(state: &AppState, file_path: String) -> Result<(), String> {
    info!("💾 Exporting configuration to: {}", file_path);

    match export_config_impl(state, &file_path).await {
        Ok(()) => {
            info!("✅ Configuration exported successfully");
            Ok(())
        }
        Err(e) => {
            error!("❌ Failed to export configuration: {}", e);
            Err(e.to_string())
        }
    }
}

/// Import configuration from file
pub async fn import_config(state: &AppState, file_path: String) -> Result<AppConfig, String> {
    info!("📂 Importing configuration from: {}", file_path);

    match import_config_impl(state, &file_path).await {
        Ok(config) => {
            info!("✅ Configuration imported successfully");
            Ok(config)
        }
        Err(e) => {
            error!("❌ Failed to import configuration: {}", e);
            Err(e.to_string())
        }
    }
}

// Implementation functions

async fn update_config_impl(state: &AppState, new_config: AppConfig) -> AppResult<()> {
    new_config
        .validate()
        .map_err(|e| AppError::Config(format!("Invalid configuration: {}", e)))?;

    {
        let mut config = state.config.write().await;
        *config = new_config.clone();
    }

    new_config
        .save_to(&state.config_path)
        .map_err(|e| AppError::Config(format!("Failed to save configuration: {}", e)))?;

    Ok(())
}

async fn export_config_impl(state: &AppState, file_path: &str) -> AppResult<()> {
    let json_data = state
        .config
        .read()
        .await
        .export()
        .map_err(|e| AppError::Config(format!("Failed to serialize configuration: {}", e)))?;

    tokio::fs::write(file_path, json_data).await?;
    Ok(())
}

async fn import_config_impl(state: &AppState, file_path: &str) -> AppResult<AppConfig> {
    if !Path::new(file_path).exists() {
        return Err(AppError::Config(format!(
            "Configuration file not found: {}",
            file_path
        )));
    }

    let content = tokio::fs::read_to_string(file_path).await?;
    let imported_config = AppConfig::import(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse configuration: {}", e)))?;

    update_config_impl(state, imported_config.clone()).await?;
    Ok(imported_config)
}
