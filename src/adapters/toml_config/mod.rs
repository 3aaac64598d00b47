// TOML config adapter - Configuration management using TOML files

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::config::EditorConfig;
use crate::domain::errors::*;
use crate::error::ScrubcutResult;
use crate::ports::*;

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    config: Arc<RwLock<EditorConfig>>,
    config_file_path: Arc<RwLock<Option<PathBuf>>>,
}

fn poisoned<T>(_: T) -> DomainError {
    DomainError::InvalidState("configuration lock poisoned".to_string())
}

impl TomlConfigAdapter {
    /// Create an adapter holding the default configuration
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            config_file_path: Arc::new(RwLock::new(None)),
        }
    }

    /// Path of the last file loaded or saved
    pub fn config_file_path(&self) -> Option<PathBuf> {
        self.config_file_path.read().ok().and_then(|path| path.clone())
    }

    /// Serialize config to TOML string
    pub fn serialize_config(config: &EditorConfig) -> ScrubcutResult<String> {
        Ok(toml::to_string_pretty(config)?)
    }

    /// Deserialize config from TOML string
    pub fn deserialize_config(toml_content: &str) -> ScrubcutResult<EditorConfig> {
        Ok(toml::from_str(toml_content)?)
    }
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigPort for TomlConfigAdapter {
    async fn config(&self) -> Result<EditorConfig, DomainError> {
        Ok(self.config.read().map_err(poisoned)?.clone())
    }

    async fn load_config(&self, file_path: &str) -> Result<(), DomainError> {
        let path = PathBuf::from(file_path);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to read config file {}: {}", file_path, e)))?;

        let loaded = Self::deserialize_config(&content)?;
        *self.config.write().map_err(poisoned)? = loaded;
        *self.config_file_path.write().map_err(poisoned)? = Some(path);
        tracing::info!(path = %file_path, "Loaded configuration");
        Ok(())
    }

    async fn save_config(&self, file_path: &str) -> Result<(), DomainError> {
        let path = PathBuf::from(file_path);

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::FsFail(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = Self::serialize_config(&self.config().await?)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to write config file: {}", e)))?;

        *self.config_file_path.write().map_err(poisoned)? = Some(path);
        Ok(())
    }

    async fn set_config(&self, config: EditorConfig) -> Result<(), DomainError> {
        *self.config.write().map_err(poisoned)? = config;
        Ok(())
    }

    async fn validate_config(&self) -> Result<(), DomainError> {
        self.config.read().map_err(poisoned)?.validate()
    }
}
