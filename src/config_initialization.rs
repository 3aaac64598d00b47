//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::adapters::TomlConfigAdapter;
use crate::cli::Cli;
use crate::config::EditorConfig;
use crate::ports::ConfigPort;

/// Files searched when no `--config` is given, in order
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["scrubcut.toml", "config/scrubcut.toml"];

/// Build the effective configuration following precedence: CLI > Env > File > Defaults
pub async fn initialize_configuration_hierarchy(cli: &Cli) -> Result<EditorConfig> {
    // Step 1: defaults, then the first config file found
    let mut config = match locate_config_file(cli.config.as_deref())? {
        Some(path) => load_config_file(&path).await?,
        None => {
            debug!("No configuration file found, using defaults");
            EditorConfig::default()
        }
    };

    // Step 2: environment overrides
    let env_overrides = apply_environment_overrides(&mut config, |key| std::env::var(key).ok());
    if env_overrides > 0 {
        debug!("Applied {} environment variable overrides", env_overrides);
    }

    // Step 3: CLI overrides
    let cli_overrides = apply_cli_overrides(&mut config, cli);
    if cli_overrides > 0 {
        debug!("Applied {} CLI configuration overrides", cli_overrides);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// An explicit path must exist; otherwise the first default path that does
fn locate_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(anyhow::anyhow!("Configuration file does not exist: {}", path.display()));
        }
        return Ok(Some(path.to_path_buf()));
    }
    Ok(DEFAULT_CONFIG_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists()))
}

async fn load_config_file(path: &Path) -> Result<EditorConfig> {
    info!(path = %path.display(), "Loading configuration");
    let adapter = TomlConfigAdapter::new();
    adapter
        .load_config(&path.to_string_lossy())
        .await
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    Ok(adapter.config().await?)
}

/// Apply `SCRUBCUT_*` variables read through `lookup`; returns how many were applied
pub fn apply_environment_overrides(config: &mut EditorConfig, lookup: impl Fn(&str) -> Option<String>) -> usize {
    let mut applied = 0;
    let mut set = |key: &str, apply: &mut dyn FnMut(String)| {
        if let Some(value) = lookup(key).filter(|value| !value.trim().is_empty()) {
            debug!("Found environment override: {} = {}", key, value);
            apply(value);
            applied += 1;
        }
    };

    set("SCRUBCUT_FFMPEG", &mut |value| config.encoder.ffmpeg_path = value);
    set("SCRUBCUT_FFPROBE", &mut |value| config.encoder.ffprobe_path = value);
    set("SCRUBCUT_SCOPE_DIR", &mut |value| config.storage.scope_dir = PathBuf::from(value));
    set("SCRUBCUT_EXPORT_DIR", &mut |value| config.storage.export_dir = PathBuf::from(value));
    set("SCRUBCUT_LOG_LEVEL", &mut |value| config.logging.level = value);
    applied
}

/// Apply global CLI flags; returns how many were applied
pub fn apply_cli_overrides(config: &mut EditorConfig, cli: &Cli) -> usize {
    let mut applied = 0;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
        applied += 1;
    }
    if cli.json_logs {
        config.logging.json = true;
        applied += 1;
    }
    if let Some(scope_dir) = &cli.scope_dir {
        config.storage.scope_dir = scope_dir.clone();
        applied += 1;
    }
    if let Some(export_dir) = &cli.export_dir {
        config.storage.export_dir = export_dir.clone();
        applied += 1;
    }
    applied
}
