pub mod collect;
pub mod config;
pub mod parse;
pub mod progress;

use clap::ValueEnum;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use review_collector_config::{Config, ExportFormat, PathManager};
use std::path::{Path, PathBuf};

/// File format for saved reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SaveFormat {
    Json,
    Csv,
}

impl From<SaveFormat> for ExportFormat {
    fn from(format: SaveFormat) -> Self {
        match format {
            SaveFormat::Json => ExportFormat::Json,
            SaveFormat::Csv => ExportFormat::Csv,
        }
    }
}

/// Load the config file (or defaults when it does not exist) and validate it
pub fn load_config(config_override: Option<&Path>) -> Result<(Config, PathManager)> {
    let path_manager = PathManager::default();
    let config_file = config_override
        .map(PathBuf::from)
        .unwrap_or_else(|| path_manager.config_file());

    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {:#}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;

    tracing::debug!(config_file = %config_file.display(), "Configuration loaded");
    Ok((config, path_manager))
}

/// Explicit flag first, then the file extension, then the configured default
pub fn resolve_format(flag: Option<ExportFormat>, path: &Path, configured: ExportFormat) -> ExportFormat {
    if let Some(format) = flag {
        return format;
    }
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
        Some(ext) if ext == "csv" => ExportFormat::Csv,
        Some(ext) if ext == "json" => ExportFormat::Json,
        _ => configured,
    }
}
