use crate::output::{Output, OutputFormat};
use clap::Subcommand;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use review_collector_config::{Config, PathManager};
use std::path::{Path, PathBuf};

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration (file values merged over defaults)
    Show,

    /// Write a config file populated with the defaults
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Print the config file location
    Path,
}

pub fn run_config(cmd: ConfigCommands, config_path: Option<&Path>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = config_path
        .map(PathBuf::from)
        .unwrap_or_else(|| path_manager.config_file());

    match cmd {
        ConfigCommands::Show => show_config(&config_file, output),
        ConfigCommands::Init { force } => init_config(&config_file, &path_manager, force, output),
        ConfigCommands::Path => {
            output.info(config_file.display().to_string());
            Ok(())
        }
    }
}

fn show_config(config_file: &Path, output: &Output) -> Result<()> {
    let exists = config_file.exists();
    let config = Config::load_or_default(config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {:#}", config_file.display(), e))?;

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if !exists {
                output.warn(format!(
                    "Configuration file not found at: {} (showing defaults, run 'review-collector config init' to create it)",
                    config_file.display()
                ));
            }

            println!("\n{}", "Configuration".bright_cyan().bold());

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Setting").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").add_attribute(comfy_table::Attribute::Bold),
            ]);
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            table.add_row(vec![Cell::new("config file"), Cell::new(config_file.display().to_string())]);
            for (key, value) in settings_rows(&config)? {
                table.add_row(vec![Cell::new(key), Cell::new(value)]);
            }
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let value = serde_json::to_value(&config)?;
            output.json(&serde_json::json!({
                "config_file": config_file.display().to_string(),
                "exists": exists,
                "config": value,
            }));
        }
    }
    Ok(())
}

fn init_config(config_file: &Path, path_manager: &PathManager, force: bool, output: &Output) -> Result<()> {
    if config_file.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_file.display()
        ));
        return Ok(());
    }

    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create application directories: {}", e))?;
    Config::default()
        .save_to_file(config_file)
        .map_err(|e| eyre!("{:#}", e))?;

    output.success(format!("Configuration written to {}", config_file.display()));
    Ok(())
}

/// Flatten the config into `section.key` / value pairs, unset options omitted
pub fn settings_rows(config: &Config) -> Result<Vec<(String, String)>> {
    let value = toml::Value::try_from(config)?;
    let mut rows = Vec::new();

    if let toml::Value::Table(sections) = value {
        for (section, entries) in sections {
            match entries {
                toml::Value::Table(entries) => {
                    for (key, value) in entries {
                        let rendered = match value {
                            toml::Value::String(s) => s,
                            other => other.to_string(),
                        };
                        rows.push((format!("{}.{}", section, key), rendered));
                    }
                }
                other => rows.push((section, other.to_string())),
            }
        }
    }
    Ok(rows)
}
