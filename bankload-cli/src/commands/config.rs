//! `bankload config ...`

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use bankload_config::{BankloadConfig, ConfigLoader};
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub fn handle_config_validate(config_file: &Path) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {:?}",
            config_file
        ));
    }

    match ConfigLoader::new().from_file(config_file) {
        Ok(_config) => {
            println!("✅ Configuration file is valid");
            info!("Configuration validation passed");
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {}", e);
            error!("Configuration validation failed: {}", e);
            Err(e.into())
        }
    }
}

pub fn handle_config_generate(output: &Path, force: bool) -> Result<()> {
    info!("Generating sample configuration at: {:?}", output);

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
    }

    fs::write(output, BankloadConfig::generate_sample())
        .context("Failed to write configuration file")?;

    println!("✅ Configuration generated at: {:?}", output);
    println!(
        "🔧 Validate with: bankload config validate --config-file {:?}",
        output
    );

    Ok(())
}

pub fn render_config(config: &BankloadConfig, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(config).context("Failed to serialize to YAML"),
        OutputFormat::Json => {
            serde_json::to_string_pretty(config).context("Failed to serialize to JSON")
        }
    }
}

pub fn handle_config_show(config: &BankloadConfig, format: OutputFormat) -> Result<()> {
    println!("{}", render_config(config, format)?);
    Ok(())
}
