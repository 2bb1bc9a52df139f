//! `info` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use contracts::FusionConfig;

use crate::cli::InfoArgs;

/// Execute the `info` command
///
/// Prints the effective configuration, defaults filled in.
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration info");
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => FusionConfig::default(),
    };

    println!("{}", render(&config, args.json)?);
    Ok(())
}

fn render(config: &FusionConfig, json: bool) -> Result<String> {
    let text = if json {
        config_loader::ConfigLoader::to_json(config).context("Failed to serialize config as JSON")?
    } else {
        config_loader::ConfigLoader::to_toml(config).context("Failed to serialize config as TOML")?
    };
    Ok(text)
}
