//! Config file management: init, path, show

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use sikuwat_core::config::CONFIG_TEMPLATE;
use sikuwat_core::SikuwatConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a commented config template
    Init {
        /// Overwrite an existing config
        #[arg(long, short)]
        force: bool,
    },
    /// Show config file path
    Path,
    /// Print the effective config with secrets redacted
    Show,
}

pub fn run_config(args: ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(SikuwatConfig::config_path);

    match args.command {
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!("Config already exists at {:?}\n\nUse --force to overwrite", path);
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&path, CONFIG_TEMPLATE)
                .with_context(|| format!("Failed to write config file: {:?}", path))?;

            println!("✅ Created config at: {}", path.display());
            println!("\nNext steps:");
            println!("  1. Edit the config: $EDITOR {}", path.display());
            println!("  2. Put secrets in ~/.sikuwat/.env (SUPABASE_*, GOOGLE_API_KEY)");
            println!("  3. Run: sikuwat migrate && sikuwat serve");
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            let config = SikuwatConfig::load(explicit)?;
            let rendered = toml::to_string_pretty(&config.redacted())
                .context("Failed to serialize config to TOML")?;
            println!("{}", rendered);
            Ok(())
        }
    }
}
