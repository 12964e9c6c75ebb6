use std::path::Path;

use anyhow::Result;
use docmirror_core::Config;

use tracing::info;

use crate::error::CliError;
use crate::output::{OutputFormat, print_json};

/// What `docmirror config` should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Print the config file path.
    Path,
    /// Write a default config file.
    Init,
}

/// Show, locate or initialize the configuration file.
pub fn execute(format: OutputFormat, action: ConfigAction, config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };

    if action == ConfigAction::Init {
        if path.exists() {
            return Err(CliError::usage(anyhow::anyhow!(
                "config already exists at {}",
                path.display()
            ))
            .into());
        }
        Config::default().save_to(&path)?;
        info!(path = %path.display(), "wrote default config");
    }

    let path_only = action != ConfigAction::Show;

    if path_only {
        match format {
            OutputFormat::Json => print_json(&serde_json::json!({ "path": path }))?,
            OutputFormat::Text => println!("{}", path.display()),
        }
        return Ok(());
    }

    let config = super::load_config(config_path)?;
    match format {
        OutputFormat::Json => print_json(&config)?,
        OutputFormat::Text => {
            println!("# {}", path.display());
            print!("{}", toml::to_string_pretty(&config)?);
        },
    }
    Ok(())
}
