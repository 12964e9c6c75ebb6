//! Command implementations for the docmirror CLI.

mod config;
mod mirror;
mod render;

use std::path::Path;

use anyhow::{Context, Result};
use docmirror_core::Config;
use docmirror_core::config::LARK_CLI_ENV;

pub use config::{ConfigAction, execute as show_config};
pub use mirror::execute as mirror;
pub use render::execute as render;

/// Load configuration from an explicit file or the default location.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let config = Config::load_from(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            Ok(config.with_binary_override(std::env::var(LARK_CLI_ENV).ok().as_deref()))
        },
        None => Ok(Config::load()?),
    }
}
