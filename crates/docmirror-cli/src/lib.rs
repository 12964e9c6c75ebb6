//! docmirror command-line interface.
//!
//! The binary in `main.rs` only maps the result of [`run`] to an exit code.

mod cli;
mod commands;
pub mod error;
mod output;
mod utils;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

/// Parse arguments, initialize logging and run the selected command.
///
/// # Errors
///
/// Returns the command's error; see [`error::exit_code_from_error`] for how
/// it maps to an exit code.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    utils::initialize_logging(&cli)?;
    execute_command(&cli)
}

fn execute_command(cli: &Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Mirror(args) => commands::mirror(args, config, cli.quiet),
        Commands::Render(args) => commands::render(args, config, cli.quiet),
        Commands::Config { format, path, init } => {
            let action = if *init {
                commands::ConfigAction::Init
            } else if *path {
                commands::ConfigAction::Path
            } else {
                commands::ConfigAction::Show
            };
            commands::show_config(*format, action, config)
        },
    }
}
