//! # CLI Structure and Argument Parsing
//!
//! ```bash
//! # Mirror a document by URL or id
//! docmirror mirror https://acme.feishu.cn/docx/doxcnAbc -o notes/weekly.md
//!
//! # Re-render a saved block listing without touching the network
//! docmirror render blocks.json --doc-id doxcnAbc -o weekly.md
//!
//! # Show the effective configuration
//! docmirror config --format json
//!
//! # Start from a default config file
//! docmirror config --init
//! ```

use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure for the `docmirror` command.
#[derive(Parser, Clone, Debug)]
#[command(name = "docmirror")]
#[command(version)]
#[command(
    about = "docmirror - Mirror Lark/Feishu documents into Markdown with local assets",
    long_about = None
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Enable debug logging and print collaborator calls
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Path to configuration file (overrides autodiscovery). Also via `DOCMIRROR_CONFIG`.
    #[arg(long, global = true, value_name = "FILE", env = "DOCMIRROR_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Fetch a document and write it as Markdown
    Mirror(MirrorArgs),

    /// Render a saved block listing (JSON) to Markdown
    Render(RenderArgs),

    /// Show the effective configuration
    Config {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Print the config file path only
        #[arg(long, conflicts_with = "init")]
        path: bool,

        /// Write a default config file and print its path
        #[arg(long)]
        init: bool,
    },
}

/// Asset handling flags shared by rendering commands.
#[derive(Args, Clone, Debug)]
pub struct AssetArgs {
    /// Do not download images or board snapshots
    #[arg(long = "no-assets")]
    pub no_assets: bool,

    /// Directory for downloaded assets (default: `<output dir>/assets`)
    #[arg(long, value_name = "DIR")]
    pub assets_dir: Option<PathBuf>,
}

/// Arguments for `docmirror mirror`.
#[derive(Args, Clone, Debug)]
pub struct MirrorArgs {
    /// Document URL or bare document id
    #[arg(value_name = "URL|ID")]
    pub input: String,

    /// Markdown file to write
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    #[command(flatten)]
    pub assets: AssetArgs,

    /// Output format for the run summary
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for `docmirror render`.
#[derive(Args, Clone, Debug)]
pub struct RenderArgs {
    /// Block listing saved from `lark-cli get-blocks`
    #[arg(value_name = "BLOCKS_JSON")]
    pub listing: PathBuf,

    /// Document id used to locate the root (default: file stem)
    #[arg(long, value_name = "ID")]
    pub doc_id: Option<String>,

    /// Markdown file to write
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Use lark-cli for asset downloads and user names
    #[arg(long)]
    pub online: bool,

    #[command(flatten)]
    pub assets: AssetArgs,

    /// Output format for the run summary
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Cli {
    /// Output format of the selected command.
    pub const fn format(&self) -> OutputFormat {
        match &self.command {
            Commands::Mirror(args) => args.format,
            Commands::Render(args) => args.format,
            Commands::Config { format, .. } => *format,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_mirror_args() {
        let cli = Cli::try_parse_from([
            "docmirror",
            "mirror",
            "https://acme.feishu.cn/docx/doxcnAbc",
            "-o",
            "out/doc.md",
            "--no-assets",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert!(matches!(cli.format(), OutputFormat::Json));
        let Commands::Mirror(args) = cli.command else {
            panic!("expected mirror command");
        };
        assert!(args.assets.no_assets);
        assert_eq!(args.output, PathBuf::from("out/doc.md"));
    }

    #[test]
    fn test_render_requires_output() {
        assert!(Cli::try_parse_from(["docmirror", "render", "blocks.json"]).is_err());
    }
}
