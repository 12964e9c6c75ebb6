//! Output formatting for command summaries.
//!
//! Text output is colored for humans; JSON output is a single pretty-printed
//! object on stdout for scripts.

use anyhow::Result;
use colored::Colorize;
use docmirror_core::MirrorResult;
use serde::Serialize;

/// Output format for command summaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// Single JSON object
    Json,
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the outcome of a mirror or render run.
pub fn print_mirror_result(result: &MirrorResult, format: OutputFormat, quiet: bool) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Text if quiet => Ok(()),
        OutputFormat::Text => {
            let title = if result.title.is_empty() {
                "(untitled)".dimmed().to_string()
            } else {
                result.title.bold().to_string()
            };
            println!(
                "{} {title} {}",
                "✓".green(),
                format!("[{}]", result.doc_id).dimmed()
            );
            println!(
                "  {} {} ({} bytes)",
                "→".cyan(),
                result.out_path.display(),
                result.markdown.len()
            );
            Ok(())
        },
    }
}
