//! docmirror - mirror Lark/Feishu documents into Markdown.

use std::process::ExitCode;

use colored::Colorize;
use docmirror_cli::error::exit_code_from_error;

fn main() -> ExitCode {
    match docmirror_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(exit_code_from_error(&err))
        },
    }
}
