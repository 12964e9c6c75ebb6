//! CLI error handling with semantic exit codes.
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Document written |
//! | 1 | `Internal` | Unexpected failure, including I/O |
//! | 2 | `Usage` | Bad arguments, config, URL or block listing |
//! | 3 | `NotFound` | Missing input file or document root |
//! | 5 | `Network` | `lark-cli` missing or failing |
//! | 6 | `Timeout` | `lark-cli` exceeded its deadline |
//!
//! ```bash
//! docmirror mirror "$URL" -o doc.md
//! case $? in
//!     0) echo "mirrored" ;;
//!     5) echo "check lark-cli login" ;;
//!     *) echo "failed" ;;
//! esac
//! ```

use std::fmt;
use std::process::ExitCode;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Unexpected or internal error (exit code 1).
    Internal = 1,

    /// Invalid arguments, configuration or input (exit code 2).
    Usage = 2,

    /// Requested resource not found (exit code 3).
    NotFound = 3,

    /// The document service could not be reached (exit code 5).
    Network = 5,

    /// Operation timed out (exit code 6).
    Timeout = 6,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Create an `ExitCode` from this category.
    #[must_use]
    pub fn as_exit_code(self) -> ExitCode {
        ExitCode::from(self.exit_code())
    }

    /// Get a short description of this error category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Internal => "internal error",
            Self::Usage => "usage error",
            Self::NotFound => "not found",
            Self::Network => "network error",
            Self::Timeout => "timeout",
        }
    }

    /// Category for a library error.
    #[must_use]
    pub fn from_core(err: &docmirror_core::Error) -> Self {
        match err.category() {
            "root_not_found" | "not_found" => Self::NotFound,
            "parse" | "serialization" | "config" | "invalid_url" => Self::Usage,
            "timeout" => Self::Timeout,
            "collaborator" => Self::Network,
            _ => Self::Internal,
        }
    }

    /// Infer the error category from an error message.
    #[must_use]
    pub fn infer_from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("timeout") || msg_lower.contains("timed out") {
            return Self::Timeout;
        }

        if msg_lower.contains("not found")
            || msg_lower.contains("no such")
            || msg_lower.contains("does not exist")
        {
            return Self::NotFound;
        }

        if msg_lower.contains("invalid argument")
            || msg_lower.contains("invalid value")
            || msg_lower.contains("invalid url")
        {
            return Self::Usage;
        }

        Self::Internal
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A CLI error with a semantic category for exit code mapping.
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create a usage error.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    /// Create a not-found error.
    pub fn not_found(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::NotFound, source)
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<docmirror_core::Error> for CliError {
    fn from(err: docmirror_core::Error) -> Self {
        Self::new(ErrorCategory::from_core(&err), err)
    }
}

/// Determine the exit code from an `anyhow::Error`.
///
/// Checks for an explicit [`CliError`], then a library error anywhere in the
/// chain, then falls back to the message.
#[must_use]
pub fn exit_code_from_error(err: &anyhow::Error) -> u8 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    if let Some(core_err) = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<docmirror_core::Error>())
    {
        return ErrorCategory::from_core(core_err).exit_code();
    }
    ErrorCategory::infer_from_message(&err.to_string()).exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use docmirror_core::Error;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ErrorCategory::Internal.exit_code(), 1);
        assert_eq!(ErrorCategory::Usage.exit_code(), 2);
        assert_eq!(ErrorCategory::NotFound.exit_code(), 3);
        assert_eq!(ErrorCategory::Network.exit_code(), 5);
        assert_eq!(ErrorCategory::Timeout.exit_code(), 6);
    }

    #[test]
    fn test_core_errors_map_to_categories() {
        let cases = [
            (Error::RootNotFound("d".into()), ErrorCategory::NotFound),
            (Error::InvalidUrl("x".into()), ErrorCategory::Usage),
            (Error::Timeout("get-blocks".into()), ErrorCategory::Timeout),
            (
                Error::CliNotInstalled {
                    binary: "lark-cli".into(),
                },
                ErrorCategory::Network,
            ),
            (
                Error::CommandFailed {
                    command: "get-blocks".into(),
                    reason: "exit 1".into(),
                },
                ErrorCategory::Network,
            ),
            (Error::Other("?".into()), ErrorCategory::Internal),
        ];

        for (err, expected) in cases {
            assert_eq!(ErrorCategory::from_core(&err), expected, "{err}");
        }
    }

    #[test]
    fn test_exit_code_from_wrapped_core_error() {
        // Given: a library error wrapped with context
        let err = anyhow::Error::new(Error::RootNotFound("doc".into())).context("rendering doc");

        // When/Then: the library category wins over the message
        assert_eq!(exit_code_from_error(&err), 3);
    }

    #[test]
    fn test_exit_code_from_cli_error() {
        let err: anyhow::Error = CliError::usage(anyhow!("bad flag")).into();
        assert_eq!(exit_code_from_error(&err), 2);
    }

    #[test]
    fn test_inferred_fallback() {
        assert_eq!(exit_code_from_error(&anyhow!("operation timed out")), 6);
        assert_eq!(exit_code_from_error(&anyhow!("something odd")), 1);
    }
}
