//! Error types and handling for docmirror-core operations.
//!
//! Rendering itself is deliberately forgiving: failed downloads, failed user
//! lookups, unknown block kinds and malformed inline elements all degrade to
//! placeholder output instead of surfacing here. The variants below cover the
//! failures that *do* stop a mirror run:
//!
//! - **Root resolution**: the block listing has no page block and no block with
//!   the requested id
//! - **Collaborator failures**: the document service CLI is missing, exits with
//!   an error, or times out
//! - **I/O**: writing the Markdown file or the asset directory
//! - **Parse / serialization**: block listings, configuration files, URLs
//!
//! ```rust
//! use docmirror_core::Error;
//!
//! let err = Error::RootNotFound("doxcnMissing".to_string());
//! assert_eq!(err.category(), "root_not_found");
//! assert!(!err.is_recoverable());
//! ```

use thiserror::Error;

/// The main error type for docmirror-core operations.
///
/// All fallible public functions return `Result<T, Error>`. The underlying
/// `std::io::Error` is preserved for I/O failures so callers can inspect the
/// error kind.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers writing the Markdown output, creating the asset directory and
    /// renaming downloaded assets.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document root could not be located.
    ///
    /// Raised when the block listing contains neither a parentless page block
    /// nor a block whose id equals the requested document id. There is nothing
    /// to render in that case.
    #[error("document root not found for '{0}'")]
    RootNotFound(String),

    /// Parsing operation failed.
    ///
    /// Occurs when a block listing or collaborator response does not have the
    /// expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Document URL is malformed or carries no recognizable document id.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Operation timed out.
    ///
    /// Used by collaborators that enforce a deadline on external commands.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The document service CLI is not installed or not in PATH.
    #[error("{binary} not found in PATH. Install it and authenticate before mirroring documents")]
    CliNotInstalled {
        /// Binary that was looked up.
        binary: String,
    },

    /// An external command exited unsuccessfully.
    #[error("command '{command}' failed: {reason}")]
    CommandFailed {
        /// Subcommand that was executed (for example `get-blocks`).
        command: String,
        /// Exit status and captured output.
        reason: String,
    },

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Timeouts and failed external commands are typically transient (network
    /// hiccups on the service side); temporary I/O conditions are treated the
    /// same way. Everything else is permanent.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::CommandFailed { .. } => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Useful for structured logging and for mapping errors onto exit codes.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::RootNotFound(_) => "root_not_found",
            Self::Parse(_) => "parse",
            Self::Serialization(_) => "serialization",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Timeout(_) => "timeout",
            Self::CliNotInstalled { .. } | Self::CommandFailed { .. } => "collaborator",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        // Given: errors from each failure family
        let root = Error::RootNotFound("doxcnABC".to_string());
        let command = Error::CommandFailed {
            command: "get-blocks".to_string(),
            reason: "exit status 1".to_string(),
        };
        let missing = Error::CliNotInstalled {
            binary: "lark-cli".to_string(),
        };

        // Then: messages identify the failing resource
        assert_eq!(root.to_string(), "document root not found for 'doxcnABC'");
        assert_eq!(
            command.to_string(),
            "command 'get-blocks' failed: exit status 1"
        );
        assert!(missing.to_string().starts_with("lark-cli not found in PATH"));
    }

    #[test]
    fn test_recoverability() {
        assert!(Error::Timeout("get-blocks".into()).is_recoverable());
        assert!(Error::Io(io::Error::new(io::ErrorKind::Interrupted, "eintr")).is_recoverable());
        assert!(
            Error::CommandFailed {
                command: "download-media".into(),
                reason: "503".into()
            }
            .is_recoverable()
        );

        assert!(!Error::RootNotFound("x".into()).is_recoverable());
        assert!(!Error::Io(io::Error::new(io::ErrorKind::PermissionDenied, "no")).is_recoverable());
        assert!(!Error::InvalidUrl("nope".into()).is_recoverable());
    }

    #[test]
    fn test_categories() {
        let cases = [
            (Error::Parse("x".into()), "parse"),
            (Error::Config("x".into()), "config"),
            (Error::NotFound("x".into()), "not_found"),
            (Error::Timeout("x".into()), "timeout"),
            (
                Error::CliNotInstalled {
                    binary: "lark-cli".into(),
                },
                "collaborator",
            ),
            (Error::Other("x".into()), "other"),
        ];

        for (error, expected) in cases {
            assert_eq!(error.category(), expected, "category for {error}");
        }
    }

    #[test]
    fn test_from_serde_json() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let converted: Error = err.into();
        assert_eq!(converted.category(), "serialization");
    }
}
