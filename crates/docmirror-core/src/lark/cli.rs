//! Collaborators backed by `lark-cli`.
//!
//! Every call spawns the executable with a per-command timeout. The collaborator
//! traits are synchronous, so [`LarkCli`] owns a current-thread Tokio runtime
//! and blocks on each command.

use super::PERMISSION_DENIED_CODE;
use crate::collaborators::{
    BinaryFetcher, BoardFetcher, DocumentSource, UserDirectory, UserIdType, UserInfo,
};
use crate::config::LarkConfig;
use crate::model::{Block, parse_block_listing};
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio::runtime::Runtime;
use tracing::{debug, instrument, warn};

/// Handle to a `lark-cli` installation.
pub struct LarkCli {
    binary: String,
    timeout: Duration,
    retries: u32,
    runtime: Runtime,
}

impl std::fmt::Debug for LarkCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LarkCli")
            .field("binary", &self.binary)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}

impl LarkCli {
    /// Handle for `binary` with a per-command `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the async runtime cannot be created.
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            binary: binary.into(),
            timeout,
            retries: 0,
            runtime,
        })
    }

    /// Retry commands that fail recoverably up to `retries` more times.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Handle configured from the `[lark]` table.
    ///
    /// # Errors
    ///
    /// Returns an error if the async runtime cannot be created.
    pub fn from_config(config: &LarkConfig) -> Result<Self> {
        Ok(Self::new(config.binary.clone(), Duration::from_secs(config.timeout_secs))?
            .with_retries(config.retries))
    }

    /// Executable name or path.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Locate the executable, returning its path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CliNotInstalled`] when the binary cannot be found.
    #[instrument(level = "debug", skip(self), fields(binary = %self.binary))]
    pub fn detect(&self) -> Result<String> {
        let not_installed = || Error::CliNotInstalled {
            binary: self.binary.clone(),
        };

        if self.binary.contains(['/', '\\']) {
            return if Path::new(&self.binary).is_file() {
                Ok(self.binary.clone())
            } else {
                Err(not_installed())
            };
        }

        #[cfg(windows)]
        let which_cmd = "where";
        #[cfg(not(windows))]
        let which_cmd = "which";

        let output = self
            .runtime
            .block_on(Command::new(which_cmd).arg(&self.binary).output())
            .map_err(Error::Io)?;
        if !output.status.success() {
            return Err(not_installed());
        }

        let path = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if path.is_empty() {
            return Err(not_installed());
        }
        debug!(%path, "found lark-cli");
        Ok(path)
    }

    /// Resolve a wiki node token to the token of the document it wraps.
    ///
    /// `Ok(None)` when the node is not accessible.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or its output has no object token.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve_wiki_node(&self, node_token: &str) -> Result<Option<String>> {
        let args = ["--format", "json", "get-node", node_token].map(String::from);
        match self.run(&args)? {
            Some(stdout) => parse_node(&stdout, node_token).map(Some),
            None => Ok(None),
        }
    }

    /// Run a command, returning its stdout.
    ///
    /// `Ok(None)` when the command failed with the permission-denied code.
    /// Timeouts and command failures are retried; a missing binary is not.
    fn run(&self, args: &[String]) -> Result<Option<String>> {
        let command = subcommand(args);
        retry_recoverable(self.retries, command, || self.run_once(command, args))
    }

    fn run_once(&self, command: &str, args: &[String]) -> Result<Option<String>> {
        debug!(binary = %self.binary, ?args, "executing lark-cli");

        let mut cmd = Command::new(&self.binary);
        cmd.args(args).kill_on_drop(true);

        let output = match self
            .runtime
            .block_on(async { tokio::time::timeout(self.timeout, cmd.output()).await })
        {
            Ok(result) => result.map_err(|e| self.spawn_error(e))?,
            Err(_) => {
                return Err(Error::Timeout(format!(
                    "lark-cli {command} timed out after {}s",
                    self.timeout.as_secs()
                )));
            },
        };

        interpret_output(command, &output)
    }

    fn spawn_error(&self, err: std::io::Error) -> Error {
        if err.kind() == ErrorKind::NotFound {
            Error::CliNotInstalled {
                binary: self.binary.clone(),
            }
        } else {
            Error::Io(err)
        }
    }
}

fn retry_recoverable<T>(
    retries: u32,
    command: &str,
    mut attempt: impl FnMut() -> Result<T>,
) -> Result<T> {
    let mut failures = 0;
    loop {
        match attempt() {
            Err(e) if e.is_recoverable() && failures < retries => {
                failures += 1;
                warn!(command, attempt = failures, error = %e, "retrying lark-cli command");
            },
            result => return result,
        }
    }
}

/// First non-flag argument after `--format <fmt>`.
fn subcommand(args: &[String]) -> &str {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--format" {
            iter.next();
        } else if !arg.starts_with('-') {
            return arg;
        }
    }
    "lark-cli"
}

fn interpret_output(command: &str, output: &Output) -> Result<Option<String>> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    if output.status.success() {
        return Ok(Some(stdout.into_owned()));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if stdout.contains(PERMISSION_DENIED_CODE) || stderr.contains(PERMISSION_DENIED_CODE) {
        debug!(command, "permission denied, treating as empty");
        return Ok(None);
    }

    warn!(
        command,
        exit_code = ?output.status.code(),
        stderr = %stderr.trim(),
        "lark-cli command failed"
    );
    let detail = if stderr.trim().is_empty() {
        stdout.trim().to_string()
    } else {
        stderr.trim().to_string()
    };
    Err(Error::CommandFailed {
        command: command.to_string(),
        reason: format!("exit status {:?}: {detail}", output.status.code()),
    })
}

#[derive(Deserialize)]
struct NodeResponse {
    #[serde(default)]
    obj_token: Option<String>,
}

fn parse_node(json: &str, node_token: &str) -> Result<String> {
    let node: NodeResponse = serde_json::from_str(json)
        .map_err(|e| Error::Parse(format!("get-node output for '{node_token}': {e}")))?;
    node.obj_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Parse(format!("get-node missing obj_token for '{node_token}'")))
}

/// Extract user names from `get-user-info` output, accepting the record at
/// the top level or nested under `user` / `data.user`.
fn parse_user_info(json: &str) -> Result<Option<UserInfo>> {
    if json.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(json)?;
    let candidates = [
        Some(&value),
        value.get("user"),
        value.get("data").and_then(|d| d.get("user")),
    ];
    let info = candidates
        .into_iter()
        .flatten()
        .filter_map(|v| UserInfo::deserialize(v).ok())
        .find(|info| info.display_name().is_some());
    Ok(info)
}

fn media_args(token: &str, doc_id: &str, dest: &Path) -> Vec<String> {
    let extra = serde_json::json!({ "drive_route_token": doc_id }).to_string();
    vec![
        "download-media".to_string(),
        token.to_string(),
        dest.to_string_lossy().into_owned(),
        "--extra".to_string(),
        extra,
    ]
}

fn board_args(token: &str, dest: &Path) -> Vec<String> {
    vec![
        "get-board-image".to_string(),
        token.to_string(),
        dest.to_string_lossy().into_owned(),
    ]
}

impl DocumentSource for LarkCli {
    #[instrument(level = "debug", skip(self))]
    fn fetch_blocks(&self, doc_id: &str) -> Result<Vec<Block>> {
        let args = ["--format", "json", "get-blocks", doc_id, "--all"].map(String::from);
        match self.run(&args)? {
            Some(stdout) => parse_block_listing(&stdout),
            None => {
                warn!(doc_id, "no permission to read document blocks");
                Ok(Vec::new())
            },
        }
    }
}

impl BinaryFetcher for LarkCli {
    #[instrument(level = "debug", skip(self))]
    fn fetch_media(&self, token: &str, doc_id: &str, dest: &Path) -> Result<()> {
        self.run(&media_args(token, doc_id, dest)).map(|_| ())
    }
}

impl BoardFetcher for LarkCli {
    #[instrument(level = "debug", skip(self))]
    fn fetch_board(&self, token: &str, dest: &Path) -> Result<()> {
        self.run(&board_args(token, dest)).map(|_| ())
    }
}

impl UserDirectory for LarkCli {
    #[instrument(level = "debug", skip(self))]
    fn lookup_user(&self, user_id: &str, id_type: UserIdType) -> Result<Option<UserInfo>> {
        let args = [
            "--format",
            "json",
            "get-user-info",
            user_id,
            "--user-id-type",
            id_type.as_str(),
        ]
        .map(String::from);
        match self.run(&args)? {
            Some(stdout) => parse_user_info(&stdout),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn output(code: i32, stdout: &str, stderr: &str) -> Output {
        use std::os::unix::process::ExitStatusExt;
        Output {
            status: std::process::ExitStatus::from_raw(code << 8),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_subcommand_skips_format_flag() {
        let args = ["--format", "json", "get-blocks", "doc", "--all"].map(String::from);
        assert_eq!(subcommand(&args), "get-blocks");
        assert_eq!(subcommand(&board_args("t", Path::new("/a/t.png"))), "get-board-image");
        assert_eq!(subcommand(&[]), "lark-cli");
    }

    #[test]
    fn test_media_args_carry_route_token() {
        let args = media_args("imgTok", "doxcnDoc", Path::new("/tmp/assets/imgTok"));

        assert_eq!(args[..3], ["download-media", "imgTok", "/tmp/assets/imgTok"]);
        assert_eq!(args[3], "--extra");
        let extra: Value = serde_json::from_str(&args[4]).unwrap();
        assert_eq!(extra["drive_route_token"], "doxcnDoc");
    }

    #[test]
    fn test_parse_node() {
        assert_eq!(
            parse_node(r#"{"obj_token": "doxcnReal", "obj_type": "docx"}"#, "wik").unwrap(),
            "doxcnReal"
        );
        assert_eq!(parse_node("{}", "wik").unwrap_err().category(), "parse");
        assert_eq!(parse_node("not json", "wik").unwrap_err().category(), "parse");
    }

    #[test]
    fn test_parse_user_info_shapes() {
        let top = parse_user_info(r#"{"name": "Alice", "en_name": "Alice"}"#).unwrap();
        let nested = parse_user_info(r#"{"data": {"user": {"en_name": "Bob"}}}"#).unwrap();
        let empty = parse_user_info("{}").unwrap();

        assert_eq!(top.unwrap().display_name(), Some("Alice"));
        assert_eq!(nested.unwrap().display_name(), Some("Bob"));
        assert_eq!(empty, None);
        assert_eq!(parse_user_info("  ").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_permission_denied_is_empty() {
        let out = output(1, "", "error: code=41050 no permission");

        assert_eq!(interpret_output("get-blocks", &out).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_is_command_failed() {
        let out = output(2, "", "boom\n");

        let err = interpret_output("download-media", &out).unwrap_err();

        assert!(matches!(
            err,
            Error::CommandFailed { ref command, ref reason }
                if command == "download-media" && reason.contains("boom")
        ));
        assert!(err.is_recoverable());
    }

    #[cfg(unix)]
    #[test]
    fn test_success_returns_stdout() {
        let out = output(0, "{\"items\":[]}", "");
        assert_eq!(
            interpret_output("get-blocks", &out).unwrap().as_deref(),
            Some("{\"items\":[]}")
        );
    }

    #[test]
    fn test_recoverable_failure_is_retried() {
        // Given: a command that fails once, then succeeds
        let mut calls = 0;
        let result = retry_recoverable(1, "get-blocks", || {
            calls += 1;
            if calls == 1 {
                Err(Error::Timeout("get-blocks".into()))
            } else {
                Ok("{}")
            }
        });

        // Then: the second attempt's output is returned
        assert_eq!(result.unwrap(), "{}");
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_retries_are_bounded() {
        let mut calls = 0;
        let result: Result<()> = retry_recoverable(2, "download-media", || {
            calls += 1;
            Err(Error::CommandFailed {
                command: "download-media".into(),
                reason: "exit 1".into(),
            })
        });

        assert!(matches!(result, Err(Error::CommandFailed { .. })));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_permanent_failure_is_not_retried() {
        let mut calls = 0;
        let result: Result<()> = retry_recoverable(3, "get-blocks", || {
            calls += 1;
            Err(Error::CliNotInstalled {
                binary: "lark-cli".into(),
            })
        });

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retries_come_from_config() {
        let config = LarkConfig {
            retries: 4,
            ..LarkConfig::default()
        };

        let cli = LarkCli::from_config(&config).unwrap();

        assert_eq!(cli.retries, 4);
    }

    #[test]
    fn test_missing_binary_reported_as_not_installed() {
        let cli = LarkCli::new("docmirror-no-such-binary-xyz", Duration::from_secs(5)).unwrap();

        let err = cli.fetch_blocks("doc").unwrap_err();

        assert!(matches!(err, Error::CliNotInstalled { .. }));
        assert!(cli.detect().is_err());
    }

    #[test]
    fn test_explicit_missing_path_not_installed() {
        let cli = LarkCli::new("/nonexistent/bin/lark-cli", Duration::from_secs(5)).unwrap();
        assert!(matches!(cli.detect(), Err(Error::CliNotInstalled { .. })));
    }
}
