//! Lark/Feishu integration through the `lark-cli` executable.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docmirror_core::config::LarkConfig;
//! use docmirror_core::lark::{LarkCli, extract_doc_id};
//!
//! let cli = LarkCli::from_config(&LarkConfig::default())?;
//! cli.detect()?;
//! let doc_id = extract_doc_id("https://example.feishu.cn/wiki/wikcnAbc", |token| {
//!     cli.resolve_wiki_node(token)
//! })?;
//! println!("document {doc_id}");
//! # Ok::<(), docmirror_core::Error>(())
//! ```

pub mod cli;
pub mod url;

pub use cli::LarkCli;
pub use url::{extract_doc_id, is_lark_doc_url};

/// Error code the service reports when the caller lacks permission on a
/// resource. Commands failing with it are treated as returning nothing.
pub const PERMISSION_DENIED_CODE: &str = "41050";
