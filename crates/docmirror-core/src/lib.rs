//! # docmirror-core
//!
//! Render Lark/Feishu cloud documents into portable Markdown with a local
//! asset directory.
//!
//! A document arrives as a flat, id-linked list of blocks. The renderer walks
//! it from the root and produces Markdown, falling back to HTML for tables
//! with merged cells, while images and whiteboards are downloaded next to the
//! output with extensions taken from their magic bytes.
//!
//! ## Architecture
//!
//! - **Model**: typed blocks and inline elements, plus serde records for the
//!   wire listing
//! - **Index**: arena lookup from block id to block and root location
//! - **Inline / Mentions**: style composition and cached user name lookup
//! - **Assets**: idempotent download and extension sniffing
//! - **Table**: grid or HTML layout with merge coverage
//! - **Render**: dispatch over block kinds
//! - **Collaborators**: traits for the document service; [`lark::LarkCli`]
//!   implements them on top of `lark-cli`
//!
//! ## Quick Start
//!
//! ```rust
//! use docmirror_core::assets::{AssetOptions, AssetResolver};
//! use docmirror_core::collaborators::Offline;
//! use docmirror_core::mention::MentionResolver;
//! use docmirror_core::render::{RenderContext, render_document};
//! use docmirror_core::parse_block_listing;
//!
//! let blocks = parse_block_listing(r#"{"items": [
//!     {"block_id": "doc", "block_type": 1, "children": ["p"],
//!      "page": {"elements": [{"text_run": {"content": "Notes"}}]}},
//!     {"block_id": "p", "parent_id": "doc", "block_type": 2,
//!      "text": {"elements": [{"text_run": {"content": "hello"}}]}}
//! ]}"#)?;
//!
//! let options = AssetOptions {
//!     assets_dir: std::env::temp_dir().join("docmirror-doc-assets"),
//!     assets_rel: "assets".into(),
//!     download: false,
//! };
//! let mut ctx = RenderContext::new(
//!     MentionResolver::new(&Offline),
//!     AssetResolver::new(options, "doc", &Offline, &Offline),
//! );
//! let output = render_document("doc", blocks, &mut ctx)?;
//!
//! assert_eq!(output.markdown, "# Notes\n\nhello\n");
//! # Ok::<(), docmirror_core::Error>(())
//! ```

/// Asset download and extension sniffing
pub mod assets;
/// Collaborator traits and simple implementations
pub mod collaborators;
/// TOML configuration
pub mod config;
/// Error types and result aliases
pub mod error;
/// Block arena and root location
pub mod index;
/// Inline element composition
pub mod inline;
/// Code block language table
pub mod languages;
/// `lark-cli` collaborators and URL parsing
pub mod lark;
/// User mention resolution
pub mod mention;
/// One-shot fetch, render and write
pub mod mirror;
/// Typed document model and wire records
pub mod model;
/// Block renderer
pub mod render;
/// Table layout
pub mod table;

pub use collaborators::{
    BinaryFetcher, BoardFetcher, DocumentSource, FileDocumentSource, Offline, UserDirectory,
    UserIdType, UserInfo,
};
pub use config::{Config, LarkConfig, RenderConfig};
pub use error::{Error, Result};
pub use index::{BlockIndex, Document};
pub use mirror::{Collaborators, MirrorOptions, MirrorResult, mirror_document};
pub use model::{Block, BlockKind, Inline, parse_block_listing};
pub use render::{RenderContext, RenderOutput, render_document};
