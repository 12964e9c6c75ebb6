//! End-to-end mirroring of one document to a Markdown file.

use crate::assets::{AssetOptions, AssetResolver};
use crate::collaborators::{BinaryFetcher, BoardFetcher, DocumentSource, UserDirectory};
use crate::config::RenderConfig;
use crate::mention::MentionResolver;
use crate::render::{RenderContext, render_document};
use crate::Result;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{info, instrument};

/// Where to write and how to treat assets.
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Markdown output file.
    pub out_path: PathBuf,
    /// Assets directory; `<out_dir>/<assets_dir_name>` when unset.
    pub assets_dir: Option<PathBuf>,
    /// Directory name used when `assets_dir` is unset.
    pub assets_dir_name: String,
    /// Download missing assets.
    pub download_assets: bool,
    /// Maximum width of images inside tables.
    pub table_image_max_width: u32,
}

impl MirrorOptions {
    /// Options for `out_path` with the given render settings.
    pub fn new(out_path: impl Into<PathBuf>, render: &RenderConfig) -> Self {
        Self {
            out_path: out_path.into(),
            assets_dir: None,
            assets_dir_name: render.assets_dir_name.clone(),
            download_assets: render.download_assets,
            table_image_max_width: render.table_image_max_width,
        }
    }

    /// Use an explicit assets directory.
    #[must_use]
    pub fn with_assets_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.assets_dir = dir;
        self
    }

    /// Enable or disable asset downloads.
    #[must_use]
    pub const fn with_download(mut self, download: bool) -> Self {
        self.download_assets = download;
        self
    }
}

/// The services a mirror run talks to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Block listing source.
    pub source: &'a dyn DocumentSource,
    /// Image downloads.
    pub media: &'a dyn BinaryFetcher,
    /// Board and diagram snapshots.
    pub boards: &'a dyn BoardFetcher,
    /// User name lookups.
    pub users: &'a dyn UserDirectory,
}

impl<'a> Collaborators<'a> {
    /// Use one value for every role.
    pub fn uniform<T>(all: &'a T) -> Self
    where
        T: DocumentSource + BinaryFetcher + BoardFetcher + UserDirectory,
    {
        Self {
            source: all,
            media: all,
            boards: all,
            users: all,
        }
    }
}

/// Outcome of a mirror run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorResult {
    /// Document id that was rendered.
    pub doc_id: String,
    /// Trimmed page title.
    pub title: String,
    /// Absolute path of the written Markdown file.
    pub out_path: PathBuf,
    /// The Markdown that was written.
    pub markdown: String,
}

/// Fetch, render and write `doc_id`.
///
/// # Errors
///
/// Fails when the block listing cannot be fetched, no document root exists,
/// or the output cannot be written. Asset and mention failures only degrade
/// the output.
#[instrument(level = "debug", skip(options, collaborators), fields(out = %options.out_path.display()))]
pub fn mirror_document(
    doc_id: &str,
    options: &MirrorOptions,
    collaborators: Collaborators<'_>,
) -> Result<MirrorResult> {
    let out_path = normalize(&std::path::absolute(&options.out_path)?);
    let out_dir = out_path
        .parent()
        .map_or_else(std::env::current_dir, |p| Ok(p.to_path_buf()))?;
    let assets_dir = match &options.assets_dir {
        Some(dir) => normalize(&std::path::absolute(dir)?),
        None => out_dir.join(&options.assets_dir_name),
    };
    let assets_rel = relative_path(&out_dir, &assets_dir);

    let blocks = collaborators.source.fetch_blocks(doc_id)?;

    let assets = AssetResolver::new(
        AssetOptions {
            assets_dir,
            assets_rel,
            download: options.download_assets,
        },
        doc_id,
        collaborators.media,
        collaborators.boards,
    );
    let mut ctx = RenderContext::new(MentionResolver::new(collaborators.users), assets)
        .with_table_image_max_width(options.table_image_max_width);
    let output = render_document(doc_id, blocks, &mut ctx)?;

    fs::create_dir_all(&out_dir)?;
    fs::write(&out_path, &output.markdown)?;
    info!(doc_id, path = %out_path.display(), "wrote markdown");

    Ok(MirrorResult {
        doc_id: doc_id.to_string(),
        title: output.title,
        out_path,
        markdown: output.markdown,
    })
}

/// Resolve `.` and `..` lexically.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            },
            other => out.push(other),
        }
    }
    out
}

/// `target` relative to `base`, `/`-separated; empty when they are equal.
fn relative_path(base: &Path, target: &Path) -> String {
    let base: Vec<Component<'_>> = base.components().collect();
    let target: Vec<Component<'_>> = target.components().collect();
    let common = base
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = std::iter::repeat_n("..".to_string(), base.len() - common);
    let downs = target[common..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());
    ups.chain(downs).collect::<Vec<_>>().join("/")
}
