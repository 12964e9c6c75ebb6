//! Asset materialization for images, whiteboards and diagrams.
//!
//! Assets land in one directory as `<token>.<ext>`. A token whose file already
//! exists is reused without contacting the service, so repeated renders of the
//! same document are cheap and download each asset once.

use crate::collaborators::{BinaryFetcher, BoardFetcher};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Whether `token` names a single file inside the assets directory.
///
/// Separators of either platform, `.`/`..` and absolute paths are rejected.
pub fn is_plain_file_name(token: &str) -> bool {
    if token.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(token).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Extensions a previously downloaded image may carry.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

const SNIFF_LEN: u64 = 32;
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
const JPEG_SOI: [u8; 3] = [0xff, 0xd8, 0xff];

/// Where assets go and how the output refers to them.
#[derive(Debug, Clone)]
pub struct AssetOptions {
    /// Absolute directory assets are written to.
    pub assets_dir: PathBuf,
    /// The same directory relative to the Markdown file; prefixed to every
    /// emitted path. Empty means "next to the Markdown file".
    pub assets_rel: String,
    /// Whether missing assets may be downloaded.
    pub download: bool,
}

/// Resolves asset tokens to relative paths, downloading on demand.
pub struct AssetResolver<'a> {
    options: AssetOptions,
    doc_id: String,
    media: &'a dyn BinaryFetcher,
    boards: &'a dyn BoardFetcher,
}

impl<'a> AssetResolver<'a> {
    /// Resolver for the assets of `doc_id`.
    pub fn new(
        options: AssetOptions,
        doc_id: impl Into<String>,
        media: &'a dyn BinaryFetcher,
        boards: &'a dyn BoardFetcher,
    ) -> Self {
        Self {
            options,
            doc_id: doc_id.into(),
            media,
            boards,
        }
    }

    /// Resolve an image token to a relative path.
    ///
    /// Returns `None` when a download was attempted and failed.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve_image(&self, token: &str) -> Option<String> {
        if !is_plain_file_name(token) {
            warn!(token, "rejecting image token that is not a plain file name");
            return None;
        }
        for ext in IMAGE_EXTENSIONS {
            let name = format!("{token}.{ext}");
            if self.options.assets_dir.join(&name).exists() {
                debug!(%name, "reusing downloaded image");
                return Some(self.relative(&name));
            }
        }

        let raw_path = self.options.assets_dir.join(token);
        if self.options.download && !raw_path.exists() {
            if let Err(e) = self.prepare_dir() {
                warn!(token, error = %e, "cannot create assets directory");
                return None;
            }
            if let Err(e) = self.media.fetch_media(token, &self.doc_id, &raw_path) {
                warn!(token, error = %e, "image download failed");
                return None;
            }
            if !raw_path.exists() {
                warn!(token, "image download produced no file");
                return None;
            }
        }

        let Some(ext) = sniff_image_extension(&raw_path) else {
            return Some(self.relative(token));
        };

        let name = format!("{token}.{ext}");
        let final_path = self.options.assets_dir.join(&name);
        let moved = if final_path.exists() {
            fs::remove_file(&raw_path)
        } else {
            fs::rename(&raw_path, &final_path)
        };
        if let Err(e) = moved {
            warn!(token, error = %e, "could not add extension to downloaded image");
            return Some(self.relative(token));
        }
        Some(self.relative(&name))
    }

    /// Resolve a whiteboard or diagram token to a relative PNG path.
    ///
    /// Returns `None` when a download was attempted and failed.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve_board(&self, token: &str) -> Option<String> {
        if !is_plain_file_name(token) {
            warn!(token, "rejecting board token that is not a plain file name");
            return None;
        }
        let name = format!("{token}.png");
        let path = self.options.assets_dir.join(&name);

        if self.options.download && !path.exists() {
            if let Err(e) = self.prepare_dir() {
                warn!(token, error = %e, "cannot create assets directory");
                return None;
            }
            if let Err(e) = self.boards.fetch_board(token, &path) {
                warn!(token, error = %e, "board download failed");
                return None;
            }
            if !path.exists() {
                warn!(token, "board download produced no file");
                return None;
            }
        }

        Some(self.relative(&name))
    }

    fn prepare_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.options.assets_dir)
    }

    fn relative(&self, file_name: &str) -> String {
        let prefix = self.options.assets_rel.trim_end_matches(['/', '\\']);
        if prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{file_name}", prefix.replace('\\', "/"))
        }
    }
}

/// Identify an image format from its first bytes.
pub fn sniff_bytes(header: &[u8]) -> Option<&'static str> {
    if header.starts_with(&PNG_SIGNATURE) {
        return Some("png");
    }
    if header.starts_with(&JPEG_SOI) {
        return Some("jpg");
    }
    if header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a") {
        return Some("gif");
    }
    if header.starts_with(b"RIFF") && header.get(8..12).is_some_and(|tag| tag == b"WEBP") {
        return Some("webp");
    }
    if header.starts_with(b"BM") {
        return Some("bmp");
    }
    let text = String::from_utf8_lossy(header);
    let text = text.trim_start();
    if text.starts_with("<?xml") || text.starts_with("<svg") {
        return Some("svg");
    }
    None
}

/// Identify the image format of the file at `path`. Missing or unreadable
/// files have no format.
pub fn sniff_image_extension(path: &Path) -> Option<&'static str> {
    let file = File::open(path).ok()?;
    let mut header = Vec::with_capacity(32);
    file.take(SNIFF_LEN).read_to_end(&mut header).ok()?;
    sniff_bytes(&header)
}
