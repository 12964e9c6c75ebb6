//! Narrow interfaces to the services the renderer depends on.
//!
//! The renderer never talks to the network itself. Block listings, binary
//! downloads and user lookups go through these traits; [`crate::lark::LarkCli`]
//! implements all of them on top of the `lark-cli` executable, and tests plug
//! in in-memory fakes.

use crate::model::{Block, parse_block_listing};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Supplies the flat block list of a document.
pub trait DocumentSource {
    /// Fetch every block of `doc_id`, including the root and table cells.
    fn fetch_blocks(&self, doc_id: &str) -> Result<Vec<Block>>;
}

/// Downloads embedded media by token.
pub trait BinaryFetcher {
    /// Write the raw bytes of `token` to `dest`. `doc_id` is the owning
    /// document, required by the service to authorize the download.
    fn fetch_media(&self, token: &str, doc_id: &str, dest: &Path) -> Result<()>;
}

/// Downloads flattened PNG snapshots of whiteboards and diagrams.
pub trait BoardFetcher {
    /// Write a PNG snapshot of `token` to `dest`.
    fn fetch_board(&self, token: &str, dest: &Path) -> Result<()>;
}

/// Looks up user display names.
pub trait UserDirectory {
    /// Look up `user_id`, interpreting it as `id_type`. `Ok(None)` means the
    /// service returned nothing usable.
    fn lookup_user(&self, user_id: &str, id_type: UserIdType) -> Result<Option<UserInfo>>;
}

/// How a user id should be interpreted by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserIdType {
    /// App-scoped id, prefixed `ou_`.
    OpenId,
    /// Tenant-wide id, prefixed `on_`.
    UnionId,
    /// Plain user id.
    UserId,
}

impl UserIdType {
    /// Classify an id by its prefix.
    pub fn classify(user_id: &str) -> Self {
        if user_id.starts_with("ou_") {
            Self::OpenId
        } else if user_id.starts_with("on_") {
            Self::UnionId
        } else {
            Self::UserId
        }
    }

    /// Parameter value understood by the user lookup service.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenId => "open_id",
            Self::UnionId => "union_id",
            Self::UserId => "user_id",
        }
    }
}

impl fmt::Display for UserIdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-name-bearing user record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Localized display name.
    #[serde(default)]
    pub name: Option<String>,
    /// English display name.
    #[serde(default)]
    pub en_name: Option<String>,
}

impl UserInfo {
    /// Best available display name: `name`, then `en_name`.
    pub fn display_name(&self) -> Option<&str> {
        [self.name.as_deref(), self.en_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|n| !n.is_empty())
    }
}

/// Reads a saved block listing from disk, ignoring the requested id.
#[derive(Debug, Clone)]
pub struct FileDocumentSource {
    path: PathBuf,
}

impl FileDocumentSource {
    /// Source backed by the listing JSON at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for FileDocumentSource {
    fn fetch_blocks(&self, _doc_id: &str) -> Result<Vec<Block>> {
        if !self.path.exists() {
            return Err(Error::NotFound(format!(
                "block listing '{}' does not exist",
                self.path.display()
            )));
        }
        let json = fs::read_to_string(&self.path)?;
        parse_block_listing(&json)
    }
}

/// Empty collaborator: every fetch yields nothing.
///
/// Useful for offline renders where assets are already on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl DocumentSource for Offline {
    fn fetch_blocks(&self, _doc_id: &str) -> Result<Vec<Block>> {
        Ok(Vec::new())
    }
}

impl BinaryFetcher for Offline {
    fn fetch_media(&self, token: &str, _doc_id: &str, _dest: &Path) -> Result<()> {
        Err(Error::Other(format!("offline: cannot download media '{token}'")))
    }
}

impl BoardFetcher for Offline {
    fn fetch_board(&self, token: &str, _dest: &Path) -> Result<()> {
        Err(Error::Other(format!("offline: cannot download board '{token}'")))
    }
}

impl UserDirectory for Offline {
    fn lookup_user(&self, _user_id: &str, _id_type: UserIdType) -> Result<Option<UserInfo>> {
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_user_ids() {
        assert_eq!(UserIdType::classify("ou_abc"), UserIdType::OpenId);
        assert_eq!(UserIdType::classify("on_abc"), UserIdType::UnionId);
        assert_eq!(UserIdType::classify("7f3e21"), UserIdType::UserId);
        assert_eq!(UserIdType::classify("OU_upper"), UserIdType::UserId);
        assert_eq!(UserIdType::OpenId.to_string(), "open_id");
    }

    #[test]
    fn test_display_name_preference() {
        let both = UserInfo {
            name: Some("张三".into()),
            en_name: Some("Zhang San".into()),
        };
        let english_only = UserInfo {
            name: Some(String::new()),
            en_name: Some("Zhang San".into()),
        };

        assert_eq!(both.display_name(), Some("张三"));
        assert_eq!(english_only.display_name(), Some("Zhang San"));
        assert_eq!(UserInfo::default().display_name(), None);
    }

    #[test]
    fn test_file_source_reads_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocks.json");
        fs::write(
            &path,
            r#"{"items": [{"block_id": "doc", "block_type": 1, "children": []}]}"#,
        )
        .unwrap();

        let blocks = FileDocumentSource::new(&path).fetch_blocks("ignored").unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].id, "doc");
    }

    #[test]
    fn test_file_source_missing_file() {
        let err = FileDocumentSource::new("/nonexistent/blocks.json")
            .fetch_blocks("doc")
            .unwrap_err();
        assert_eq!(err.category(), "not_found");
    }

    #[test]
    fn test_offline_fetchers_fail_softly() {
        let dest = Path::new("/tmp/never-written");
        assert!(Offline.fetch_media("tok", "doc", dest).is_err());
        assert!(Offline.fetch_board("tok", dest).is_err());
        assert_eq!(Offline.lookup_user("ou_1", UserIdType::OpenId).unwrap(), None);
        assert!(Offline.fetch_blocks("doc").unwrap().is_empty());
    }
}
