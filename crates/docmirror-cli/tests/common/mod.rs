#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// A page titled "Notes" with one paragraph and one image.
#[allow(dead_code)]
pub const NOTES_LISTING: &str = r#"{"items": [
    {"block_id": "doxcnNotes", "block_type": 1, "children": ["p1", "img"],
     "page": {"elements": [{"text_run": {"content": "Notes"}}]}},
    {"block_id": "p1", "parent_id": "doxcnNotes", "block_type": 2,
     "text": {"elements": [
        {"text_run": {"content": "see "}},
        {"text_run": {"content": "docs", "text_element_style": {"bold": true}}}
     ]}},
    {"block_id": "img", "parent_id": "doxcnNotes", "block_type": 27,
     "image": {"token": "imgTok"}}
]}"#;

/// Create a configured `docmirror` command isolated from the user's config.
#[allow(dead_code)]
pub fn docmirror_cmd(config_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docmirror"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("DOCMIRROR_CONFIG_DIR", config_dir);
    cmd.env_remove("DOCMIRROR_CONFIG");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Write a block listing into `dir` and return its path.
#[allow(dead_code)]
pub fn write_listing(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).expect("write listing fixture");
    path
}
