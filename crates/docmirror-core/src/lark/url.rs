//! Document URL parsing.

use crate::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

const LARK_HOSTS: [&str; 4] = ["feishu.cn", "larksuite.com", "larkoffice.com", "feishu.net"];
const QUERY_KEYS: [&str; 3] = ["doc_id", "docId", "document_id"];
const DOC_SEGMENTS: [&str; 4] = ["docx", "docs", "doc", "wiki"];

fn long_token_regex() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    TOKEN_RE.get_or_init(|| Regex::new(r"[A-Za-z0-9]{20,}").expect("token regex is valid"))
}

fn bare_id_regex() -> &'static Regex {
    static BARE_RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    BARE_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("bare id regex is valid"))
}

/// Whether `input` points at a Lark/Feishu host.
pub fn is_lark_doc_url(input: &str) -> bool {
    let Ok(url) = Url::parse(input.trim()) else {
        return false;
    };
    url.host_str().is_some_and(|host| {
        LARK_HOSTS
            .iter()
            .any(|known| host == *known || host.ends_with(&format!(".{known}")))
    })
}

/// Extract the document id from a document URL or bare id.
///
/// Wiki node tokens are passed to `resolve_wiki`, which returns the token of
/// the wrapped document or `None` when the node cannot be resolved.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] when the input is empty, unparseable or has
/// no recognizable id, and propagates errors from `resolve_wiki`.
pub fn extract_doc_id<F>(input: &str, mut resolve_wiki: F) -> Result<String>
where
    F: FnMut(&str) -> Result<Option<String>>,
{
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidUrl("document URL is required".into()));
    }
    if bare_id_regex().is_match(input) {
        return Ok(input.to_string());
    }

    let url = Url::parse(input).map_err(|e| Error::InvalidUrl(format!("{input}: {e}")))?;

    for key in QUERY_KEYS {
        if let Some((_, value)) = url.query_pairs().find(|(k, _)| k == key) {
            if !value.is_empty() {
                return Ok(value.into_owned());
            }
        }
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    for pair in segments.windows(2) {
        if pair[0] == "wiki" {
            if let Some(resolved) = resolve_wiki(pair[1])?.filter(|t| !t.is_empty()) {
                return Ok(resolved);
            }
        }
    }

    if let Some(pair) = segments
        .windows(2)
        .find(|pair| DOC_SEGMENTS.contains(&pair[0]))
    {
        return Ok(pair[1].to_string());
    }

    if let Some(token) = long_token_regex().find(input) {
        if url.path().contains("/wiki/") {
            if let Some(resolved) = resolve_wiki(token.as_str())?.filter(|t| !t.is_empty()) {
                return Ok(resolved);
            }
        }
        return Ok(token.as_str().to_string());
    }

    Err(Error::InvalidUrl(format!(
        "unable to extract document id from '{input}'"
    )))
}
