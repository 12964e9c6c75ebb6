//! Wire records for block listings.
//!
//! The document service returns `{"items": [...]}` where each item carries a
//! numeric `block_type` and a payload under a per-kind key (`text`,
//! `heading3`, `bullet`, `table`, ...). Records are decoded one at a time so a
//! single malformed block or inline element is skipped instead of failing the
//! whole listing.

use super::{Block, BlockKind, Inline, MergeSpan, TableSpec, TextRun, TextStyle};
use crate::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

const PAGE: u32 = 1;
const TEXT: u32 = 2;
const HEADING1: u32 = 3;
const HEADING9: u32 = 11;
const BULLET: u32 = 12;
const ORDERED: u32 = 13;
const CODE: u32 = 14;
const QUOTE: u32 = 15;
const TODO: u32 = 17;
const CALLOUT: u32 = 19;
const DIAGRAM: u32 = 21;
const DIVIDER: u32 = 22;
const GRID: u32 = 24;
const GRID_COLUMN: u32 = 25;
const IMAGE: u32 = 27;
const TABLE: u32 = 31;
const TABLE_CELL: u32 = 32;
const QUOTE_CONTAINER: u32 = 34;
const BOARD: u32 = 43;

/// A block record as delivered by the document service.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBlock {
    /// Block id.
    pub block_id: String,
    /// Numeric kind discriminator.
    pub block_type: u32,
    /// Parent id; empty or absent for the root.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Ordered child ids.
    #[serde(default)]
    pub children: Vec<String>,
    /// Per-kind payloads keyed by kind name.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTextBody {
    #[serde(default)]
    elements: Vec<Value>,
    #[serde(default)]
    style: RawBodyStyle,
}

#[derive(Debug, Default, Deserialize)]
struct RawBodyStyle {
    #[serde(default)]
    language: Option<u32>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    sequence: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawToken {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTable {
    #[serde(default)]
    cells: Vec<String>,
    #[serde(default)]
    property: RawTableProperty,
}

#[derive(Debug, Default, Deserialize)]
struct RawTableProperty {
    #[serde(default)]
    row_size: usize,
    #[serde(default)]
    column_size: usize,
    #[serde(default)]
    merge_info: Vec<RawMergeInfo>,
}

#[derive(Debug, Deserialize)]
struct RawMergeInfo {
    #[serde(default = "one")]
    row_span: usize,
    #[serde(default = "one")]
    col_span: usize,
}

const fn one() -> usize {
    1
}

#[derive(Debug, Default, Deserialize)]
struct RawElement {
    #[serde(default)]
    text_run: Option<RawTextRun>,
    #[serde(default)]
    mention_user: Option<RawMentionUser>,
    #[serde(default)]
    mention_doc: Option<RawMentionDoc>,
    #[serde(default)]
    equation: Option<RawEquation>,
    #[serde(default)]
    file: Option<RawFile>,
    #[serde(default)]
    inline_block: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTextRun {
    #[serde(default)]
    content: String,
    #[serde(default)]
    text_element_style: RawTextElementStyle,
}

#[derive(Debug, Default, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
struct RawTextElementStyle {
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    italic: bool,
    #[serde(default)]
    underline: bool,
    #[serde(default)]
    strikethrough: bool,
    #[serde(default)]
    inline_code: bool,
    #[serde(default)]
    link: Option<RawLink>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLink {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawMentionUser {
    #[serde(default)]
    user_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawMentionDoc {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEquation {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawFile {
    #[serde(default)]
    file_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing {
    Wrapped { items: Vec<Value> },
    Bare(Vec<Value>),
}

/// Parse a block listing (`{"items": [...]}` or a bare array) into blocks.
///
/// Items that are not valid block records are logged and skipped.
pub fn parse_block_listing(json: &str) -> Result<Vec<Block>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }

    let listing: Listing = serde_json::from_str(json)
        .map_err(|e| Error::Parse(format!("invalid block listing: {e}")))?;
    let items = match listing {
        Listing::Wrapped { items } | Listing::Bare(items) => items,
    };

    let blocks = items
        .into_iter()
        .enumerate()
        .filter_map(|(position, item)| match serde_json::from_value::<RawBlock>(item) {
            Ok(raw) => Some(raw.into_block()),
            Err(e) => {
                warn!(position, error = %e, "skipping malformed block record");
                None
            },
        })
        .collect();
    Ok(blocks)
}

impl RawBlock {
    /// Convert into the typed model.
    pub fn into_block(self) -> Block {
        let kind = self.kind();
        Block {
            parent: self.parent_id.filter(|p| !p.is_empty()),
            id: self.block_id,
            children: self.children,
            kind,
        }
    }

    fn kind(&self) -> BlockKind {
        match self.block_type {
            PAGE => BlockKind::Page {
                title: self.elements("page"),
            },
            TEXT => BlockKind::Text(self.elements("text")),
            HEADING1..=HEADING9 => {
                #[allow(clippy::cast_possible_truncation)]
                let level = (self.block_type - HEADING1 + 1) as u8;
                BlockKind::Heading {
                    level,
                    elements: self.elements(&format!("heading{level}")),
                }
            },
            BULLET => BlockKind::Bullet(self.elements("bullet")),
            ORDERED => {
                let body: RawTextBody = self.payload("ordered");
                BlockKind::Ordered {
                    sequence: body.style.sequence.as_ref().and_then(sequence_text),
                    elements: convert_elements(body.elements),
                }
            },
            CODE => {
                let body: RawTextBody = self.payload("code");
                BlockKind::Code {
                    language: body.style.language,
                    elements: convert_elements(body.elements),
                }
            },
            QUOTE => BlockKind::Quote(self.elements("quote")),
            TODO => {
                let body: RawTextBody = self.payload("todo");
                BlockKind::Todo {
                    done: body.style.done,
                    elements: convert_elements(body.elements),
                }
            },
            CALLOUT => BlockKind::Callout,
            DIVIDER => BlockKind::Divider,
            IMAGE => BlockKind::Image {
                token: self.token("image"),
            },
            BOARD => BlockKind::Board {
                token: self.token("board"),
            },
            DIAGRAM => BlockKind::Diagram {
                token: self.token("diagram"),
            },
            TABLE => {
                let table: RawTable = self.payload("table");
                BlockKind::Table(TableSpec {
                    rows: table.property.row_size,
                    columns: table.property.column_size,
                    cells: table.cells,
                    merges: table
                        .property
                        .merge_info
                        .into_iter()
                        .map(|m| MergeSpan::new(m.row_span, m.col_span))
                        .collect(),
                })
            },
            TABLE_CELL => BlockKind::TableCell,
            GRID | GRID_COLUMN | QUOTE_CONTAINER => BlockKind::Container,
            other => BlockKind::Unsupported(other),
        }
    }

    fn payload<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(value) = self.payload.get(key) else {
            return T::default();
        };
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!(block_id = %self.block_id, key, error = %e, "malformed block payload");
            T::default()
        })
    }

    fn elements(&self, key: &str) -> Vec<Inline> {
        convert_elements(self.payload::<RawTextBody>(key).elements)
    }

    fn token(&self, key: &str) -> Option<String> {
        self.payload::<RawToken>(key).token.filter(|t| !t.is_empty())
    }
}

fn sequence_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn convert_elements(values: Vec<Value>) -> Vec<Inline> {
    values.into_iter().filter_map(convert_element).collect()
}

fn convert_element(value: Value) -> Option<Inline> {
    let raw: RawElement = serde_json::from_value(value).ok()?;

    if let Some(run) = raw.text_run {
        let style = run.text_element_style;
        return Some(Inline::Text(TextRun {
            content: run.content,
            style: TextStyle {
                bold: style.bold,
                italic: style.italic,
                underline: style.underline,
                strikethrough: style.strikethrough,
                inline_code: style.inline_code,
                link: style.link.map(|l| l.url).filter(|u| !u.is_empty()),
            },
        }));
    }
    if let Some(mention) = raw.mention_user {
        return Some(Inline::MentionUser {
            user_id: mention.user_id,
        });
    }
    if let Some(doc) = raw.mention_doc {
        return Some(Inline::MentionDoc {
            title: doc
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "doc".to_string()),
            url: doc.url.filter(|u| !u.is_empty()),
        });
    }
    if let Some(eq) = raw.equation {
        return Some(Inline::Equation(eq.content));
    }
    if let Some(file) = raw.file {
        return Some(Inline::File {
            token: file.file_token.filter(|t| !t.is_empty()),
        });
    }
    if raw.inline_block.is_some() {
        return Some(Inline::InlineBlock);
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn parse_one(json: &str) -> Block {
        let blocks = parse_block_listing(&format!("[{json}]")).unwrap();
        assert_eq!(blocks.len(), 1);
        blocks.into_iter().next().unwrap()
    }

    #[test]
    fn test_parse_wrapped_listing() {
        let json = r#"{"items": [
            {"block_id": "doc", "block_type": 1, "parent_id": "", "children": ["t1"],
             "page": {"elements": [{"text_run": {"content": "Title"}}]}},
            {"block_id": "t1", "block_type": 2, "parent_id": "doc",
             "text": {"elements": [{"text_run": {"content": "hello"}}]}}
        ]}"#;

        let blocks = parse_block_listing(json).unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].parent, None);
        assert_eq!(blocks[0].children, vec!["t1".to_string()]);
        assert_eq!(
            blocks[0].kind,
            BlockKind::Page {
                title: vec![Inline::text("Title")]
            }
        );
        assert_eq!(blocks[1].parent.as_deref(), Some("doc"));
    }

    #[test]
    fn test_empty_output_is_empty_listing() {
        assert!(parse_block_listing("").unwrap().is_empty());
        assert!(parse_block_listing("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_listing_is_parse_error() {
        let err = parse_block_listing("{\"items\": 3}").unwrap_err();
        assert_eq!(err.category(), "parse");
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let json = r#"[
            {"block_type": 2},
            {"block_id": "ok", "block_type": 22}
        ]"#;

        let blocks = parse_block_listing(json).unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Divider);
    }

    #[test]
    fn test_heading_levels_use_matching_payload_key() {
        let block = parse_one(
            r#"{"block_id": "h", "block_type": 5,
                "heading3": {"elements": [{"text_run": {"content": "Three"}}]}}"#,
        );

        assert_eq!(
            block.kind,
            BlockKind::Heading {
                level: 3,
                elements: vec![Inline::text("Three")]
            }
        );
    }

    #[test]
    fn test_text_style_and_link() {
        let block = parse_one(
            r#"{"block_id": "t", "block_type": 2, "text": {"elements": [
                {"text_run": {"content": "x", "text_element_style":
                    {"bold": true, "inline_code": true, "link": {"url": "https%3A%2F%2Fa.b"}}}}
            ]}}"#,
        );

        let BlockKind::Text(elements) = block.kind else {
            panic!("expected text block");
        };
        let Inline::Text(run) = &elements[0] else {
            panic!("expected text run");
        };
        assert!(run.style.bold);
        assert!(run.style.inline_code);
        assert!(!run.style.italic);
        assert_eq!(run.style.link.as_deref(), Some("https%3A%2F%2Fa.b"));
    }

    #[test]
    fn test_inline_variants() {
        let block = parse_one(
            r#"{"block_id": "t", "block_type": 2, "text": {"elements": [
                {"mention_user": {"user_id": "ou_1"}},
                {"mention_doc": {"title": "", "url": "https://x"}},
                {"equation": {"content": "a^2"}},
                {"file": {"file_token": "boxcn"}},
                {"inline_block": {"block_id": "zzz"}},
                {"reminder": {"expire_time": "1"}},
                {"text_run": "not an object"}
            ]}}"#,
        );

        let BlockKind::Text(elements) = block.kind else {
            panic!("expected text block");
        };
        assert_eq!(
            elements,
            vec![
                Inline::MentionUser {
                    user_id: "ou_1".into()
                },
                Inline::MentionDoc {
                    title: "doc".into(),
                    url: Some("https://x".into())
                },
                Inline::Equation("a^2".into()),
                Inline::File {
                    token: Some("boxcn".into())
                },
                Inline::InlineBlock,
            ]
        );
    }

    #[test]
    fn test_ordered_todo_code_payloads() {
        let ordered = parse_one(
            r#"{"block_id": "o", "block_type": 13,
                "ordered": {"elements": [], "style": {"sequence": "3"}}}"#,
        );
        let todo = parse_one(
            r#"{"block_id": "d", "block_type": 17,
                "todo": {"elements": [], "style": {"done": true}}}"#,
        );
        let code = parse_one(
            r#"{"block_id": "c", "block_type": 14,
                "code": {"elements": [], "style": {"language": 53}}}"#,
        );

        assert!(matches!(
            ordered.kind,
            BlockKind::Ordered { sequence: Some(ref s), .. } if s == "3"
        ));
        assert!(matches!(todo.kind, BlockKind::Todo { done: true, .. }));
        assert!(matches!(
            code.kind,
            BlockKind::Code {
                language: Some(53),
                ..
            }
        ));
    }

    #[test]
    fn test_table_payload() {
        let block = parse_one(
            r#"{"block_id": "tbl", "block_type": 31, "table": {
                "cells": ["c1", "c2", "c3", "c4"],
                "property": {"row_size": 2, "column_size": 2,
                    "merge_info": [{"row_span": 2, "col_span": 1}, {"row_span": 0, "col_span": 1}]}
            }}"#,
        );

        let BlockKind::Table(spec) = block.kind else {
            panic!("expected table");
        };
        assert_eq!(spec.rows, 2);
        assert_eq!(spec.columns, 2);
        assert_eq!(spec.cells.len(), 4);
        assert_eq!(spec.merges[0], MergeSpan::new(2, 1));
        assert_eq!(spec.merges[1], MergeSpan::default());
    }

    #[test]
    fn test_media_and_container_kinds() {
        assert_eq!(
            parse_one(r#"{"block_id": "i", "block_type": 27, "image": {"token": "img1"}}"#).kind,
            BlockKind::Image {
                token: Some("img1".into())
            }
        );
        assert_eq!(
            parse_one(r#"{"block_id": "b", "block_type": 43, "board": {"token": ""}}"#).kind,
            BlockKind::Board { token: None }
        );
        assert_eq!(
            parse_one(r#"{"block_id": "g", "block_type": 24}"#).kind,
            BlockKind::Container
        );
        assert_eq!(
            parse_one(r#"{"block_id": "u", "block_type": 999}"#).kind,
            BlockKind::Unsupported(999)
        );
    }

    #[test]
    fn test_malformed_payload_falls_back_to_empty() {
        let block = parse_one(r#"{"block_id": "t", "block_type": 2, "text": "oops"}"#);
        assert_eq!(block.kind, BlockKind::Text(Vec::new()));
    }
}
