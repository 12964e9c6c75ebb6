//! Block tree to Markdown.
//!
//! [`BlockRenderer`] walks a [`Document`] from its root, dispatching on
//! [`BlockKind`]. Each block renders to zero or more lines; siblings at the
//! top level are separated by blank lines except inside runs of list items.

use crate::assets::AssetResolver;
use crate::index::Document;
use crate::inline::compose;
use crate::languages::language_name;
use crate::mention::MentionResolver;
use crate::model::{Block, BlockKind, Inline};
use crate::table::{CellPart, TableLayout};
use crate::Result;
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Default maximum width, in pixels, of images inside tables.
pub const DEFAULT_TABLE_IMAGE_MAX_WIDTH: u32 = 160;

const CALLOUT_LABEL: &str = "> **提示**";
const INDENT: &str = "    ";

/// Per-render state: the mention cache and asset resolver.
pub struct RenderContext<'a> {
    mentions: MentionResolver<'a>,
    assets: AssetResolver<'a>,
    table_image_max_width: u32,
}

impl<'a> RenderContext<'a> {
    /// Context with the default table image width.
    pub fn new(mentions: MentionResolver<'a>, assets: AssetResolver<'a>) -> Self {
        Self {
            mentions,
            assets,
            table_image_max_width: DEFAULT_TABLE_IMAGE_MAX_WIDTH,
        }
    }

    /// Override the maximum width of images inside tables.
    #[must_use]
    pub const fn with_table_image_max_width(mut self, width: u32) -> Self {
        self.table_image_max_width = width;
        self
    }

    /// Number of distinct users resolved so far.
    pub fn mentions_resolved(&self) -> usize {
        self.mentions.cached()
    }
}

/// Result of rendering one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutput {
    /// Markdown text, ending in exactly one newline.
    pub markdown: String,
    /// Trimmed page title; empty when the page has none.
    pub title: String,
}

/// Recursive renderer over one document.
pub struct BlockRenderer<'d, 'c, 'a> {
    doc: &'d Document,
    ctx: &'c mut RenderContext<'a>,
    on_path: Vec<bool>,
}

impl<'d, 'c, 'a> BlockRenderer<'d, 'c, 'a> {
    /// Renderer for `doc` using the caches in `ctx`.
    pub fn new(doc: &'d Document, ctx: &'c mut RenderContext<'a>) -> Self {
        Self {
            doc,
            ctx,
            on_path: vec![false; doc.index().len()],
        }
    }

    /// Page title, trimmed.
    pub fn title(&mut self) -> String {
        let doc = self.doc;
        match &doc.root_block().kind {
            BlockKind::Page { title } => self.text(title).trim().to_string(),
            _ => String::new(),
        }
    }

    /// Render the whole document.
    pub fn render(&mut self) -> RenderOutput {
        let doc = self.doc;
        let root = doc.root();
        let title = self.title();

        let mut lines = Vec::new();
        if !title.is_empty() && !self.first_heading_matches(&title) {
            lines.push(format!("# {title}"));
            lines.push(String::new());
        }

        self.on_path[root] = true;
        lines.extend(self.render_children(root, 0));
        self.on_path[root] = false;

        let mut markdown = lines.join("\n").trim_end().to_string();
        markdown.push('\n');
        RenderOutput { markdown, title }
    }

    fn first_heading_matches(&mut self, title: &str) -> bool {
        let doc = self.doc;
        let Some(&first) = doc.index().children(doc.root()).first() else {
            return false;
        };
        match &doc.index().block(first).kind {
            BlockKind::Heading { elements, .. } => self.text(elements).trim() == title,
            _ => false,
        }
    }

    /// Render the children of `slot` at `level`, inserting separators.
    fn render_children(&mut self, slot: usize, level: usize) -> Vec<String> {
        let doc = self.doc;
        let rendered: Vec<(&Block, Vec<String>)> = doc
            .index()
            .children(slot)
            .iter()
            .filter_map(|&child| {
                let lines = self.render_block(child, level);
                (!lines.is_empty()).then(|| (doc.index().block(child), lines))
            })
            .collect();

        let mut out = Vec::new();
        let mut iter = rendered.into_iter().peekable();
        while let Some((block, lines)) = iter.next() {
            out.extend(lines);
            let Some((next, _)) = iter.peek() else {
                break;
            };
            if level == 0 && !(block.kind.is_list_item() && next.kind.is_list_item()) {
                out.push(String::new());
            }
        }
        out
    }

    /// Render one block and its subtree at list nesting `level`.
    pub fn render_block(&mut self, slot: usize, level: usize) -> Vec<String> {
        let doc = self.doc;
        let block = doc.index().block(slot);
        if self.on_path[slot] {
            warn!(block = %block.id, "cycle in block tree, skipping");
            return Vec::new();
        }
        self.on_path[slot] = true;
        let lines = self.dispatch(slot, block, level);
        self.on_path[slot] = false;
        lines
    }

    fn dispatch(&mut self, slot: usize, block: &'d Block, level: usize) -> Vec<String> {
        match &block.kind {
            BlockKind::Text(elements) => vec![self.text(elements)],
            BlockKind::Heading { level: n, elements } => {
                let hashes = "#".repeat(usize::from(*n));
                vec![format!("{hashes} {}", self.text(elements))]
            },
            BlockKind::Bullet(elements) => {
                let line = format!("{}- {}", INDENT.repeat(level), self.text(elements));
                self.list_item(slot, line, level)
            },
            BlockKind::Ordered { elements, sequence } => {
                let marker = ordinal(sequence.as_deref());
                let line = format!("{}{marker}. {}", INDENT.repeat(level), self.text(elements));
                self.list_item(slot, line, level)
            },
            BlockKind::Todo { elements, done } => {
                let check = if *done { 'x' } else { ' ' };
                let line = format!("{}- [{check}] {}", INDENT.repeat(level), self.text(elements));
                self.list_item(slot, line, level)
            },
            BlockKind::Code { elements, language } => vec![
                format!("```{}", language_name(*language)),
                self.text(elements).trim_end().to_string(),
                "```".to_string(),
            ],
            BlockKind::Quote(elements) => {
                let text = self.text(elements);
                if text.is_empty() {
                    vec!["> ".to_string()]
                } else {
                    text.split('\n').map(|line| format!("> {line}")).collect()
                }
            },
            BlockKind::Callout => self.callout(slot),
            BlockKind::Divider => vec!["---".to_string()],
            BlockKind::Image { token } => self.media_line(token.as_deref(), false),
            BlockKind::Board { token } | BlockKind::Diagram { token } => {
                self.media_line(token.as_deref(), true)
            },
            BlockKind::Table(spec) => {
                TableLayout::new(spec).render(|cell_id| self.cell_parts(cell_id))
            },
            BlockKind::Container => self.render_children(slot, level),
            BlockKind::Page { .. } => {
                debug!(block = %block.id, "nested page block rendered as container");
                self.render_children(slot, level)
            },
            BlockKind::TableCell => Vec::new(),
            BlockKind::Unsupported(block_type) => {
                debug!(block = %block.id, block_type, "unsupported block kind");
                Vec::new()
            },
        }
    }

    fn list_item(&mut self, slot: usize, line: String, level: usize) -> Vec<String> {
        let mut lines = vec![line];
        lines.extend(self.render_children(slot, level + 1));
        lines
    }

    fn callout(&mut self, slot: usize) -> Vec<String> {
        let content = self.render_children(slot, 0);
        let mut iter = content.into_iter();
        let first = match iter.next() {
            Some(first) if !first.is_empty() => format!("{CALLOUT_LABEL} {first}"),
            _ => CALLOUT_LABEL.to_string(),
        };
        std::iter::once(first)
            .chain(iter.map(|line| format!("> {line}")))
            .collect()
    }

    fn media_line(&mut self, token: Option<&str>, board: bool) -> Vec<String> {
        let Some(token) = token else {
            return Vec::new();
        };
        match self.resolve_asset(token, board) {
            Some(path) => vec![format!("![]({path})")],
            None => vec![format!("<!-- image download failed: {token} -->")],
        }
    }

    fn resolve_asset(&mut self, token: &str, board: bool) -> Option<String> {
        if board {
            self.ctx.assets.resolve_board(token)
        } else {
            self.ctx.assets.resolve_image(token)
        }
    }

    #[instrument(level = "debug", skip(self))]
    fn cell_parts(&mut self, cell_id: &str) -> Vec<CellPart> {
        let doc = self.doc;
        let Some(cell) = doc.index().slot(cell_id) else {
            debug!(cell_id, "table cell missing from listing");
            return Vec::new();
        };
        if self.on_path[cell] {
            warn!(cell_id, "cycle through table cell, skipping");
            return Vec::new();
        }
        self.on_path[cell] = true;
        let mut parts = Vec::new();
        for &child in doc.index().children(cell) {
            self.collect_cell_parts(child, &mut parts);
        }
        self.on_path[cell] = false;
        parts
    }

    fn collect_cell_parts(&mut self, slot: usize, parts: &mut Vec<CellPart>) {
        let doc = self.doc;
        let block = doc.index().block(slot);
        if let Some(elements) = block.kind.elements() {
            let text = self.text(elements);
            if !text.is_empty() {
                parts.push(CellPart::Text(text));
            }
            return;
        }

        match &block.kind {
            BlockKind::Image { token: Some(token) } => {
                if let Some(path) = self.resolve_asset(token, false) {
                    parts.push(CellPart::Markup(self.table_image(&path)));
                }
            },
            BlockKind::Board { token: Some(token) } | BlockKind::Diagram { token: Some(token) } => {
                if let Some(path) = self.resolve_asset(token, true) {
                    parts.push(CellPart::Markup(self.table_image(&path)));
                }
            },
            _ => {
                let lines = self.render_block(slot, 0);
                let text = lines.join("\n");
                if !text.trim().is_empty() {
                    parts.push(CellPart::Text(text));
                }
            },
        }
    }

    fn table_image(&self, path: &str) -> String {
        format!(
            "<img src=\"{}\" alt=\"\" style=\"max-width:{}px;height:auto;\">",
            html_escape::encode_double_quoted_attribute(path),
            self.ctx.table_image_max_width
        )
    }

    fn text(&mut self, elements: &[Inline]) -> String {
        compose(elements, &mut self.ctx.mentions)
    }
}

/// Ordered-list marker: a numeric sequence verbatim, otherwise `1`.
fn ordinal(sequence: Option<&str>) -> &str {
    match sequence {
        Some(seq) if !seq.is_empty() && seq.bytes().all(|b| b.is_ascii_digit()) => seq,
        _ => "1",
    }
}

/// Build the document for `doc_id` from `blocks` and render it.
///
/// Fails only when no root can be located.
#[instrument(level = "debug", skip(blocks, ctx), fields(blocks = blocks.len()))]
pub fn render_document(
    doc_id: &str,
    blocks: Vec<Block>,
    ctx: &mut RenderContext<'_>,
) -> Result<RenderOutput> {
    let doc = Document::new(doc_id, blocks)?;
    let output = BlockRenderer::new(&doc, ctx).render();
    debug!(
        title = %output.title,
        bytes = output.markdown.len(),
        users = ctx.mentions_resolved(),
        "rendered document"
    );
    Ok(output)
}
