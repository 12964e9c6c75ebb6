//! Typed document model.
//!
//! A document arrives as a flat list of [`Block`] records linked by string
//! ids. Each block carries exactly one [`BlockKind`] variant holding only the
//! payload that kind needs, so renderers match on the kind instead of probing
//! per-kind fields.
//!
//! [`raw`] holds the serde records for the wire format and their conversion
//! into this model.

pub mod raw;

pub use raw::{RawBlock, parse_block_listing};

/// One node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Unique block id.
    pub id: String,
    /// Parent block id; `None` for the page root. Back-reference only.
    pub parent: Option<String>,
    /// Child ids in rendering order.
    pub children: Vec<String>,
    /// Kind discriminator and kind-specific payload.
    pub kind: BlockKind,
}

impl Block {
    /// Create a block without parent or children.
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    /// Set the parent id.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the ordered child ids.
    #[must_use]
    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }
}

/// Block kinds with their payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// Document root; its elements form the title.
    Page {
        /// Title elements.
        title: Vec<Inline>,
    },
    /// Plain paragraph.
    Text(Vec<Inline>),
    /// Heading of level 1..=9.
    Heading {
        /// Heading level.
        level: u8,
        /// Heading text.
        elements: Vec<Inline>,
    },
    /// Bulleted list item.
    Bullet(Vec<Inline>),
    /// Ordered list item.
    Ordered {
        /// Item text.
        elements: Vec<Inline>,
        /// Explicit ordinal, when the service supplies one (may be `"auto"`).
        sequence: Option<String>,
    },
    /// Fenced code block.
    Code {
        /// Code body.
        elements: Vec<Inline>,
        /// Numeric language id.
        language: Option<u32>,
    },
    /// Block quote.
    Quote(Vec<Inline>),
    /// Checklist item.
    Todo {
        /// Item text.
        elements: Vec<Inline>,
        /// Whether the item is checked.
        done: bool,
    },
    /// Highlighted callout; content lives in children.
    Callout,
    /// Horizontal rule.
    Divider,
    /// Embedded image.
    Image {
        /// Media token.
        token: Option<String>,
    },
    /// Table.
    Table(TableSpec),
    /// Table cell; reachable only through its table.
    TableCell,
    /// Whiteboard, exported as a raster snapshot.
    Board {
        /// Board token.
        token: Option<String>,
    },
    /// Diagram, exported as a raster snapshot.
    Diagram {
        /// Diagram token.
        token: Option<String>,
    },
    /// Grid, grid column and quote container blocks; rendered transparently.
    Container,
    /// Block type this renderer does not know about.
    Unsupported(u32),
}

impl BlockKind {
    /// Whether consecutive blocks of this kind stay adjacent at the top level.
    pub const fn is_list_item(&self) -> bool {
        matches!(self, Self::Bullet(_) | Self::Ordered { .. } | Self::Todo { .. })
    }

    /// Inline elements of text-like kinds.
    pub fn elements(&self) -> Option<&[Inline]> {
        match self {
            Self::Page { title } => Some(title),
            Self::Text(elements)
            | Self::Bullet(elements)
            | Self::Quote(elements)
            | Self::Heading { elements, .. }
            | Self::Ordered { elements, .. }
            | Self::Code { elements, .. }
            | Self::Todo { elements, .. } => Some(elements),
            _ => None,
        }
    }
}

/// Table layout payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSpec {
    /// Row count.
    pub rows: usize,
    /// Column count.
    pub columns: usize,
    /// Cell block ids, row-major.
    pub cells: Vec<String>,
    /// Merge spans parallel to `cells`; missing entries mean 1×1.
    pub merges: Vec<MergeSpan>,
}

/// Rows and columns a cell visually covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSpan {
    /// Rows covered, at least 1.
    pub row_span: usize,
    /// Columns covered, at least 1.
    pub col_span: usize,
}

impl MergeSpan {
    /// Create a span, clamping both dimensions to at least 1.
    pub fn new(row_span: usize, col_span: usize) -> Self {
        Self {
            row_span: row_span.max(1),
            col_span: col_span.max(1),
        }
    }

    /// Whether the span covers more than its own position.
    pub const fn is_merged(self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }
}

impl Default for MergeSpan {
    fn default() -> Self {
        Self {
            row_span: 1,
            col_span: 1,
        }
    }
}

/// Inline element within a text-like block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Styled text run.
    Text(TextRun),
    /// User mention.
    MentionUser {
        /// User id (`ou_`, `on_` or plain user id).
        user_id: String,
    },
    /// Link to another document.
    MentionDoc {
        /// Document title.
        title: String,
        /// Document URL, possibly percent-encoded.
        url: Option<String>,
    },
    /// Inline LaTeX.
    Equation(String),
    /// File attachment reference.
    File {
        /// File token.
        token: Option<String>,
    },
    /// Embedded inline block the renderer cannot represent.
    InlineBlock,
}

impl Inline {
    /// Unstyled text run.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(TextRun {
            content: content.into(),
            style: TextStyle::default(),
        })
    }

    /// Text run with an explicit style.
    pub fn styled(content: impl Into<String>, style: TextStyle) -> Self {
        Self::Text(TextRun {
            content: content.into(),
            style,
        })
    }
}

/// Text content plus style flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRun {
    /// Literal text.
    pub content: String,
    /// Style flags.
    pub style: TextStyle,
}

/// Style flags for a text run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct TextStyle {
    /// `**bold**`.
    pub bold: bool,
    /// `*italic*`.
    pub italic: bool,
    /// `<u>underline</u>`.
    pub underline: bool,
    /// `~~strikethrough~~`.
    pub strikethrough: bool,
    /// `` `inline code` ``.
    pub inline_code: bool,
    /// Link target, possibly percent-encoded.
    pub link: Option<String>,
}
