//! Table layout.
//!
//! A table arrives as flat row-major cell ids plus a parallel list of merge
//! spans. Tables without merges become grid tables; any merge turns the whole
//! table into HTML so spans survive.

use crate::model::{MergeSpan, TableSpec};
use tracing::{debug, warn};

/// One fragment of a cell's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellPart {
    /// Rendered text; HTML-escaped when the table is emitted as HTML.
    Text(String),
    /// Ready-made markup such as an `<img>` tag, emitted verbatim.
    Markup(String),
}

/// A cell anchored at a grid position together with the area it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement<'a> {
    /// Anchor row.
    pub row: usize,
    /// Anchor column.
    pub col: usize,
    /// Rows covered after clipping.
    pub row_span: usize,
    /// Columns covered after clipping.
    pub col_span: usize,
    /// Cell block id; `None` for positions the listing left empty.
    pub cell: Option<&'a str>,
}

/// R×C matrix view over a [`TableSpec`].
#[derive(Debug)]
pub struct TableLayout<'a> {
    rows: usize,
    columns: usize,
    cells: &'a [String],
    merges: &'a [MergeSpan],
}

impl<'a> TableLayout<'a> {
    /// Lay out `spec`.
    ///
    /// A zero row count is derived from the cell count. Declared dimensions
    /// never exceed what the cell list can fill, so the grid stays
    /// proportional to the listing.
    pub fn new(spec: &'a TableSpec) -> Self {
        let available = spec.cells.len();
        let mut columns = spec.columns;
        if columns > available {
            warn!(declared = columns, cells = available, "table wider than its cell list");
            columns = available;
        }
        let mut rows = if columns == 0 {
            0
        } else {
            let filled = available.div_ceil(columns);
            if spec.rows == 0 {
                filled
            } else {
                if spec.rows > filled {
                    warn!(declared = spec.rows, filled, "table taller than its cell list");
                }
                spec.rows.min(filled)
            }
        };
        if rows.checked_mul(columns).is_none() {
            warn!(rows, columns, "table dimensions overflow, rendering empty");
            rows = 0;
        }
        Self {
            rows,
            columns,
            cells: &spec.cells,
            merges: &spec.merges,
        }
    }

    /// Row count.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Column count.
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Whether any cell spans more than one position.
    pub fn is_complex(&self) -> bool {
        self.merges.iter().any(|span| span.is_merged())
    }

    fn cell_at(&self, row: usize, col: usize) -> Option<&'a str> {
        self.cells
            .get(row * self.columns + col)
            .map(String::as_str)
    }

    fn span_at(&self, row: usize, col: usize) -> MergeSpan {
        self.merges
            .get(row * self.columns + col)
            .copied()
            .map(|s| MergeSpan::new(s.row_span, s.col_span))
            .unwrap_or_default()
    }

    /// Anchored cells in row-major order such that every grid position is
    /// covered by exactly one placement.
    ///
    /// Spans are clipped to the table bounds and stop short of positions an
    /// earlier placement already covers.
    pub fn placements(&self) -> Vec<Placement<'a>> {
        let mut covered = vec![false; self.rows * self.columns];
        let mut out = Vec::new();

        for row in 0..self.rows {
            for col in 0..self.columns {
                if covered[row * self.columns + col] {
                    continue;
                }
                let span = self.span_at(row, col);

                let mut col_span = 1;
                while col_span < span.col_span
                    && col + col_span < self.columns
                    && !covered[row * self.columns + col + col_span]
                {
                    col_span += 1;
                }

                let mut row_span = 1;
                while row_span < span.row_span
                    && row + row_span < self.rows
                    && (col..col + col_span)
                        .all(|c| !covered[(row + row_span) * self.columns + c])
                {
                    row_span += 1;
                }

                for r in row..row + row_span {
                    for c in col..col + col_span {
                        covered[r * self.columns + c] = true;
                    }
                }

                out.push(Placement {
                    row,
                    col,
                    row_span,
                    col_span,
                    cell: self.cell_at(row, col),
                });
            }
        }
        out
    }

    /// Render the table to lines, asking `cell_parts` for the content of each
    /// cell id.
    pub fn render<F>(&self, mut cell_parts: F) -> Vec<String>
    where
        F: FnMut(&str) -> Vec<CellPart>,
    {
        if self.rows == 0 || self.columns == 0 {
            debug!(rows = self.rows, columns = self.columns, "empty table");
            return Vec::new();
        }
        if self.is_complex() {
            self.render_html(&mut cell_parts)
        } else {
            self.render_grid(&mut cell_parts)
        }
    }

    fn render_grid<F>(&self, cell_parts: &mut F) -> Vec<String>
    where
        F: FnMut(&str) -> Vec<CellPart>,
    {
        let mut lines = Vec::with_capacity(self.rows + 1);
        for row in 0..self.rows {
            let texts: Vec<String> = (0..self.columns)
                .map(|col| {
                    self.cell_at(row, col)
                        .map(|id| grid_cell_text(&cell_parts(id)))
                        .unwrap_or_default()
                })
                .collect();
            lines.push(format!("| {} |", texts.join(" | ")));
            if row == 0 {
                lines.push(format!("|{}", " --- |".repeat(self.columns)));
            }
        }
        lines
    }

    fn render_html<F>(&self, cell_parts: &mut F) -> Vec<String>
    where
        F: FnMut(&str) -> Vec<CellPart>,
    {
        let placements = self.placements();
        let mut lines = vec!["<table>".to_string()];
        let mut next = placements.iter().peekable();

        for row in 0..self.rows {
            lines.push("  <tr>".to_string());
            while let Some(p) = next.next_if(|p| p.row == row) {
                let mut attrs = String::new();
                if p.row_span > 1 {
                    attrs.push_str(&format!(" rowspan=\"{}\"", p.row_span));
                }
                if p.col_span > 1 {
                    attrs.push_str(&format!(" colspan=\"{}\"", p.col_span));
                }
                let text = p
                    .cell
                    .map(|id| html_cell_text(&cell_parts(id)))
                    .unwrap_or_default();
                lines.push(format!("    <td{attrs}>{text}</td>"));
            }
            lines.push("  </tr>".to_string());
        }
        lines.push("</table>".to_string());
        lines
    }
}

fn grid_cell_text(parts: &[CellPart]) -> String {
    let joined = parts
        .iter()
        .map(|part| match part {
            CellPart::Text(s) | CellPart::Markup(s) => s.as_str(),
        })
        .collect::<Vec<_>>()
        .join("\n");
    joined.replace('|', "\\|").replace('\n', "<br>")
}

fn html_cell_text(parts: &[CellPart]) -> String {
    parts
        .iter()
        .map(|part| match part {
            CellPart::Text(s) => html_escape::encode_text(s).into_owned(),
            CellPart::Markup(s) => s.clone(),
        })
        .collect::<Vec<_>>()
        .join("<br>")
}
