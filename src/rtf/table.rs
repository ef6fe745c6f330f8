//! RTF table support.
//!
//! RTF tables have no container group: a table is a run of rows, each row
//! a sequence of paragraphs marked `\intbl` and separated by `\cell`, ended
//! by `\row`. Row properties (`\trowd ... \cellxN`) define the cells and
//! their merge flags. A [`TableContext`] accumulates one table; the
//! interpreter keeps one per nesting level on a stack.

use super::raw::concat_raw;
use crate::document::{ContentNode, NodeKind};
use smallvec::SmallVec;

/// Accumulation state of one table.
#[derive(Debug, Default)]
pub(crate) struct TableContext {
    rows: Vec<ContentNode>,
    /// Cells of the row currently open
    cells: Vec<ContentNode>,
    /// Block content of the cell currently open
    cell_content: Vec<ContentNode>,
    row_index: usize,
    next_col: usize,
    /// Whether each defined column is a merge continuation
    column_merges: SmallVec<[bool; 16]>,
    pending_merge: bool,
    row_open: bool,
    include_raw: bool,
}

impl TableContext {
    /// Start a table with its first row open.
    pub fn new(include_raw: bool) -> Self {
        Self {
            row_open: true,
            include_raw,
            ..Self::default()
        }
    }

    /// `\trowd`: start a new row definition.
    pub fn define_row(&mut self) {
        self.column_merges.clear();
        self.pending_merge = false;
        self.row_open = true;
    }

    /// `\clvmrg` / `\clmrg`: the cell being defined continues a merge.
    #[inline]
    pub fn mark_merge_continuation(&mut self) {
        self.pending_merge = true;
    }

    /// `\cellxN`: close one cell definition, capturing its merge flag.
    pub fn define_cell(&mut self) {
        self.column_merges.push(self.pending_merge);
        self.pending_merge = false;
    }

    /// Append a finished block (paragraph, nested table, note) to the open cell.
    pub fn push_block(&mut self, node: ContentNode) {
        self.cell_content.push(node);
        self.row_open = true;
    }

    /// Whether the open cell already holds content.
    #[inline]
    pub fn has_pending_content(&self) -> bool {
        !self.cell_content.is_empty()
    }

    /// Whether a row is open (defined or receiving cells).
    #[inline]
    pub fn is_row_open(&self) -> bool {
        self.row_open
    }

    /// `\cell`: close the open cell and append it to the row.
    ///
    /// Merge continuation cells are dropped; their column is still consumed.
    pub fn end_cell(&mut self) {
        let col = self.next_col;
        self.next_col += 1;
        self.row_open = true;
        let content = std::mem::take(&mut self.cell_content);
        if self.column_merges.get(col).copied().unwrap_or(false) {
            log::debug!("Dropping merged cell at row {}, column {}", self.row_index, col);
            return;
        }
        let raw = self.raw_of(&content);
        let cell = ContentNode::container(
            NodeKind::Cell {
                row: self.row_index,
                col,
            },
            content,
        )
        .with_raw_content(raw);
        self.cells.push(cell);
    }

    /// `\row`: close the open row, flushing a cell with pending content first.
    pub fn end_row(&mut self) {
        if self.has_pending_content() {
            self.end_cell();
        }
        let cells = std::mem::take(&mut self.cells);
        if !cells.is_empty() {
            let raw = self.raw_of(&cells);
            let row = ContentNode::container(
                NodeKind::Row {
                    index: self.row_index,
                },
                cells,
            )
            .with_raw_content(raw);
            self.rows.push(row);
            self.row_index += 1;
        }
        self.next_col = 0;
        self.row_open = false;
    }

    /// Close the table: cell, then row, then table.
    ///
    /// Returns `None` for a table that never received a cell.
    pub fn finish(mut self) -> Option<ContentNode> {
        if self.has_pending_content() || !self.cells.is_empty() {
            self.end_row();
        }
        if self.rows.is_empty() {
            return None;
        }
        let raw = self.raw_of(&self.rows);
        Some(ContentNode::container(NodeKind::Table, self.rows).with_raw_content(raw))
    }

    fn raw_of(&self, children: &[ContentNode]) -> Option<String> {
        if self.include_raw {
            concat_raw(children)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> ContentNode {
        ContentNode::container(
            NodeKind::Paragraph { alignment: None },
            vec![ContentNode::text_run(text, None, None)],
        )
    }

    #[test]
    fn test_two_by_two() {
        let mut table = TableContext::new(false);
        for row in 0..2 {
            table.define_row();
            table.define_cell();
            table.define_cell();
            for col in 0..2 {
                table.push_block(paragraph(&format!("{}{}", row, col)));
                table.end_cell();
            }
            table.end_row();
        }
        let node = table.finish().unwrap();
        assert_eq!(node.children().len(), 2);
        let cell = &node.children()[1].children()[0];
        assert_eq!(cell.kind(), &NodeKind::Cell { row: 1, col: 0 });
        assert_eq!(node.text(), "00011011");
    }

    #[test]
    fn test_merge_continuation_is_dropped() {
        let mut table = TableContext::new(false);
        table.define_row();
        table.define_cell();
        table.mark_merge_continuation();
        table.define_cell();
        table.push_block(paragraph("a"));
        table.end_cell();
        table.end_cell();
        table.end_row();
        let node = table.finish().unwrap();
        assert_eq!(node.children()[0].children().len(), 1);
    }

    #[test]
    fn test_finish_flushes_open_cell() {
        let mut table = TableContext::new(false);
        table.push_block(paragraph("open"));
        let node = table.finish().unwrap();
        assert_eq!(node.text(), "open");
        assert!(TableContext::new(false).finish().is_none());
    }
}
