//! Paragraph accumulation.
//!
//! Text arrives piecewise from the token walk. [`ParagraphState`] merges it
//! into runs (a new run starts whenever the formatting or link changes) and
//! carries the paragraph properties set by control words until the
//! paragraph is finalized into a block node.

use super::list::ListRegistry;
use crate::document::{
    Alignment, ContentNode, Formatting, Link, ListItem, ListType, NodeKind, ParseOptions,
};
use std::rc::Rc;

/// State of the paragraph being built.
#[derive(Debug, Default)]
pub(crate) struct ParagraphState {
    /// Finished inline nodes
    runs: Vec<ContentNode>,
    run_text: String,
    run_formatting: Option<Formatting>,
    run_link: Option<Link>,

    pub alignment: Option<Alignment>,
    /// Left indent in twips (`\li`)
    pub left_indent: i32,
    /// Explicit list level (`\ilvl`, `\pnlvlN`)
    pub list_level: Option<u32>,
    pub is_list_item: bool,
    pub list_id: Option<String>,
    /// Type forced by a resolved `\ls` or a numbering word
    pub list_type: Option<ListType>,
    /// Type inferred from a number format code
    pub suggested_type: Option<ListType>,
    /// Type of a `\listtext` / `\pntext` marker; survives `\pard`
    pub marker: Option<ListType>,
    pub heading: Option<u8>,
    pub in_table: bool,
    /// Table nesting level (`\itapN`)
    pub nest_level: Option<u32>,
    /// Paragraph background (`\cbpat`)
    pub background: Option<Rc<str>>,
    /// Echoed source of the paragraph
    pub raw: String,
}

impl ParagraphState {
    /// Append text to the current run, starting a new run when the
    /// formatting or link differs from the current one.
    pub fn push_text(&mut self, text: &str, formatting: Option<Formatting>, link: Option<&Link>) {
        if !self.run_text.is_empty()
            && (self.run_formatting != formatting || self.run_link.as_ref() != link)
        {
            self.flush_run();
        }
        if self.run_text.is_empty() {
            self.run_formatting = formatting;
            self.run_link = link.cloned();
        }
        self.run_text.push_str(text);
    }

    /// Append an inline node (image) after the pending run.
    pub fn push_inline(&mut self, node: ContentNode) {
        self.flush_run();
        self.runs.push(node);
    }

    fn flush_run(&mut self) {
        if self.run_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.run_text);
        self.runs.push(ContentNode::text_run(
            text,
            self.run_formatting.take(),
            self.run_link.take(),
        ));
    }

    /// Whether any text or inline node has been collected.
    #[inline]
    pub fn has_content(&self) -> bool {
        !self.runs.is_empty() || !self.run_text.is_empty()
    }

    /// `\pard`: reset paragraph properties to their defaults.
    ///
    /// A list marker seen before `\pard` still applies to the paragraph.
    pub fn reset_properties(&mut self) {
        self.alignment = None;
        self.left_indent = 0;
        self.list_level = None;
        self.is_list_item = false;
        self.list_id = None;
        self.list_type = None;
        self.suggested_type = None;
        self.heading = None;
        self.in_table = false;
        self.nest_level = None;
        self.background = None;
    }

    /// Mark the paragraph as a list item of a known type.
    #[inline]
    pub fn force_list_type(&mut self, kind: ListType) {
        self.list_type = Some(kind);
    }

    /// Finish the paragraph into a block node.
    ///
    /// Collected content and the per-paragraph heading and list state are
    /// consumed; alignment, indent, table membership and background carry
    /// over to the next paragraph until `\pard`. Returns `None` for a
    /// paragraph with no visible content.
    pub fn take_block(
        &mut self,
        options: &ParseOptions,
        lists: &mut ListRegistry,
    ) -> Option<ContentNode> {
        self.flush_run();
        let runs = std::mem::take(&mut self.runs);
        let raw = std::mem::take(&mut self.raw);
        let heading = self.heading.take();
        let is_list_item = std::mem::take(&mut self.is_list_item);
        let list_id = self.list_id.take();
        let list_type = self.list_type.take();
        let suggested_type = self.suggested_type.take();
        let marker = self.marker.take();
        let list_level = self.list_level.take();

        if !runs.iter().any(is_visible) {
            return None;
        }

        let alignment = self.alignment;
        let kind = if let Some(level) = heading {
            NodeKind::Heading { level, alignment }
        } else if is_list_item || marker.is_some() {
            let last = lists.last().cloned();
            let list_id = list_id
                .or_else(|| last.as_ref().map(|(id, _)| id.clone()))
                .unwrap_or_else(|| lists.synthesize_id());
            let list_type = list_type
                .or(suggested_type)
                .or(marker)
                .or_else(|| {
                    last.filter(|(id, _)| *id == list_id)
                        .map(|(_, kind)| kind)
                })
                .unwrap_or(ListType::Unordered);
            let indentation = list_level.unwrap_or_else(|| {
                (self.left_indent.max(0) as u32)
                    .checked_div(options.indent_step_twips)
                    .unwrap_or(0)
            });
            let item_index = lists.next_item(&list_id, list_type, indentation);
            NodeKind::List(ListItem {
                list_type,
                indentation,
                list_id,
                item_index,
                alignment,
            })
        } else {
            NodeKind::Paragraph { alignment }
        };

        let raw = options.include_raw_content.then_some(raw);
        Some(ContentNode::container(kind, runs).with_raw_content(raw))
    }
}

fn is_visible(node: &ContentNode) -> bool {
    match node.kind() {
        NodeKind::Text { .. } => !node.text().trim().is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> Option<Formatting> {
        Some(Formatting {
            bold: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_runs_split_on_formatting_change() {
        let mut para = ParagraphState::default();
        para.push_text("Hello ", None, None);
        para.push_text("wor", bold(), None);
        para.push_text("ld", bold(), None);
        para.push_text("!", None, None);
        let node = para
            .take_block(&ParseOptions::default(), &mut ListRegistry::default())
            .unwrap();
        let texts: Vec<_> = node.children().iter().map(ContentNode::text).collect();
        assert_eq!(texts, ["Hello ", "world", "!"]);
        assert!(node.children()[1].formatting().unwrap().bold);
        assert_eq!(node.text(), "Hello world!");
    }

    #[test]
    fn test_blank_paragraph_is_dropped() {
        let mut para = ParagraphState::default();
        para.push_text(" \t", None, None);
        assert!(
            para.take_block(&ParseOptions::default(), &mut ListRegistry::default())
                .is_none()
        );
        assert!(!para.has_content());
    }

    #[test]
    fn test_heading_wins_over_list() {
        let mut para = ParagraphState::default();
        para.heading = Some(2);
        para.is_list_item = true;
        para.push_text("Title", None, None);
        let node = para
            .take_block(&ParseOptions::default(), &mut ListRegistry::default())
            .unwrap();
        assert_eq!(
            node.kind(),
            &NodeKind::Heading {
                level: 2,
                alignment: None
            }
        );
    }

    #[test]
    fn test_list_item_falls_back_to_last_list() {
        let options = ParseOptions::default();
        let mut lists = ListRegistry::default();
        let mut para = ParagraphState::default();

        para.marker = Some(ListType::Ordered);
        para.left_indent = 720;
        para.push_text("one", None, None);
        let first = para.take_block(&options, &mut lists).unwrap();

        para.is_list_item = true;
        para.left_indent = 720;
        para.push_text("two", None, None);
        let second = para.take_block(&options, &mut lists).unwrap();

        let (NodeKind::List(a), NodeKind::List(b)) = (first.kind(), second.kind()) else {
            panic!("expected list items");
        };
        assert_eq!(a.list_id, b.list_id);
        assert_eq!(b.list_type, ListType::Ordered);
        assert_eq!((a.indentation, a.item_index), (2, 0));
        assert_eq!((b.indentation, b.item_index), (2, 1));
    }

    #[test]
    fn test_pard_keeps_marker() {
        let mut para = ParagraphState::default();
        para.marker = Some(ListType::Unordered);
        para.in_table = true;
        para.reset_properties();
        assert_eq!(para.marker, Some(ListType::Unordered));
        assert!(!para.in_table);
    }
}
