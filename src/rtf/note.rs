//! Footnotes and endnotes.
//!
//! A `{\footnote ...}` group is content written at its point of reference.
//! The interpreter redirects output into a fresh body while the group is
//! walked, then wraps the result in a note node. Whether the note is a
//! footnote or an endnote depends on the document's `\fetN` setting:
//!
//! - `\fet0`: footnotes only
//! - `\fet1`: endnotes only
//! - `\fet2`: both; `\ftnalt` in the group marks an endnote

use super::formatting::CharState;
use super::lexer::{Group, Token};
use super::paragraph::ParagraphState;
use super::parser::Interpreter;
use super::raw::concat_raw;
use crate::document::{ContentNode, NodeKind, NoteType};

impl Interpreter<'_> {
    /// Walk a footnote group into a note node.
    pub(super) fn on_footnote(&mut self, group: &Group<'_>, fmt: &CharState) {
        if self.options.ignore_notes {
            return;
        }

        // Text before the reference is a paragraph of its own.
        self.finalize_paragraph();
        let level = self.paragraph_table_level();

        let note_type = self.note_type(group);
        let id = match note_type {
            NoteType::Footnote => {
                self.footnote_count += 1;
                format!("footnote{}", self.footnote_count)
            },
            NoteType::Endnote => {
                self.endnote_count += 1;
                format!("endnote{}", self.endnote_count)
            },
        };

        let saved_content = std::mem::take(&mut self.content);
        let saved_para = std::mem::replace(&mut self.para, ParagraphState::default());
        let saved_tables = std::mem::take(&mut self.tables);
        let saved_link = self.link.take();

        self.walk_group(group, fmt.clone());
        self.finalize_paragraph();
        self.close_tables();

        let children = std::mem::replace(&mut self.content, saved_content);
        self.para = saved_para;
        self.tables = saved_tables;
        self.link = saved_link;

        let raw = if self.options.include_raw_content {
            concat_raw(&children)
        } else {
            None
        };
        let note =
            ContentNode::container(NodeKind::Note { note_type, id }, children).with_raw_content(raw);

        if self.options.put_notes_at_last {
            self.notes.push(note);
        } else {
            self.place_block(note, level);
        }
    }

    fn note_type(&self, group: &Group<'_>) -> NoteType {
        let alternate = group
            .children
            .iter()
            .any(|t| matches!(t, Token::Control(cw) if cw.name == "ftnalt"));
        match self.note_placement {
            1 => NoteType::Endnote,
            2 if alternate => NoteType::Endnote,
            _ => NoteType::Footnote,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::document::{NodeKind, NoteType, ParseOptions};
    use crate::rtf::RtfDocument;

    fn note_kinds(input: &str) -> Vec<NodeKind> {
        let document = RtfDocument::parse(input).unwrap();
        document
            .document()
            .notes()
            .map(|n| n.kind().clone())
            .collect()
    }

    #[test]
    fn test_mixed_placement_uses_ftnalt() {
        let kinds = note_kinds(r"{\rtf1\fet2 A{\footnote one}B{\footnote\ftnalt two}\par}");
        assert_eq!(
            kinds,
            [
                NodeKind::Note {
                    note_type: NoteType::Footnote,
                    id: "footnote1".to_string()
                },
                NodeKind::Note {
                    note_type: NoteType::Endnote,
                    id: "endnote1".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_endnotes_only() {
        let kinds = note_kinds(r"{\rtf1\fet1 A{\footnote one}\par}");
        assert!(matches!(
            kinds[0],
            NodeKind::Note {
                note_type: NoteType::Endnote,
                ..
            }
        ));
    }

    #[test]
    fn test_ignored_notes_leave_no_trace() {
        let options = ParseOptions::new().with_ignore_notes(true);
        let document =
            RtfDocument::from_bytes_with_options(br"{\rtf1 A{\footnote B}C\par}", &options)
                .unwrap();
        assert_eq!(document.document().notes().count(), 0);
        assert_eq!(document.to_text(), "AC");
    }

    #[test]
    fn test_note_formatting_is_scoped() {
        let document = RtfDocument::parse(r"{\rtf1 A{\footnote\b B}C\par}").unwrap();
        let content = document.document().content();
        let last = content.last().unwrap();
        assert_eq!(last.text(), "C");
        assert!(last.children()[0].formatting().is_none());
    }
}
