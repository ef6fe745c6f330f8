//! Post-processing that turns interpreter output into a [`Document`].

use super::attachment::Attachment;
use super::node::ContentNode;
use super::ocr::{OcrEngine, recognize_attachments};
use super::options::ParseOptions;
use super::Document;

/// Output of a format engine before assembly.
#[derive(Debug, Default)]
pub(crate) struct EngineOutput {
    /// Main content sequence, with notes interleaved at their reference
    /// unless they were routed to `notes`
    pub content: Vec<ContentNode>,
    /// Notes collected for placement after the main content
    pub notes: Vec<ContentNode>,
    /// Extracted attachments in document order
    pub attachments: Vec<Attachment>,
}

/// Build the document: relocate notes and refresh their flattened text.
pub(crate) fn assemble(output: EngineOutput, options: &ParseOptions) -> Document {
    let EngineOutput {
        mut content,
        mut notes,
        attachments,
    } = output;

    // The notes sink is only filled when relocation was requested.
    content.append(&mut notes);
    for node in content.iter_mut() {
        node.refresh_text();
    }

    Document {
        content,
        attachments,
        delimiter: options.newline_delimiter.clone(),
    }
}

/// Assemble, then run OCR over the image attachments when requested.
pub(crate) async fn assemble_with_ocr<E: OcrEngine + ?Sized>(
    output: EngineOutput,
    options: &ParseOptions,
    engine: &E,
) -> Document {
    let mut document = assemble(output, options);
    if options.ocr {
        recognize_attachments(&mut document.attachments, engine, &options.ocr_language).await;
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{NodeKind, NoteType};

    fn paragraph(text: &str) -> ContentNode {
        ContentNode::container(
            NodeKind::Paragraph { alignment: None },
            vec![ContentNode::text_run(text, None, None)],
        )
    }

    fn note(text: &str) -> ContentNode {
        ContentNode::container(
            NodeKind::Note {
                note_type: NoteType::Footnote,
                id: "footnote1".to_string(),
            },
            vec![paragraph(text)],
        )
    }

    #[test]
    fn test_notes_move_to_end() {
        let output = EngineOutput {
            content: vec![paragraph("A"), paragraph("C")],
            notes: vec![note("B")],
            attachments: Vec::new(),
        };
        let options = ParseOptions::new().with_put_notes_at_last(true);
        let document = assemble(output, &options);
        let kinds: Vec<_> = document.content().iter().map(|n| n.type_name()).collect();
        assert_eq!(kinds, ["paragraph", "paragraph", "note"]);
        assert_eq!(document.content()[2].text(), "B");
        assert_eq!(document.to_text(), "A\nC\nB");
    }
}
