//! End-to-end tests of the RTF engine.

use super::RtfDocument;
use crate::common::{Error, Result};
use crate::document::{
    ContentNode, Document, LinkKind, ListItem, ListType, NodeKind, NoteType, OcrEngine,
    ParseOptions,
};
use proptest::prelude::*;

fn parse(input: &str) -> Document {
    RtfDocument::parse(input).unwrap().into_document()
}

fn parse_with(input: &str, options: &ParseOptions) -> Document {
    RtfDocument::from_bytes_with_options(input.as_bytes(), options)
        .unwrap()
        .into_document()
}

fn texts(nodes: &[ContentNode]) -> Vec<&str> {
    nodes.iter().map(ContentNode::text).collect()
}

fn list_item(node: &ContentNode) -> &ListItem {
    match node.kind() {
        NodeKind::List(item) => item,
        other => panic!("expected a list item, got {:?}", other),
    }
}

#[test]
fn test_hello_bold_world() {
    let document = parse(r"{\rtf1 Hello \b world\b0 !\par}");
    assert_eq!(document.content().len(), 1);

    let para = &document.content()[0];
    assert_eq!(para.type_name(), "paragraph");
    assert_eq!(texts(para.children()), ["Hello ", "world", "!"]);
    assert!(para.children()[0].formatting().is_none());
    assert!(para.children()[1].formatting().unwrap().bold);
    assert!(para.children()[2].formatting().is_none());
    assert_eq!(para.text(), "Hello world!");
}

#[test]
fn test_group_scope_isolation() {
    let document = parse(r"{\rtf1 a{\b b{\i c}d}e\par}");
    let runs = document.content()[0].children();
    assert_eq!(texts(runs), ["a", "b", "c", "d", "e"]);
    let bold: Vec<_> = runs
        .iter()
        .map(|r| r.formatting().is_some_and(|f| f.bold))
        .collect();
    assert_eq!(bold, [false, true, true, true, false]);
    assert!(runs[2].formatting().unwrap().italic);
    assert!(!runs[3].formatting().unwrap().italic);
}

#[test]
fn test_par_restores_scope_formatting() {
    let document = parse(r"{\rtf1 \b Bold\par Plain\par}");
    assert!(document.content()[0].children()[0].formatting().unwrap().bold);
    assert!(document.content()[1].children()[0].formatting().is_none());
}

#[test]
fn test_windows_1252_escape() {
    let document = parse(r"{\rtf1 \'93quoted\'94\par}");
    assert_eq!(document.to_text(), "\u{201C}quoted\u{201D}");
}

#[test]
fn test_ansi_code_page() {
    let document = parse(r"{\rtf1\ansi\ansicpg1251 \'cf\'f0\'e8\par}");
    assert_eq!(document.to_text(), "\u{41F}\u{440}\u{438}");
}

#[test]
fn test_quote_words() {
    let document = parse(r"{\rtf1 \ldblquote a\rdblquote  \lquote b\rquote\tab c\line d\par}");
    assert_eq!(
        document.to_text(),
        "\u{201C}a\u{201D} \u{2018}b\u{2019}\tc\nd"
    );
}

#[test]
fn test_footnote_interleaved() {
    let document = parse(r"{\rtf1 A{\footnote B}\par}");
    let content = document.content();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0].type_name(), "paragraph");
    assert_eq!(content[0].text(), "A");
    assert_eq!(
        content[1].kind(),
        &NodeKind::Note {
            note_type: NoteType::Footnote,
            id: "footnote1".to_string()
        }
    );
    assert_eq!(content[1].text(), "B");
    assert_eq!(content[1].children()[0].type_name(), "paragraph");
}

#[test]
fn test_footnote_placement() {
    let input = r"{\rtf1 A{\footnote B}\par C\par}";

    let interleaved = parse(input);
    assert_eq!(texts(interleaved.content()), ["A", "B", "C"]);

    let options = ParseOptions::new().with_put_notes_at_last(true);
    let at_last = parse_with(input, &options);
    assert_eq!(texts(at_last.content()), ["A", "C", "B"]);
    assert!(at_last.content()[2].is_note());
    assert_eq!(at_last.to_text(), "A\nC\nB");
}

#[test]
fn test_two_by_two_table() {
    let document = parse(
        r"{\rtf1\trowd\cellx1000\cellx2000\intbl A\cell B\cell\row\trowd\cellx1000\cellx2000\intbl C\cell D\cell\row\pard After\par}",
    );
    let content = document.content();
    assert_eq!(content.len(), 2);

    let table = &content[0];
    assert_eq!(table.type_name(), "table");
    assert_eq!(table.children().len(), 2);
    let mut positions = Vec::new();
    for (r, row) in table.children().iter().enumerate() {
        assert_eq!(row.kind(), &NodeKind::Row { index: r });
        assert_eq!(row.children().len(), 2);
        for cell in row.children() {
            if let NodeKind::Cell { row, col } = cell.kind() {
                positions.push((*row, *col));
            }
        }
    }
    assert_eq!(positions, [(0, 0), (0, 1), (1, 0), (1, 1)]);
    assert_eq!(table.text(), "ABCD");
    assert_eq!(content[1].text(), "After");
}

#[test]
fn test_merged_cells_are_dropped() {
    let document = parse(
        r"{\rtf1\trowd\cellx1000\clmrg\cellx2000\cellx3000\intbl A\cell\cell C\cell\row}",
    );
    let row = &document.content()[0].children()[0];
    let cells: Vec<_> = row.children().iter().map(|c| c.kind().clone()).collect();
    assert_eq!(
        cells,
        [NodeKind::Cell { row: 0, col: 0 }, NodeKind::Cell { row: 0, col: 2 }]
    );
}

#[test]
fn test_nested_table_by_heuristic() {
    let document = parse(
        r"{\rtf1\trowd\cellx4000\cellx8000\intbl Outer\par\trowd\cellx2000\intbl Inner\cell\row\intbl\cell Right\cell\row\pard\par}",
    );
    let content = document.content();
    assert_eq!(content.len(), 1);

    let outer = &content[0];
    let cells = outer.children()[0].children();
    assert_eq!(cells.len(), 2);
    let first = cells[0].children();
    assert_eq!(first[0].type_name(), "paragraph");
    assert_eq!(first[1].type_name(), "table");
    assert_eq!(first[1].text(), "Inner");
    assert_eq!(cells[1].text(), "Right");
}

#[test]
fn test_nested_table_by_nesting_level() {
    let document = parse(
        r"{\rtf1\pard\intbl\itap1 Outer\par\pard\intbl\itap2 Inner\nestcell{\*\nesttableprops\trowd\cellx1000\nestrow}{\nonesttables\par}\pard\intbl\itap1\cell\trowd\cellx5000\row\pard After\par}",
    );
    let content = document.content();
    assert_eq!(texts(content), ["OuterInner", "After"]);

    let cell = &content[0].children()[0].children()[0];
    assert_eq!(cell.children().len(), 2);
    assert_eq!(cell.children()[1].type_name(), "table");
    assert_eq!(cell.children()[1].text(), "Inner");
}

#[test]
fn test_list_table_numbering() {
    let document = parse(
        r"{\rtf1{\*\listtable{\list\listtemplateid1{\listlevel\levelnfc0}\listid10}}{\*\listoverridetable{\listoverride\listid10\ls1}}\pard\ls1\ilvl0 One\par\pard\ls1\ilvl0 Two\par\pard\ls1\ilvl1 Sub\par\pard\ls1\ilvl0 Three\par}",
    );
    let content = document.content();
    assert_eq!(content.len(), 4);

    let items: Vec<_> = content.iter().map(list_item).collect();
    let indices: Vec<_> = items.iter().map(|i| (i.indentation, i.item_index)).collect();
    assert_eq!(indices, [(0, 0), (0, 1), (1, 0), (0, 2)]);
    assert!(items.iter().all(|i| i.list_type == ListType::Ordered));
    assert!(items.iter().all(|i| i.list_id == items[0].list_id));
}

#[test]
fn test_legacy_markers() {
    let document = parse(
        r"{\rtf1{\listtext \'b7\tab}\pard\li720 First\par{\listtext \'b7\tab}\pard\li720 Second\par\pard{\pntext 1.\tab}Numbered\par}",
    );
    let items: Vec<_> = document.content().iter().map(list_item).collect();
    assert_eq!(items[0].list_type, ListType::Unordered);
    assert_eq!((items[0].indentation, items[0].item_index), (2, 0));
    assert_eq!((items[1].indentation, items[1].item_index), (2, 1));
    assert_eq!(items[0].list_id, items[1].list_id);
    assert_eq!(items[2].list_type, ListType::Ordered);
    assert_eq!(document.content()[0].text(), "First");
}

#[test]
fn test_word95_numbering_group() {
    let document = parse(r"{\rtf1\pard{\*\pn\pnlvlbody\pndec{\pntxta .}}Item\par}");
    let item = list_item(&document.content()[0]);
    assert_eq!(item.list_type, ListType::Ordered);
    assert_eq!(document.to_text(), "Item");
}

#[test]
fn test_hyperlink_field() {
    let document = parse(
        r#"{\rtf1 See {\field{\*\fldinst HYPERLINK "https://example.com"}{\fldrslt example}} now\par}"#,
    );
    let runs = document.content()[0].children();
    assert_eq!(texts(runs), ["See ", "example", " now"]);
    assert!(runs[0].link().is_none());
    let link = runs[1].link().unwrap();
    assert_eq!(link.url, "https://example.com");
    assert_eq!(link.kind, LinkKind::External);
    assert!(runs[2].link().is_none());
}

#[test]
fn test_bookmark_link_is_internal() {
    let document =
        parse(r#"{\rtf1{\field{\*\fldinst HYPERLINK \\l "intro"}{\fldrslt Intro}}\par}"#);
    let link = document.content()[0].children()[0].link().unwrap();
    assert_eq!(link.url, "#intro");
    assert_eq!(link.kind, LinkKind::Internal);
}

#[test]
fn test_picture_extraction() {
    let input = r"{\rtf1 {\pict\pngblip\picw1\pich1\picwgoal1440\pichgoal720\picscalex50 89504e470d0a1a0a}\par}";

    let options = ParseOptions::new().with_extract_attachments(true);
    let document = parse_with(input, &options);
    assert_eq!(document.attachments().len(), 1);
    let attachment = &document.attachments()[0];
    assert_eq!(attachment.name, "image1.png");
    assert_eq!(attachment.mime_type, "image/png");
    assert_eq!(attachment.data[..4], [0x89, 0x50, 0x4E, 0x47]);
    assert_eq!(attachment.width, Some(720));
    assert_eq!(attachment.height, Some(720));
    assert_eq!(attachment.width_pixels(96), Some(48));

    let image = &document.content()[0].children()[0];
    assert_eq!(
        image.kind(),
        &NodeKind::Image {
            attachment_name: "image1.png".to_string(),
            mime_type: "image/png".to_string()
        }
    );
    assert!(document.attachment("image1.png").is_some());

    let skipped = parse(input);
    assert!(skipped.attachments().is_empty());
    assert!(skipped.content().is_empty());
}

#[test]
fn test_shape_picture_wrapper() {
    let options = ParseOptions::new().with_extract_attachments(true);
    let document = parse_with(
        r"{\rtf1{\*\shppict{\pict\jpegblip ffd8ffe0}}{\nonshppict{\pict\wmetafile8 0100}}\par}",
        &options,
    );
    assert_eq!(document.attachments().len(), 1);
    assert_eq!(document.attachments()[0].name, "image1.jpg");
}

#[test]
fn test_bad_picture_is_dropped() {
    let options = ParseOptions::new().with_extract_attachments(true);
    let document = parse_with(r"{\rtf1 x{\pict\pngblip 123}\par}", &options);
    assert!(document.attachments().is_empty());
    assert_eq!(document.to_text(), "x");
}

#[test]
fn test_list_picture_has_no_node() {
    let options = ParseOptions::new().with_extract_attachments(true);
    let document = parse_with(
        r"{\rtf1{\*\listtable{\*\listpicture{\pict\pngblip 89504e47}}{\list{\listlevel\levelnfc23}\listid1}}Text\par}",
        &options,
    );
    assert_eq!(document.attachments().len(), 1);
    assert_eq!(document.content().len(), 1);
    assert!(
        document.content()[0]
            .descendants()
            .all(|n| n.type_name() != "image")
    );
}

#[test]
fn test_ignored_destinations() {
    let document = parse(
        r"{\rtf1{\info{\title Hidden}}{\header Top}{\*\generator Writer;}{\*\unknowndest secret}Visible\par}",
    );
    assert_eq!(document.to_text(), "Visible");
}

#[test]
fn test_raw_content_echo() {
    let options = ParseOptions::new().with_raw_content(true);
    let document = parse_with(r"{\rtf1 Hello \b world\b0\par}", &options);
    let raw = document.content()[0].raw_content().unwrap();
    assert!(raw.contains(r"\b world"));
    assert!(raw.contains(r"\par"));

    let plain = parse(r"{\rtf1 Hello\par}");
    assert!(plain.content()[0].raw_content().is_none());
}

#[test]
fn test_unbalanced_input() {
    assert_eq!(parse(r"{\rtf1 text}}}}").to_text(), "text");
    let open = parse(r"{\rtf1 {\b open");
    assert_eq!(open.to_text(), "open");
    assert!(open.content()[0].children()[0].formatting().unwrap().bold);
}

#[test]
fn test_serialized_document() {
    let options = ParseOptions::new().with_extract_attachments(true);
    let document = RtfDocument::from_bytes_with_options(
        br"{\rtf1 Hi{\pict\pngblip 89504e470d0a1a0a}\par}",
        &options,
    )
    .unwrap();
    let yaml = serde_saphyr::to_string(&document).unwrap();
    assert!(yaml.contains("type: paragraph"));
    assert!(yaml.contains("iVBORw0KGgo="));
}

struct LengthOcr;

impl OcrEngine for LengthOcr {
    async fn recognize(&self, data: &[u8], language: &str) -> Result<String> {
        if data.starts_with(&[0xFF, 0xD8]) {
            return Err(Error::Ocr {
                attachment: "jpeg".to_string(),
                message: "unsupported".to_string(),
            });
        }
        Ok(format!("{} bytes ({})", data.len(), language))
    }
}

#[tokio::test]
async fn test_ocr_post_pass() {
    let input = br"{\rtf1{\pict\pngblip 89504e47}{\pict\jpegblip ffd8}\par}";
    let options = ParseOptions::new()
        .with_extract_attachments(true)
        .with_ocr("deu");
    let document = RtfDocument::parse_with_ocr(input, &options, &LengthOcr)
        .await
        .unwrap();
    let attachments = document.document().attachments();
    assert_eq!(attachments.len(), 2);
    assert_eq!(attachments[0].ocr_text.as_deref(), Some("4 bytes (deu)"));
    assert_eq!(attachments[1].ocr_text, None);
}

#[tokio::test]
async fn test_ocr_requires_option() {
    let input = br"{\rtf1{\pict\pngblip 89504e47}\par}";
    let options = ParseOptions::new().with_extract_attachments(true);
    let document = RtfDocument::parse_with_ocr(input, &options, &LengthOcr)
        .await
        .unwrap();
    assert_eq!(document.document().attachments()[0].ocr_text, None);
}

fn fragment() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("a"),
        Just(" b "),
        Just("{"),
        Just("}"),
        Just(r"\b "),
        Just(r"\b0 "),
        Just(r"\par "),
        Just(r"\pard "),
        Just(r"\intbl "),
        Just(r"\trowd\cellx100 "),
        Just(r"\cell "),
        Just(r"\row "),
        Just(r"{\footnote n}"),
        Just(r"{\*\listtext 1.}"),
        Just(r"\ls1 "),
        Just(r"\'93"),
        Just(r"\u8220?"),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_extra_closing_braces_are_ignored(extra in 0usize..16) {
        let input = format!(r"{{\rtf1 text\par}}{}", "}".repeat(extra));
        prop_assert_eq!(parse(&input).to_text(), "text");
    }

    #[test]
    fn prop_text_is_concatenation_of_children(parts in prop::collection::vec(fragment(), 0..40)) {
        let input = format!(r"{{\rtf1 {}}}", parts.concat());
        let document = parse(&input);
        for node in document.content() {
            prop_assert!(node.text_is_consistent(), "inconsistent text in {:?}", node);
        }
    }

    #[test]
    fn prop_list_indices_are_consecutive(levels in prop::collection::vec(0u32..3, 1..12)) {
        let mut input = String::from(r"{\rtf1");
        for level in &levels {
            input.push_str(&format!(r"\pard\ls1\ilvl{} item\par", level));
        }
        input.push('}');
        let document = parse(&input);
        let mut expected = [0usize; 3];
        for (node, level) in document.content().iter().zip(&levels) {
            let item = list_item(node);
            prop_assert_eq!(item.indentation, *level);
            prop_assert_eq!(item.item_index, expected[*level as usize]);
            expected[*level as usize] += 1;
        }
    }
}
