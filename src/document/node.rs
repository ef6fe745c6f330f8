//! Content nodes: the unified tree every format engine converges on.
//!
//! A [`ContentNode`] carries a [`NodeKind`] tag with the metadata valid for
//! that kind, a flattened `text`, ordered children, and an optional
//! [`Formatting`] record on text leaves. Container constructors compute
//! `text` from the children, so a node's text is always the concatenation of
//! its children's text in document order.

use serde::Serialize;

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left-aligned
    Left,
    /// Centered
    Center,
    /// Right-aligned
    Right,
    /// Justified
    Justify,
}

/// Kind of list a list item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    /// Numbered or lettered list
    Ordered,
    /// Bulleted list
    Unordered,
}

/// Kind of note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    /// Footnote
    Footnote,
    /// Endnote
    Endnote,
}

/// Whether a link points inside the document or outside of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Bookmark-style target within the document
    Internal,
    /// Target with a URI scheme
    External,
}

/// Hyperlink attached to a text run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Link target as written in the source
    pub url: String,
    /// Internal or external target
    pub kind: LinkKind,
}

impl Link {
    /// Classify a link target.
    ///
    /// Targets starting with `#` or without a URI scheme are internal.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let kind = if url.starts_with('#') || !has_uri_scheme(&url) {
            LinkKind::Internal
        } else {
            LinkKind::External
        };
        Self { url, kind }
    }
}

/// A scheme is at least two characters so drive letters (`C:\`) do not count.
fn has_uri_scheme(url: &str) -> bool {
    let Some(colon) = url.find(':') else {
        return false;
    };
    let scheme = &url[..colon];
    scheme.len() >= 2
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Character formatting of a text run.
///
/// Only meaningful on text leaves. Flags that are off are omitted when
/// serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Formatting {
    /// Bold
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    /// Italic
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    /// Underline
    #[serde(skip_serializing_if = "is_false")]
    pub underline: bool,
    /// Strikethrough
    #[serde(skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    /// Subscript
    #[serde(skip_serializing_if = "is_false")]
    pub subscript: bool,
    /// Superscript
    #[serde(skip_serializing_if = "is_false")]
    pub superscript: bool,
    /// Font name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Font size in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    /// Text color as `#RRGGBB`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Background color as `#RRGGBB`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl Formatting {
    /// Whether no formatting property is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Metadata of a list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    /// Ordered or unordered
    pub list_type: ListType,
    /// Nesting level, zero-based
    pub indentation: u32,
    /// Identifier shared by all items of one list
    pub list_id: String,
    /// Zero-based position among items with the same list id and indentation
    pub item_index: usize,
    /// Paragraph alignment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
}

/// Node type tag with the metadata valid for that type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "metadata", rename_all = "lowercase")]
pub enum NodeKind {
    /// Plain paragraph
    Paragraph {
        #[serde(skip_serializing_if = "Option::is_none")]
        alignment: Option<Alignment>,
    },
    /// Heading paragraph
    Heading {
        level: u8,
        #[serde(skip_serializing_if = "Option::is_none")]
        alignment: Option<Alignment>,
    },
    /// List item paragraph
    List(ListItem),
    /// Table; children are rows
    Table,
    /// Table row; children are cells
    Row { index: usize },
    /// Table cell; children are block nodes
    Cell { row: usize, col: usize },
    /// Text run leaf
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        link: Option<Link>,
    },
    /// Inline image referring to an attachment by name
    #[serde(rename_all = "camelCase")]
    Image {
        attachment_name: String,
        mime_type: String,
    },
    /// Footnote or endnote; children are block nodes
    #[serde(rename_all = "camelCase")]
    Note { note_type: NoteType, id: String },
}

impl NodeKind {
    /// Lowercase type tag, as used in serialized output.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Paragraph { .. } => "paragraph",
            NodeKind::Heading { .. } => "heading",
            NodeKind::List(_) => "list",
            NodeKind::Table => "table",
            NodeKind::Row { .. } => "row",
            NodeKind::Cell { .. } => "cell",
            NodeKind::Text { .. } => "text",
            NodeKind::Image { .. } => "image",
            NodeKind::Note { .. } => "note",
        }
    }
}

/// A node of the unified content tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    #[serde(flatten)]
    kind: NodeKind,
    text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<ContentNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    formatting: Option<Formatting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_content: Option<String>,
}

impl ContentNode {
    /// Create a text run.
    ///
    /// Empty formatting records are normalized to `None`.
    pub fn text_run(
        text: impl Into<String>,
        formatting: Option<Formatting>,
        link: Option<Link>,
    ) -> Self {
        Self {
            kind: NodeKind::Text { link },
            text: text.into(),
            children: Vec::new(),
            formatting: formatting.filter(|f| !f.is_empty()),
            raw_content: None,
        }
    }

    /// Create an image leaf for an extracted attachment.
    pub fn image(attachment_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Image {
                attachment_name: attachment_name.into(),
                mime_type: mime_type.into(),
            },
            text: String::new(),
            children: Vec::new(),
            formatting: None,
            raw_content: None,
        }
    }

    /// Create a container node whose text is the concatenation of its children's text.
    pub fn container(kind: NodeKind, children: Vec<ContentNode>) -> Self {
        let text = concat_text(&children);
        Self {
            kind,
            text,
            children,
            formatting: None,
            raw_content: None,
        }
    }

    /// Attach the echoed source of this node.
    pub fn with_raw_content(mut self, raw: Option<String>) -> Self {
        self.raw_content = raw;
        self
    }

    /// Node kind and its metadata.
    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Lowercase type tag.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Flattened text of this node.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Child nodes in document order.
    #[inline]
    pub fn children(&self) -> &[ContentNode] {
        &self.children
    }

    /// Character formatting, present only on formatted text runs.
    #[inline]
    pub fn formatting(&self) -> Option<&Formatting> {
        self.formatting.as_ref()
    }

    /// Echoed source, present when raw content was requested.
    #[inline]
    pub fn raw_content(&self) -> Option<&str> {
        self.raw_content.as_deref()
    }

    /// Link of a text run, if any.
    pub fn link(&self) -> Option<&Link> {
        match &self.kind {
            NodeKind::Text { link } => link.as_ref(),
            _ => None,
        }
    }

    /// Whether this is a footnote or endnote.
    #[inline]
    pub fn is_note(&self) -> bool {
        matches!(self.kind, NodeKind::Note { .. })
    }

    /// Recompute `text` of this node and all descendants from their children.
    ///
    /// Leaves keep their own text.
    pub fn refresh_text(&mut self) {
        if self.children.is_empty() {
            return;
        }
        for child in &mut self.children {
            child.refresh_text();
        }
        self.text = concat_text(&self.children);
    }

    /// Whether every container in this subtree has `text` equal to the
    /// concatenation of its children's text.
    pub fn text_is_consistent(&self) -> bool {
        if self.children.is_empty() {
            return true;
        }
        self.text == concat_text(&self.children)
            && self.children.iter().all(ContentNode::text_is_consistent)
    }

    /// Depth-first iterator over this node and its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

fn concat_text(children: &[ContentNode]) -> String {
    children.iter().map(|c| c.text.as_str()).collect()
}

/// Depth-first, pre-order iterator returned by [`ContentNode::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a ContentNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a ContentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
