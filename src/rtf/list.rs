//! RTF list and numbering support.
//!
//! RTF has two numbering schemes. Word 97+ documents declare lists in a
//! `\listtable` (definitions, each with up to nine levels) and a
//! `\listoverridetable` (instances, referenced from paragraphs by `\lsN`).
//! Word 6/95 documents describe numbering inline with `{\*\pn ...}` groups.
//! Both may also carry a rendered marker in `{\listtext ...}` /
//! `{\pntext ...}` for readers that understand neither.

use super::lexer::{Group, Token};
use crate::document::ListType;
use std::collections::HashMap;

/// Level number format code of a bullet (`\levelnfc23`).
const NFC_BULLET: i32 = 23;

/// Classify a `\levelnfcN` / `\pnfN` format code.
///
/// Codes 0-4 (decimal, roman, letters) are ordered, 23 is a bullet and
/// everything else is treated as ordered numbering.
#[inline]
pub fn number_format_type(code: i32) -> ListType {
    if code == NFC_BULLET {
        ListType::Unordered
    } else {
        ListType::Ordered
    }
}

/// List type forced by a Word 6/95 numbering control word.
pub fn legacy_numbering_type(name: &str) -> Option<ListType> {
    match name {
        "pndec" | "pnord" | "pnordt" | "pnlcltr" | "pnucltr" | "pnlcrm" | "pnucrm" | "pncardt" => {
            Some(ListType::Ordered)
        },
        "pnbullet" | "pncard" | "pnlvlblt" => Some(ListType::Unordered),
        _ => None,
    }
}

/// Classify the text of a `\listtext` / `\pntext` marker.
///
/// `1.`, `iv)` and `A.` are ordinal markers; a single non-alphanumeric
/// glyph (`•`, `·`, `-`) or a known bullet character is a bullet. Returns
/// `None` for an empty marker and for any other text, which leaves the
/// list type to the paragraph's other properties.
///
/// # Examples
///
/// ```rust
/// use docast::document::ListType;
/// use docast::rtf::classify_marker;
///
/// assert_eq!(classify_marker("1."), Some(ListType::Ordered));
/// assert_eq!(classify_marker("\u{2022}\t"), Some(ListType::Unordered));
/// assert_eq!(classify_marker("Step 1:"), None);
/// assert_eq!(classify_marker(""), None);
/// ```
pub fn classify_marker(text: &str) -> Option<ListType> {
    let marker = text.trim_matches(|c: char| c.is_whitespace());
    if marker.is_empty() {
        return None;
    }

    if let Some(body) = marker.strip_suffix(['.', ')'])
        && !body.is_empty()
        && body.chars().all(char::is_alphanumeric)
    {
        return Some(ListType::Ordered);
    }

    let mut chars = marker.chars();
    let first = chars.next()?;
    let single = chars.next().is_none();
    ((single && !first.is_alphanumeric()) || is_bullet_glyph(first)).then_some(ListType::Unordered)
}

fn is_bullet_glyph(c: char) -> bool {
    matches!(
        c,
        '\u{2022}' | '\u{00B7}' | '\u{25CF}' | '\u{25CB}' | '\u{25A0}' | '\u{25A1}' | '\u{25AA}'
            | '\u{25E6}' | '\u{2023}' | '\u{2043}' | '\u{2219}' | '\u{27A2}' | '\u{2713}'
            | '\u{F0B7}' | '\u{F0A7}' | '\u{F076}' | '\u{F0D8}' | '\u{F0FC}'
    )
}

/// Call `f` for every control word in `group`, nested groups included.
fn for_each_control<'a>(group: &Group<'a>, f: &mut impl FnMut(&str, Option<i32>)) {
    for token in &group.children {
        match token {
            Token::Control(cw) => f(cw.name, cw.param),
            Token::Group(nested) => for_each_control(nested, f),
            Token::Text(_) => {},
        }
    }
}

/// Document-wide list state.
#[derive(Debug, Default)]
pub(crate) struct ListRegistry {
    /// `\listid` of a definition to its resolved kind
    definitions: HashMap<i32, ListType>,
    /// `\ls` override id to the `\listid` it instantiates
    overrides: HashMap<i32, i32>,
    /// `\ls` override id to its synthesized stable identifier
    ids: HashMap<i32, String>,
    /// Item counters per (list id, indentation)
    counters: HashMap<(String, u32), usize>,
    last: Option<(String, ListType)>,
    synthesized: usize,
}

impl ListRegistry {
    /// Read the list definitions of a `\listtable` group.
    pub fn read_list_table(&mut self, table: &Group<'_>) {
        for list in table.groups().filter(|g| g.destination == Some("list")) {
            let mut id = None;
            let mut kind = ListType::Unordered;
            for_each_control(list, &mut |name, param| match name {
                "listid" => id = id.or(param),
                "levelnfc" | "levelnfcn" => {
                    if let Some(0..=4) = param {
                        kind = ListType::Ordered;
                    }
                },
                _ => {},
            });
            if let Some(id) = id {
                self.definitions.insert(id, kind);
            }
        }
    }

    /// Read the `\ls` to definition mapping of a `\listoverridetable` group.
    pub fn read_override_table(&mut self, table: &Group<'_>) {
        for entry in table.groups().filter(|g| g.destination == Some("listoverride")) {
            let mut list_id = None;
            let mut ls = None;
            for_each_control(entry, &mut |name, param| match name {
                "listid" => list_id = list_id.or(param),
                "ls" => ls = ls.or(param),
                _ => {},
            });
            if let (Some(list_id), Some(ls)) = (list_id, ls) {
                self.overrides.insert(ls, list_id);
            }
        }
    }

    /// Stable identifier and resolved kind of a `\lsN` reference.
    pub fn resolve(&mut self, ls: i32) -> (String, Option<ListType>) {
        let kind = self
            .overrides
            .get(&ls)
            .and_then(|definition| self.definitions.get(definition))
            .copied();
        if kind.is_none() {
            log::debug!("List override {} has no resolvable definition", ls);
        }
        let id = match self.ids.get(&ls) {
            Some(id) => id.clone(),
            None => {
                let id = self.synthesize_id();
                self.ids.insert(ls, id.clone());
                id
            },
        };
        (id, kind)
    }

    /// A fresh list identifier for markers with no `\ls` reference.
    pub fn synthesize_id(&mut self) -> String {
        self.synthesized += 1;
        format!("rtf-list-{}", self.synthesized)
    }

    /// The list id and kind most recently used by a list item.
    #[inline]
    pub fn last(&self) -> Option<&(String, ListType)> {
        self.last.as_ref()
    }

    /// Record an item and return its zero-based index within its list level.
    pub fn next_item(&mut self, id: &str, kind: ListType, indentation: u32) -> usize {
        let counter = self
            .counters
            .entry((id.to_string(), indentation))
            .or_insert(0);
        let index = *counter;
        *counter += 1;
        self.last = Some((id.to_string(), kind));
        index
    }
}
