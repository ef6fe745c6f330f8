//! Font table and color table extraction.
//!
//! Both tables are read in a pre-pass: the first `fonttbl` / `colortbl`
//! group found depth-first anywhere in the token tree is decoded into an
//! index-addressed table the interpreter resolves `\f` and `\cf` against.

use super::lexer::{Group, Token};
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;

/// Font family categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    /// Nil (unknown or default)
    #[default]
    Nil,
    /// Roman (serif) fonts
    Roman,
    /// Swiss (sans-serif) fonts
    Swiss,
    /// Modern (monospace) fonts
    Modern,
    /// Script fonts
    Script,
    /// Decorative fonts
    Decor,
    /// Technical, symbol, and mathematical fonts
    Tech,
    /// Bidirectional fonts
    Bidi,
}

impl FontFamily {
    fn from_control(name: &str) -> Option<Self> {
        Some(match name {
            "fnil" => FontFamily::Nil,
            "froman" => FontFamily::Roman,
            "fswiss" => FontFamily::Swiss,
            "fmodern" => FontFamily::Modern,
            "fscript" => FontFamily::Script,
            "fdecor" => FontFamily::Decor,
            "ftech" => FontFamily::Tech,
            "fbidi" => FontFamily::Bidi,
            _ => return None,
        })
    }
}

/// Font definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Font {
    /// Font name
    pub name: String,
    /// Font family category
    pub family: FontFamily,
    /// Character set (`\fcharset`)
    pub charset: u8,
}

/// Font table containing document fonts, keyed by `\fN` index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FontTable {
    fonts: BTreeMap<i32, Font>,
}

impl FontTable {
    /// Get a font by its `\f` index.
    #[inline]
    pub fn get(&self, index: i32) -> Option<&Font> {
        self.fonts.get(&index)
    }

    /// Resolve a `\f` index to the font name.
    #[inline]
    pub fn name(&self, index: i32) -> Option<&str> {
        self.get(index).map(|f| f.name.as_str())
    }

    /// Fonts in index order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &Font)> {
        self.fonts.iter().map(|(&i, f)| (i, f))
    }

    /// Number of fonts.
    #[inline]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// RTF color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    /// Red component (0-255)
    pub red: u8,
    /// Green component (0-255)
    pub green: u8,
    /// Blue component (0-255)
    pub blue: u8,
}

impl Color {
    /// Create a new color.
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Render as `#RRGGBB`.
    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

/// Color table, addressed by `\cf` / `\cb` index.
///
/// An entry is `None` for the "auto" color (an entry with no components,
/// conventionally index 0).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorTable {
    colors: Vec<Option<Color>>,
}

impl ColorTable {
    /// Get a color by index.
    #[inline]
    pub fn get(&self, index: i32) -> Option<Color> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.colors.get(i).copied().flatten())
    }

    /// Resolve an index to `#RRGGBB`.
    #[inline]
    pub fn hex(&self, index: i32) -> Option<String> {
        self.get(index).map(Color::to_hex)
    }

    /// All entries in index order.
    #[inline]
    pub fn colors(&self) -> &[Option<Color>] {
        &self.colors
    }
}

impl Serialize for ColorTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.colors.iter().map(|c| c.map(Color::to_hex)))
    }
}

/// Extract the font table from anywhere in the tree.
pub fn extract_font_table(root: &Group<'_>) -> FontTable {
    let mut table = FontTable::default();
    let Some(group) = root.find_destination("fonttbl") else {
        return table;
    };

    // Entries are usually one group each; some writers list them unbraced.
    let mut loose = FontEntry::default();
    for child in &group.children {
        match child {
            Token::Group(entry) if !entry.ignorable => {
                let mut font = FontEntry::default();
                font.read(&entry.children);
                font.commit(&mut table);
            },
            Token::Group(_) => {},
            Token::Control(_) | Token::Text(_) => {
                if loose.read(std::slice::from_ref(child)) {
                    loose.commit(&mut table);
                    loose = FontEntry::default();
                }
            },
        }
    }
    loose.commit(&mut table);
    table
}

#[derive(Default)]
struct FontEntry {
    index: Option<i32>,
    family: FontFamily,
    charset: u8,
    name: SmallVec<[String; 2]>,
}

impl FontEntry {
    /// Read entry tokens; returns true once the `;` terminator was seen.
    fn read(&mut self, tokens: &[Token<'_>]) -> bool {
        for token in tokens {
            match token {
                Token::Control(cw) => match cw.name {
                    "f" => self.index = cw.param,
                    "fcharset" => {
                        self.charset = cw.param.and_then(|c| u8::try_from(c).ok()).unwrap_or(0)
                    },
                    name => {
                        if let Some(family) = FontFamily::from_control(name) {
                            self.family = family;
                        }
                    },
                },
                Token::Text(text) => {
                    let (part, terminated) = match text.find(';') {
                        Some(end) => (&text[..end], true),
                        None => (text.as_str(), false),
                    };
                    let part = part.trim();
                    if !part.is_empty() {
                        self.name.push(part.to_string());
                    }
                    if terminated {
                        return true;
                    }
                },
                // Nested groups such as {\*\panose ...} or {\*\falt ...}
                Token::Group(_) => {},
            }
        }
        false
    }

    fn commit(&mut self, table: &mut FontTable) {
        if let Some(index) = self.index.take() {
            table.fonts.insert(
                index,
                Font {
                    name: self.name.join(" "),
                    family: self.family,
                    charset: self.charset,
                },
            );
        }
    }
}

/// Extract the color table from anywhere in the tree.
pub fn extract_color_table(root: &Group<'_>) -> ColorTable {
    let mut table = ColorTable::default();
    let Some(group) = root.find_destination("colortbl") else {
        return table;
    };

    let mut current: Option<Color> = None;
    for child in &group.children {
        match child {
            // Theme and tint words carry no RGB value of their own
            Token::Control(cw) if matches!(cw.name, "red" | "green" | "blue") => {
                let value = cw.param.unwrap_or(0).clamp(0, 255) as u8;
                let color = current.get_or_insert_with(Color::default);
                match cw.name {
                    "red" => color.red = value,
                    "green" => color.green = value,
                    _ => color.blue = value,
                }
            },
            Token::Control(_) => {},
            Token::Text(text) => {
                for _ in text.bytes().filter(|&b| b == b';') {
                    table.colors.push(current.take());
                }
            },
            Token::Group(_) => {},
        }
    }
    table
}
