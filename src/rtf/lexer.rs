//! RTF lexer/tokenizer.
//!
//! The lexer scans raw bytes into a token tree: brace-delimited [`Group`]s
//! holding decoded [`Token::Text`] runs and [`ControlWord`]s. Groups are
//! built with an explicit stack, so input nesting never turns into call
//! depth. Malformed structure is tolerated: a `}` with no open group is
//! ignored and groups still open at end of input are closed implicitly.
//!
//! The fallback after `\uN` is dropped here, before escapes are decoded:
//! `\ucN` counts bytes, and a double-byte code page folds two escaped
//! bytes into one character.

use super::lookup::cp1252_char;
use crate::common::encoding::{codepage_to_encoding, hex_char_to_nibble};
use encoding_rs::Encoding;
use smallvec::SmallVec;

/// Control word or control symbol with optional parameter.
///
/// Control symbols (`\~`, `\-`, `\*`, ...) are named by the symbol itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlWord<'a> {
    /// Letters of the control word, or the symbol character
    pub name: &'a str,
    /// Signed numeric parameter, if present
    pub param: Option<i32>,
}

impl<'a> ControlWord<'a> {
    #[inline]
    pub(crate) const fn new(name: &'a str, param: Option<i32>) -> Self {
        Self { name, param }
    }

    /// Toggle semantics: absent or non-zero parameter means on.
    #[inline]
    pub fn is_on(&self) -> bool {
        self.param.unwrap_or(1) != 0
    }
}

/// Token types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Brace-delimited scope
    Group(Group<'a>),
    /// Decoded literal characters
    Text(String),
    /// Control word or symbol
    Control(ControlWord<'a>),
}

/// A brace-delimited group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group<'a> {
    /// Name of the first control word, or of the second when the first is `\*`
    pub destination: Option<&'a str>,
    /// Whether the group starts with the `\*` marker
    pub ignorable: bool,
    /// Child tokens in source order
    pub children: Vec<Token<'a>>,
}

impl<'a> Group<'a> {
    fn infer_destination(&mut self) {
        let mut controls = self.children.iter().take(2).map(|t| match t {
            Token::Control(cw) => Some(cw.name),
            _ => None,
        });
        match controls.next().flatten() {
            Some("*") => {
                self.ignorable = true;
                self.destination = controls.next().flatten();
            },
            first => self.destination = first,
        }
    }

    /// Nested groups, in order.
    pub fn groups(&self) -> impl Iterator<Item = &Group<'a>> {
        self.children.iter().filter_map(|t| match t {
            Token::Group(g) => Some(g),
            _ => None,
        })
    }

    /// Concatenated text of this group and all nested groups.
    pub fn flat_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Token::Text(text) => out.push_str(text),
                Token::Group(group) => group.collect_text(out),
                Token::Control(_) => {},
            }
        }
    }

    /// Depth-first search for the first group with the given destination.
    pub fn find_destination(&self, name: &str) -> Option<&Group<'a>> {
        let mut stack: Vec<&Group<'a>> = vec![self];
        while let Some(group) = stack.pop() {
            if group.destination == Some(name) {
                return Some(group);
            }
            let nested: SmallVec<[&Group<'a>; 8]> = group.groups().collect();
            stack.extend(nested.into_iter().rev());
        }
        None
    }
}

/// How 8-bit bytes (`\'hh` escapes and raw text) become characters.
#[derive(Debug, Clone, Copy)]
enum ByteDecoder {
    /// Built-in Windows-1252 table
    Windows1252,
    /// Code page declared by `\ansicpgN` or `\mac`
    Codepage(&'static Encoding),
}

impl ByteDecoder {
    fn decode_into(self, bytes: &[u8], out: &mut String) {
        match self {
            ByteDecoder::Windows1252 => out.extend(bytes.iter().map(|&b| cp1252_char(b))),
            ByteDecoder::Codepage(encoding) => {
                let (text, _) = encoding.decode_without_bom_handling(bytes);
                out.push_str(&text);
            },
        }
    }
}

/// RTF lexer.
pub struct Lexer<'a> {
    /// Source input
    input: &'a [u8],
    /// Current position in bytes
    pos: usize,
    /// Open groups; index 0 is the implicit root
    stack: Vec<Group<'a>>,
    /// Groups past `max_depth` that were flattened into their parent
    overflow: usize,
    max_depth: usize,
    /// Escaped bytes waiting for decoding, kept together for double-byte code pages
    pending: SmallVec<[u8; 16]>,
    decoder: ByteDecoder,
    /// `\ucN` of each open scope, innermost last
    unicode_skip: SmallVec<[u32; 16]>,
    /// Fallback units still to drop after the last `\uN`
    skip: u32,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer; groups nested deeper than `max_depth` are
    /// flattened into their parent.
    #[inline]
    pub fn new(input: &'a [u8], max_depth: usize) -> Self {
        Self {
            input,
            pos: 0,
            stack: vec![Group::default()],
            overflow: 0,
            max_depth: max_depth.max(1),
            pending: SmallVec::new(),
            decoder: ByteDecoder::Windows1252,
            unicode_skip: SmallVec::from_elem(1, 1),
            skip: 0,
        }
    }

    /// Tokenize the entire input into the root group.
    ///
    /// The root is implicit: a well-formed document yields a root with one
    /// child group (`{\rtf1 ...}`).
    pub fn tokenize(mut self) -> Group<'a> {
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b'{' => {
                    self.pos += 1;
                    self.open_group();
                },
                b'}' => {
                    self.pos += 1;
                    self.close_group();
                },
                b'\\' => self.parse_control(),
                b'\r' | b'\n' => self.pos += 1,
                _ => self.parse_text(),
            }
        }
        self.flush_pending();
        while self.stack.len() > 1 {
            self.close_group();
        }
        let mut root = self.stack.pop().unwrap_or_default();
        root.infer_destination();
        root
    }

    fn open_group(&mut self) {
        self.flush_pending();
        self.skip = 0;
        self.unicode_skip.push(self.current_unicode_skip());
        if self.stack.len() > self.max_depth {
            if self.overflow == 0 {
                log::warn!(
                    "RTF nesting deeper than {} groups, flattening inner groups",
                    self.max_depth
                );
            }
            self.overflow += 1;
            return;
        }
        self.stack.push(Group::default());
    }

    fn close_group(&mut self) {
        self.flush_pending();
        self.skip = 0;
        if self.unicode_skip.len() > 1 {
            self.unicode_skip.pop();
        }
        if self.overflow > 0 {
            self.overflow -= 1;
            return;
        }
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(mut group) = self.stack.pop() {
            group.infer_destination();
            self.push_token(Token::Group(group));
        }
    }

    fn push_token(&mut self, token: Token<'a>) {
        if let Some(top) = self.stack.last_mut() {
            top.children.push(token);
        }
    }

    /// Append text, merging with a preceding text token.
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(top) = self.stack.last_mut() {
            if let Some(Token::Text(last)) = top.children.last_mut() {
                last.push_str(text);
            } else {
                top.children.push(Token::Text(text.to_string()));
            }
        }
    }

    fn push_control(&mut self, name: &'a str, param: Option<i32>) {
        self.flush_pending();
        self.push_token(Token::Control(ControlWord::new(name, param)));
    }

    #[inline]
    fn current_unicode_skip(&self) -> u32 {
        self.unicode_skip.last().copied().unwrap_or(1)
    }

    /// Consume one fallback unit; returns false when none is pending.
    #[inline]
    fn skip_fallback_unit(&mut self) -> bool {
        if self.skip == 0 {
            return false;
        }
        self.skip -= 1;
        true
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut text = String::with_capacity(self.pending.len());
        self.decoder.decode_into(&self.pending, &mut text);
        self.pending.clear();
        self.push_text(&text);
    }

    /// Parse a control word or control symbol.
    fn parse_control(&mut self) {
        self.pos += 1; // Skip '\'
        let Some(&ch) = self.input.get(self.pos) else {
            return;
        };

        match ch {
            b'\\' | b'{' | b'}' => {
                self.pos += 1;
                if self.skip_fallback_unit() {
                    return;
                }
                self.flush_pending();
                self.push_text(if ch == b'\\' {
                    "\\"
                } else if ch == b'{' {
                    "{"
                } else {
                    "}"
                });
                return;
            },
            b'\'' => {
                self.pos += 1;
                self.parse_hex_escape();
                return;
            },
            b'\r' | b'\n' => {
                self.pos += 1;
                if !self.skip_fallback_unit() {
                    self.push_control("par", None);
                }
                return;
            },
            _ if ch.is_ascii_alphabetic() => {},
            _ if ch.is_ascii_punctuation() => {
                let name = self.slice_str(self.pos, self.pos + 1);
                self.pos += 1;
                if !self.skip_fallback_unit() {
                    self.push_control(name, None);
                }
                return;
            },
            // Not a control sequence; the byte is read as text.
            _ => return,
        }

        let start = self.pos;
        while self
            .input
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_alphabetic())
        {
            self.pos += 1;
        }
        let name = self.slice_str(start, self.pos);
        let param = self.parse_numeric_parameter();

        // Skip optional space delimiter after control word
        if self.input.get(self.pos) == Some(&b' ') {
            self.pos += 1;
        }

        // A control word in place of a fallback byte counts as one.
        if name != "u" && self.skip_fallback_unit() {
            if name == "bin" {
                self.skip_binary(param);
            }
            return;
        }

        match name {
            "u" => {
                self.push_control(name, param);
                if param.is_some() {
                    self.skip = self.current_unicode_skip();
                }
            },
            "uc" => {
                let count = param.unwrap_or(1).max(0) as u32;
                if let Some(top) = self.unicode_skip.last_mut() {
                    *top = count;
                }
                self.push_control(name, param);
            },
            "bin" => {
                self.flush_pending();
                self.skip_binary(param);
            },
            "ansicpg" => {
                if let Some(encoding) = param
                    .and_then(|cp| u32::try_from(cp).ok())
                    .filter(|&cp| cp != 1252)
                    .and_then(codepage_to_encoding)
                {
                    self.decoder = ByteDecoder::Codepage(encoding);
                }
                self.push_control(name, param);
            },
            "mac" => {
                self.decoder = ByteDecoder::Codepage(encoding_rs::MACINTOSH);
                self.push_control(name, param);
            },
            _ => self.push_control(name, param),
        }
    }

    fn skip_binary(&mut self, length: Option<i32>) {
        let length = length.unwrap_or(0).max(0) as usize;
        self.pos = self.pos.saturating_add(length).min(self.input.len());
    }

    /// Parse numeric parameter after control word.
    fn parse_numeric_parameter(&mut self) -> Option<i32> {
        let start = self.pos;
        let mut end = start;
        if self.input.get(end) == Some(&b'-') {
            end += 1;
        }
        let digits_start = end;
        while self.input.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        if end == digits_start {
            return None;
        }
        self.pos = end;
        atoi_simd::parse::<i32, false, false>(&self.input[start..end]).ok()
    }

    /// Parse the two hex digits of a `\'hh` escape.
    ///
    /// Invalid digits produce nothing; the bytes after `\'` are then read as
    /// ordinary input.
    fn parse_hex_escape(&mut self) {
        let (Some(&hi), Some(&lo)) = (self.input.get(self.pos), self.input.get(self.pos + 1))
        else {
            return;
        };
        if let (Ok(hi), Ok(lo)) = (hex_char_to_nibble(hi), hex_char_to_nibble(lo)) {
            self.pos += 2;
            if !self.skip_fallback_unit() {
                self.pending.push((hi << 4) | lo);
            }
        }
    }

    /// Parse plain text until a brace, backslash or line ending.
    fn parse_text(&mut self) {
        self.flush_pending();
        let input = self.input;
        let start = self.pos;
        let end = memchr::memchr3(b'\\', b'{', b'}', &input[start..])
            .map_or(input.len(), |i| start + i);
        let end = memchr::memchr2(b'\r', b'\n', &input[start..end]).map_or(end, |i| start + i);
        self.pos = end;

        let bytes = self.drop_fallback_text(&input[start..end]);
        if bytes.is_empty() {
            return;
        }
        if bytes.is_ascii() {
            // ASCII is valid UTF-8 and identical in every supported code page
            self.push_text(std::str::from_utf8(bytes).unwrap_or_default());
            return;
        }
        // Raw 8-bit text: UTF-8 when it decodes as such, the code page otherwise.
        match std::str::from_utf8(bytes) {
            Ok(text) => self.push_text(text),
            Err(_) => {
                let mut text = String::with_capacity(bytes.len());
                self.decoder.decode_into(bytes, &mut text);
                self.push_text(&text);
            },
        }
    }

    /// Drop pending fallback units from the front of a literal text run.
    ///
    /// A unit is one character of UTF-8 text, or one byte otherwise.
    fn drop_fallback_text<'b>(&mut self, bytes: &'b [u8]) -> &'b [u8] {
        if self.skip == 0 {
            return bytes;
        }
        let wanted = self.skip as usize;
        let (dropped, cut) = match std::str::from_utf8(bytes) {
            Ok(text) => match text.char_indices().nth(wanted) {
                Some((at, _)) => (wanted, at),
                None => (text.chars().count(), bytes.len()),
            },
            Err(_) => {
                let cut = wanted.min(bytes.len());
                (cut, cut)
            },
        };
        self.skip -= dropped as u32;
        &bytes[cut..]
    }

    /// Borrow an ASCII slice of the input as `&str`.
    #[inline]
    fn slice_str(&self, start: usize, end: usize) -> &'a str {
        let input = self.input;
        std::str::from_utf8(&input[start..end]).unwrap_or_default()
    }
}

/// Tokenize `input` into its root group.
#[inline]
pub fn tokenize(input: &[u8], max_depth: usize) -> Group<'_> {
    Lexer::new(input, max_depth).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(input: &str) -> Group<'_> {
        let root = tokenize(input.as_bytes(), 512);
        match root.children.into_iter().next() {
            Some(Token::Group(group)) => group,
            other => panic!("expected a group, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_tokenization() {
        let group = document(r"{\rtf1\ansi Hello}");
        assert_eq!(group.destination, Some("rtf"));
        assert_eq!(
            group.children,
            vec![
                Token::Control(ControlWord::new("rtf", Some(1))),
                Token::Control(ControlWord::new("ansi", None)),
                Token::Text("Hello".to_string()),
            ]
        );
    }

    #[test]
    fn test_one_trailing_space_is_consumed() {
        let group = document(r"{\b  bold}");
        assert_eq!(group.children[1], Token::Text(" bold".to_string()));
    }

    #[test]
    fn test_negative_parameter() {
        let group = document(r"{\u-3913?x}");
        assert_eq!(group.children[0], Token::Control(ControlWord::new("u", Some(-3913))));
        assert_eq!(group.children[1], Token::Text("x".to_string()));
    }

    #[test]
    fn test_fallback_counts_escaped_bytes() {
        // "中" in GBK is two escaped bytes, one decoded character
        let group = document(r"{\ansicpg936\uc2 \u20013\'d6\'d0 abc}");
        assert_eq!(group.children[3], Token::Text(" abc".to_string()));

        let group = document(r"{\ansicpg936\uc2 \u20013\'d6\'d0\'ce\'c4}");
        assert_eq!(group.children[3], Token::Text("\u{6587}".to_string()));
    }

    #[test]
    fn test_fallback_count_is_group_scoped() {
        let group = document(r"{{\uc3 }\u233 ab}");
        assert_eq!(group.children[2], Token::Text("b".to_string()));
    }

    #[test]
    fn test_fallback_ends_at_group_boundary() {
        let group = document(r"{\uc4 \u233 x{y}z}");
        assert_eq!(group.flat_text(), "yz");
    }

    #[test]
    fn test_hex_escape_uses_windows_1252() {
        let group = document(r"{\'93quoted\'94 caf\'e9}");
        assert_eq!(
            group.children,
            vec![Token::Text("\u{201C}quoted\u{201D} caf\u{00E9}".to_string())]
        );
    }

    #[test]
    fn test_invalid_hex_escape_is_ignored() {
        let group = document(r"{a\'zzb}");
        assert_eq!(group.children, vec![Token::Text("azzb".to_string())]);
    }

    #[test]
    fn test_ansicpg_switches_decoding() {
        // "中" in GBK
        let group = document(r"{\ansicpg936 \'d6\'d0}");
        assert_eq!(group.children[1], Token::Text("\u{4E2D}".to_string()));
    }

    #[test]
    fn test_escaped_literals_and_symbols() {
        let group = document(r"{\{x\}\\\~\*}");
        assert_eq!(group.children[0], Token::Text("{x}\\".to_string()));
        assert_eq!(group.children[1], Token::Control(ControlWord::new("~", None)));
        assert_eq!(group.children[2], Token::Control(ControlWord::new("*", None)));
    }

    #[test]
    fn test_line_endings_are_dropped() {
        let group = document("{Hel\r\nlo\\\n}");
        assert_eq!(group.children[0], Token::Text("Hello".to_string()));
        assert_eq!(group.children[1], Token::Control(ControlWord::new("par", None)));
    }

    #[test]
    fn test_bin_skips_payload() {
        let group = document("{\\bin3 {}}after}");
        assert_eq!(group.children, vec![Token::Text("after".to_string())]);
    }

    #[test]
    fn test_ignorable_destination() {
        let group = document(r"{\rtf1{\*\fldinst HYPERLINK}}");
        let inner = group.groups().next().unwrap();
        assert!(inner.ignorable);
        assert_eq!(inner.destination, Some("fldinst"));
        assert!(group.find_destination("fldinst").is_some());
    }

    #[test]
    fn test_unbalanced_braces() {
        let root = tokenize(br"}}{\rtf1 a}}}", 512);
        assert_eq!(root.groups().count(), 1);

        let root = tokenize(br"{\rtf1 {\b open", 512);
        let doc = root.groups().next().unwrap();
        assert_eq!(doc.flat_text(), "open");
    }

    #[test]
    fn test_depth_limit_flattens() {
        let root = tokenize(br"{a{b{c{d}}}}", 2);
        let outer = root.groups().next().unwrap();
        let inner = outer.groups().next().unwrap();
        assert_eq!(inner.groups().count(), 0);
        assert_eq!(inner.flat_text(), "bcd");
    }

    #[test]
    fn test_utf8_text_passes_through() {
        let group = document("{caf\u{00E9} \u{4E2D}}");
        assert_eq!(group.children, vec![Token::Text("caf\u{00E9} \u{4E2D}".to_string())]);
    }
}
