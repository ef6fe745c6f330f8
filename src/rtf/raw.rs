//! Best-effort re-serialization of tokens for the raw content echo.
//!
//! The output is RTF again, not the original bytes: hex escapes come back
//! as the decoded characters and `\bin` payloads are gone.

use super::lexer::{ControlWord, Group, Token};
use crate::document::ContentNode;

/// Append a control word.
pub(crate) fn write_control(cw: &ControlWord<'_>, out: &mut String) {
    out.push('\\');
    out.push_str(cw.name);
    if let Some(param) = cw.param {
        out.push_str(itoa::Buffer::new().format(param));
    }
    if cw.name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        out.push(' ');
    }
}

/// Append text, escaping RTF specials and non-ASCII characters.
pub(crate) fn write_text(text: &str, out: &mut String) {
    let mut units = [0u16; 2];
    for c in text.chars() {
        match c {
            '\\' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            },
            c if c.is_ascii() => out.push(c),
            c => {
                for &unit in c.encode_utf16(&mut units).iter() {
                    out.push_str("\\u");
                    out.push_str(itoa::Buffer::new().format(unit as i16));
                    out.push('?');
                }
            },
        }
    }
}

/// Append a whole group.
pub(crate) fn write_group(group: &Group<'_>, out: &mut String) {
    out.push('{');
    for token in &group.children {
        write_token(token, out);
    }
    out.push('}');
}

/// Append any token.
pub(crate) fn write_token(token: &Token<'_>, out: &mut String) {
    match token {
        Token::Group(group) => write_group(group, out),
        Token::Text(text) => write_text(text, out),
        Token::Control(cw) => write_control(cw, out),
    }
}

/// Concatenated raw content of `children`, if any child carries some.
pub(crate) fn concat_raw(children: &[ContentNode]) -> Option<String> {
    let mut raw: Option<String> = None;
    for part in children.iter().filter_map(ContentNode::raw_content) {
        raw.get_or_insert_with(String::new).push_str(part);
    }
    raw
}
