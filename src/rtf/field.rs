//! RTF field instructions.
//!
//! RTF fields are structured as:
//! {\field{\*\fldinst FIELD_INSTRUCTION}{\fldrslt FIELD_RESULT}}
//!
//! Only the instruction is interpreted here; the result is ordinary content
//! the interpreter walks, tagging its runs with the field's link.

/// Field type in RTF documents.
///
/// Only hyperlinks change how the field result is read; every other field
/// (`PAGE`, `REF`, `TOC`, ...) contributes its result as plain content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Hyperlink field
    Hyperlink,
    /// Any other field
    Other,
}

/// Parsed field instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInstruction {
    /// Field type
    pub field_type: FieldType,
    /// Instruction text following the keyword
    arguments: String,
}

impl FieldInstruction {
    /// Parse a field instruction to extract the type and arguments.
    ///
    /// The keyword may be preceded by other text (some writers emit
    /// formatting residue before it), so `HYPERLINK` is searched for rather
    /// than only matched at the start.
    pub fn parse(instruction: &str) -> Self {
        let trimmed = instruction.trim();

        if let Some(at) = trimmed.find("HYPERLINK") {
            return Self {
                field_type: FieldType::Hyperlink,
                arguments: trimmed[at + "HYPERLINK".len()..].trim().to_string(),
            };
        }

        let keyword = trimmed.split_whitespace().next().unwrap_or("");
        Self {
            field_type: FieldType::Other,
            arguments: trimmed[keyword.len()..].trim().to_string(),
        }
    }

    /// Link target of a HYPERLINK field.
    ///
    /// HYPERLINK fields have format: `HYPERLINK "url" \o "tooltip"`. A
    /// `\l "bookmark"` switch targets a location in this document and yields
    /// `#bookmark`, appended to the URL when both are present.
    pub fn hyperlink_target(&self) -> Option<String> {
        if self.field_type != FieldType::Hyperlink {
            return None;
        }

        let mut url: Option<String> = None;
        let mut bookmark: Option<String> = None;
        let mut args = Arguments::new(&self.arguments);
        while let Some(arg) = args.next() {
            match arg {
                Argument::Switch('l') => bookmark = args.next_value(),
                // Switches with a value: tooltip, target frame
                Argument::Switch('o' | 't') => {
                    args.next_value();
                },
                Argument::Switch(_) => {},
                Argument::Value(value) if url.is_none() => url = Some(value),
                Argument::Value(_) => {},
            }
        }

        match (url, bookmark) {
            (Some(url), Some(bookmark)) => Some(format!("{}#{}", url, bookmark)),
            (Some(url), None) => Some(url),
            (None, Some(bookmark)) => Some(format!("#{}", bookmark)),
            (None, None) => None,
        }
        .filter(|target| !target.is_empty())
    }
}

enum Argument {
    Switch(char),
    Value(String),
}

/// Splits field arguments into quoted/bare values and `\x` switches.
struct Arguments<'a> {
    rest: &'a str,
}

impl<'a> Arguments<'a> {
    fn new(arguments: &'a str) -> Self {
        Self { rest: arguments }
    }

    fn next_value(&mut self) -> Option<String> {
        match self.next()? {
            Argument::Value(value) => Some(value),
            Argument::Switch(_) => None,
        }
    }
}

impl Iterator for Arguments<'_> {
    type Item = Argument;

    fn next(&mut self) -> Option<Argument> {
        self.rest = self.rest.trim_start();
        let mut chars = self.rest.chars();
        match chars.next()? {
            '\\' => {
                let switch = chars.next().unwrap_or(' ');
                self.rest = chars.as_str();
                Some(Argument::Switch(switch))
            },
            '"' => {
                let body = chars.as_str();
                let end = body.find('"').unwrap_or(body.len());
                self.rest = body.get(end + 1..).unwrap_or("");
                Some(Argument::Value(body[..end].to_string()))
            },
            _ => {
                let end = self
                    .rest
                    .find(char::is_whitespace)
                    .unwrap_or(self.rest.len());
                let value = self.rest[..end].to_string();
                self.rest = &self.rest[end..];
                Some(Argument::Value(value))
            },
        }
    }
}
