//! Scope-local character formatting.
//!
//! RTF formatting is inherited by nested groups and reverts when a group
//! closes. The interpreter clones the current [`CharState`] on every group
//! entry, so changes inside a group never leak to its siblings or parent.

use super::lexer::ControlWord;
use super::metadata::{ColorTable, FontTable};
use crate::document::Formatting;
use bitflags::bitflags;
use std::rc::Rc;

bitflags! {
    /// Boolean character properties
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CharFlags: u8 {
        /// Bold
        const BOLD = 0x01;
        /// Italic
        const ITALIC = 0x02;
        /// Underline, any style
        const UNDERLINE = 0x04;
        /// Single or double strikethrough
        const STRIKE = 0x08;
        /// Subscript
        const SUBSCRIPT = 0x10;
        /// Superscript
        const SUPERSCRIPT = 0x20;
    }
}

/// Character formatting state of one scope.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CharState {
    pub flags: CharFlags,
    pub font: Option<Rc<str>>,
    /// Size in points
    pub size: Option<f32>,
    pub color: Option<Rc<str>>,
    pub background: Option<Rc<str>>,
}

impl Default for CharState {
    fn default() -> Self {
        Self {
            flags: CharFlags::empty(),
            font: None,
            size: None,
            color: None,
            background: None,
        }
    }
}

impl CharState {
    /// Apply a character formatting control word.
    ///
    /// Returns `false` when the word is not a character property.
    pub fn apply(&mut self, cw: &ControlWord<'_>, fonts: &FontTable, colors: &ColorTable) -> bool {
        let on = cw.is_on();
        match cw.name {
            "b" => self.flags.set(CharFlags::BOLD, on),
            "i" => self.flags.set(CharFlags::ITALIC, on),
            "strike" | "striked" => self.flags.set(CharFlags::STRIKE, on),
            "ulnone" => self.flags.remove(CharFlags::UNDERLINE),
            "ul" | "uld" | "uldash" | "uldashd" | "uldashdd" | "uldb" | "ulhwave" | "ulldash"
            | "ulth" | "ulthd" | "ulthdash" | "ulthdashd" | "ulthdashdd" | "ulthldash"
            | "ululdbwave" | "ulw" | "ulwave" => self.flags.set(CharFlags::UNDERLINE, on),
            "sub" => self.set_script(CharFlags::SUBSCRIPT, on),
            "super" => self.set_script(CharFlags::SUPERSCRIPT, on),
            "nosupersub" => self
                .flags
                .remove(CharFlags::SUBSCRIPT | CharFlags::SUPERSCRIPT),
            "plain" => self.plain(),
            "fs" => {
                self.size = cw
                    .param
                    .filter(|&half_points| half_points > 0)
                    .map(|half_points| half_points as f32 / 2.0);
            },
            "f" => self.font = cw.param.and_then(|i| fonts.name(i)).map(Rc::from),
            "cf" => self.color = cw.param.and_then(|i| colors.hex(i)).map(Rc::from),
            "cb" | "highlight" | "chcbpat" => {
                self.background = cw.param.and_then(|i| colors.hex(i)).map(Rc::from)
            },
            _ => return false,
        }
        true
    }

    /// Subscript and superscript exclude each other.
    fn set_script(&mut self, flag: CharFlags, on: bool) {
        if on {
            self.flags
                .remove(CharFlags::SUBSCRIPT | CharFlags::SUPERSCRIPT);
        }
        self.flags.set(flag, on);
    }

    /// `\plain`: reset every character property.
    pub fn plain(&mut self) {
        *self = Self::default();
    }

    /// Formatting record for a text run.
    ///
    /// `paragraph_background` (`\cbpat`) applies when the run has no
    /// character background of its own.
    pub fn snapshot(&self, paragraph_background: Option<&Rc<str>>) -> Option<Formatting> {
        let formatting = Formatting {
            bold: self.flags.contains(CharFlags::BOLD),
            italic: self.flags.contains(CharFlags::ITALIC),
            underline: self.flags.contains(CharFlags::UNDERLINE),
            strikethrough: self.flags.contains(CharFlags::STRIKE),
            subscript: self.flags.contains(CharFlags::SUBSCRIPT),
            superscript: self.flags.contains(CharFlags::SUPERSCRIPT),
            font: self.font.as_deref().map(str::to_string),
            size: self.size,
            color: self.color.as_deref().map(str::to_string),
            background_color: self
                .background
                .as_ref()
                .or(paragraph_background)
                .map(|c| c.to_string()),
        };
        (!formatting.is_empty()).then_some(formatting)
    }
}
