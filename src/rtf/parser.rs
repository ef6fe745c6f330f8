//! Semantic interpreter that builds the content tree from the token tree.
//!
//! The walk is a recursive descent over groups. Character formatting is a
//! value passed down by clone, so it reverts when a group closes. Everything
//! that outlives a group (paragraph under construction, table stack, list
//! registry, hyperlink target, output sequences) lives on [`Interpreter`].

use super::field::FieldInstruction;
use super::formatting::CharState;
use super::lexer::{ControlWord, Group, Token};
use super::list::{ListRegistry, classify_marker, legacy_numbering_type, number_format_type};
use super::lookup::{
    CONTROL_CHARACTERS, IGNORABLE_ALLOWED, IGNORABLE_WITH_ATTACHMENTS, IGNORED_DESTINATIONS,
};
use super::metadata::{ColorTable, FontTable, extract_color_table, extract_font_table};
use super::paragraph::ParagraphState;
use super::picture::read_picture;
use super::raw::{write_control, write_group, write_text};
use super::table::TableContext;
use crate::document::{
    Alignment, Attachment, ContentNode, EngineOutput, Link, ListType, ParseOptions,
};
use std::rc::Rc;

/// Interpret a token tree.
///
/// Returns the engine output together with the font and color tables
/// mined from the tree.
pub(crate) fn interpret(
    root: &Group<'_>,
    options: &ParseOptions,
) -> (EngineOutput, FontTable, ColorTable) {
    let fonts = extract_font_table(root);
    let colors = extract_color_table(root);
    let mut interpreter = Interpreter::new(options, fonts, colors);
    interpreter.strict_tables = uses_nesting_words(root);
    interpreter.walk_group(root, CharState::default());
    interpreter.finish()
}

/// Whether the document marks nested tables explicitly (RTF 1.6+).
fn uses_nesting_words(root: &Group<'_>) -> bool {
    let mut stack = vec![root];
    while let Some(group) = stack.pop() {
        if group.destination == Some("nesttableprops") {
            return true;
        }
        for token in &group.children {
            match token {
                Token::Control(cw) if matches!(cw.name, "nestcell" | "nestrow") => return true,
                Token::Group(nested) => stack.push(nested),
                _ => {},
            }
        }
    }
    false
}

/// Text of a field instruction, leaving out nested ignorable groups.
fn instruction_text(group: &Group<'_>, out: &mut String) {
    for token in &group.children {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Group(nested) if !nested.ignorable => instruction_text(nested, out),
            _ => {},
        }
    }
}

/// Interpreter state for one parse.
pub(crate) struct Interpreter<'o> {
    pub(super) options: &'o ParseOptions,
    fonts: FontTable,
    colors: ColorTable,
    lists: ListRegistry,
    /// Current body target; swapped out while a note is walked
    pub(super) content: Vec<ContentNode>,
    pub(super) notes: Vec<ContentNode>,
    attachments: Vec<Attachment>,
    pub(super) para: ParagraphState,
    /// One context per table nesting level, innermost last
    pub(super) tables: Vec<TableContext>,
    /// Nesting comes from `\itap` / `\nestcell` / `\nestrow` instead of the
    /// `\trowd` heuristic
    strict_tables: bool,
    /// Target of the enclosing hyperlink field
    pub(super) link: Option<Link>,
    /// Document-wide `\fet` setting
    pub(super) note_placement: i32,
    pub(super) footnote_count: usize,
    pub(super) endnote_count: usize,
    picture_count: usize,
    /// High surrogate waiting for its low half
    pending_high: Option<u32>,
}

impl<'o> Interpreter<'o> {
    fn new(options: &'o ParseOptions, fonts: FontTable, colors: ColorTable) -> Self {
        Self {
            options,
            fonts,
            colors,
            lists: ListRegistry::default(),
            content: Vec::new(),
            notes: Vec::new(),
            attachments: Vec::new(),
            para: ParagraphState::default(),
            tables: Vec::new(),
            strict_tables: false,
            link: None,
            note_placement: 0,
            footnote_count: 0,
            endnote_count: 0,
            picture_count: 0,
            pending_high: None,
        }
    }

    fn finish(mut self) -> (EngineOutput, FontTable, ColorTable) {
        self.finalize_paragraph();
        self.close_tables();
        let output = EngineOutput {
            content: self.content,
            notes: self.notes,
            attachments: self.attachments,
        };
        (output, self.fonts, self.colors)
    }

    #[inline]
    fn raw_enabled(&self) -> bool {
        self.options.include_raw_content
    }

    /// Walk the children of `group` in a scope starting with `fmt`.
    pub(super) fn walk_group(&mut self, group: &Group<'_>, fmt: CharState) {
        let inherited = fmt.clone();
        let mut fmt = fmt;
        for token in &group.children {
            match token {
                Token::Text(text) => self.on_text(text, &fmt),
                Token::Control(cw) => self.on_control(cw, &mut fmt, &inherited),
                Token::Group(child) => self.on_group(child, &fmt),
            }
        }
    }

    /// Walk a nested group as an ordinary scope.
    fn descend(&mut self, group: &Group<'_>, fmt: &CharState) {
        if self.raw_enabled() {
            self.para.raw.push('{');
        }
        self.walk_group(group, fmt.clone());
        if self.raw_enabled() {
            self.para.raw.push('}');
        }
    }

    fn on_group(&mut self, group: &Group<'_>, fmt: &CharState) {
        match group.destination {
            Some("footnote") => return self.on_footnote(group, fmt),
            Some("field") => return self.on_field(group, fmt),
            _ => {},
        }
        if !self.route_group(group, fmt) {
            self.descend(group, fmt);
            return;
        }
        if self.raw_enabled() {
            write_group(group, &mut self.para.raw);
        }
    }

    /// Handle a group by its destination.
    ///
    /// Returns `false` when the group is ordinary content to descend into.
    fn route_group(&mut self, group: &Group<'_>, fmt: &CharState) -> bool {
        match group.destination {
            Some("listtext" | "pntext") => {
                if let Some(kind) = classify_marker(&group.flat_text()) {
                    self.para.marker = Some(kind);
                }
            },
            Some("listtable") => {
                self.lists.read_list_table(group);
                if let Some(pictures) = group.find_destination("listpicture") {
                    self.on_list_pictures(pictures);
                }
            },
            Some("listoverridetable") => self.lists.read_override_table(group),
            Some("listpicture") => self.on_list_pictures(group),
            Some("pict") => {
                if self.options.extract_attachments {
                    self.on_picture(group, true);
                }
            },
            Some("pn") => {
                let mut scratch = fmt.clone();
                for token in &group.children {
                    if let Token::Control(cw) = token {
                        self.dispatch_control(cw, &mut scratch, fmt);
                    }
                }
            },
            // Read by the enclosing field
            Some("fldinst") => {},
            Some(name) if IGNORED_DESTINATIONS.contains(name) => {},
            _ if group.ignorable => return !self.walks_ignorable(group.destination),
            _ => return false,
        }
        true
    }

    fn walks_ignorable(&self, destination: Option<&str>) -> bool {
        destination.is_some_and(|name| {
            IGNORABLE_ALLOWED.contains(name)
                || (self.options.extract_attachments && IGNORABLE_WITH_ATTACHMENTS.contains(name))
        })
    }

    /// `{\field{\*\fldinst ...}{\fldrslt ...}}`: walk the result with the
    /// instruction's hyperlink attached to every run.
    fn on_field(&mut self, group: &Group<'_>, fmt: &CharState) {
        let saved = self.link.clone();
        if let Some(instruction) = group.groups().find(|g| g.destination == Some("fldinst")) {
            let mut text = String::new();
            instruction_text(instruction, &mut text);
            if let Some(target) = FieldInstruction::parse(&text).hyperlink_target() {
                self.link = Some(Link::new(target));
            }
        }
        self.descend(group, fmt);
        self.link = saved;
    }

    fn on_list_pictures(&mut self, group: &Group<'_>) {
        if !self.options.extract_attachments {
            return;
        }
        let mut stack = vec![group];
        let mut pictures = Vec::new();
        while let Some(current) = stack.pop() {
            if current.destination == Some("pict") {
                pictures.push(current);
                continue;
            }
            let nested: Vec<_> = current.groups().collect();
            stack.extend(nested.into_iter().rev());
        }
        for picture in pictures {
            self.on_picture(picture, false);
        }
    }

    /// Extract a picture; `inline` also places an image node in the paragraph.
    fn on_picture(&mut self, group: &Group<'_>, inline: bool) {
        match read_picture(group) {
            Ok(Some(picture)) => {
                self.picture_count += 1;
                let name = format!("image{}.{}", self.picture_count, picture.format.extension());
                if inline {
                    self.para
                        .push_inline(ContentNode::image(&name, picture.format.mime_type()));
                }
                let twips = |value: Option<i32>| value.and_then(|v| u32::try_from(v).ok());
                let (width, height) = (
                    twips(picture.computed_width()),
                    twips(picture.computed_height()),
                );
                self.attachments.push(
                    Attachment::image(picture.format, name, picture.data).with_size(width, height),
                );
            },
            Ok(None) => {},
            Err(err) => log::warn!("Dropping picture with invalid payload: {}", err),
        }
    }

    fn on_text(&mut self, text: &str, fmt: &CharState) {
        if self.raw_enabled() {
            write_text(text, &mut self.para.raw);
        }
        self.emit_text(text, fmt);
    }

    fn emit_text(&mut self, text: &str, fmt: &CharState) {
        if text.is_empty() {
            return;
        }
        self.flush_orphan_surrogate(fmt);
        self.append_text(text, fmt);
    }

    fn append_text(&mut self, text: &str, fmt: &CharState) {
        let formatting = fmt.snapshot(self.para.background.as_ref());
        self.para.push_text(text, formatting, self.link.as_ref());
    }

    fn flush_orphan_surrogate(&mut self, fmt: &CharState) {
        if self.pending_high.take().is_some() {
            self.append_text("\u{FFFD}", fmt);
        }
    }

    /// Append one UTF-16 code unit from `\uN`, pairing surrogates.
    fn push_code_unit(&mut self, unit: u32, fmt: &CharState) {
        let c = match unit {
            0xD800..=0xDBFF => {
                self.flush_orphan_surrogate(fmt);
                self.pending_high = Some(unit);
                return;
            },
            0xDC00..=0xDFFF => match self.pending_high.take() {
                Some(high) => char::from_u32(0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00)),
                None => None,
            },
            _ => char::from_u32(unit),
        };
        let mut buf = [0u8; 4];
        self.emit_text(c.unwrap_or('\u{FFFD}').encode_utf8(&mut buf), fmt);
    }

    fn on_control(&mut self, cw: &ControlWord<'_>, fmt: &mut CharState, inherited: &CharState) {
        if self.raw_enabled() {
            write_control(cw, &mut self.para.raw);
        }
        self.dispatch_control(cw, fmt, inherited);
    }

    fn dispatch_control(&mut self, cw: &ControlWord<'_>, fmt: &mut CharState, inherited: &CharState) {
        if fmt.apply(cw, &self.fonts, &self.colors) {
            return;
        }
        if let Some(text) = CONTROL_CHARACTERS.get(cw.name) {
            self.emit_text(text, fmt);
            return;
        }

        match cw.name {
            "par" => {
                self.finalize_paragraph();
                *fmt = inherited.clone();
            },
            "sect" => self.finalize_paragraph(),
            "pard" => self.para.reset_properties(),
            // The lexer already dropped the fallback that follows
            "u" => {
                if let Some(param) = cw.param {
                    // Negative values are the signed form of 16-bit units
                    self.push_code_unit(param.rem_euclid(0x1_0000) as u32, fmt);
                }
            },

            // Paragraph formatting
            "ql" => self.para.alignment = Some(Alignment::Left),
            "qc" => self.para.alignment = Some(Alignment::Center),
            "qr" => self.para.alignment = Some(Alignment::Right),
            "qj" => self.para.alignment = Some(Alignment::Justify),
            "li" => self.para.left_indent = cw.param.unwrap_or(0),
            "s" => {
                self.para.heading = cw
                    .param
                    .and_then(|style| u8::try_from(style).ok())
                    .filter(|level| (1..=self.options.max_heading_level).contains(level));
            },
            "cbpat" => {
                self.para.background = cw.param.and_then(|i| self.colors.hex(i)).map(Rc::from);
            },

            // Lists
            "ls" => {
                if let Some(ls) = cw.param.filter(|&ls| ls > 0) {
                    let (id, kind) = self.lists.resolve(ls);
                    self.para.list_id = Some(id);
                    if let Some(kind) = kind {
                        self.para.force_list_type(kind);
                    }
                    self.para.is_list_item = true;
                }
            },
            "ilvl" => {
                self.para.list_level = Some(cw.param.unwrap_or(0).max(0) as u32);
                self.para.is_list_item = true;
            },
            "pnlvl" => {
                self.para.list_level = Some((cw.param.unwrap_or(1) - 1).max(0) as u32);
                self.para.is_list_item = true;
            },
            "pnlvlblt" => {
                self.para.list_level = Some(0);
                self.para.force_list_type(ListType::Unordered);
                self.para.is_list_item = true;
            },
            "pnlvlbody" => self.para.is_list_item = true,
            "pnf" | "levelnfc" | "levelnfcn" => {
                if let Some(code) = cw.param {
                    self.para.suggested_type = Some(number_format_type(code));
                }
            },

            // Tables
            "intbl" => self.para.in_table = true,
            "itap" => {
                if self.strict_tables {
                    let level = cw.param.unwrap_or(1).max(0) as u32;
                    self.para.nest_level = Some(level);
                    self.para.in_table = level > 0;
                }
            },
            "trowd" => self.on_row_definition(),
            "cellx" => {
                if let Some(table) = self.tables.last_mut() {
                    table.define_cell();
                }
            },
            "clvmrg" | "clmrg" => {
                if let Some(table) = self.tables.last_mut() {
                    table.mark_merge_continuation();
                }
            },
            "cell" => self.on_cell(false),
            "nestcell" => self.on_cell(true),
            "row" => self.on_row(false),
            "nestrow" => self.on_row(true),

            // Notes
            "fet" => self.note_placement = cw.param.unwrap_or(0),

            name => {
                if let Some(kind) = legacy_numbering_type(name) {
                    self.para.force_list_type(kind);
                }
            },
        }
    }

    /// Finish the current paragraph and place it in the current target.
    pub(super) fn finalize_paragraph(&mut self) {
        self.pending_high = None;
        let level = self.paragraph_table_level();
        if level == 0 && !self.tables.is_empty() {
            log::debug!("Closing open table at a paragraph outside of it");
            self.close_tables();
        }
        if let Some(node) = self.para.take_block(self.options, &mut self.lists) {
            self.place_block(node, level);
        }
    }

    /// Table nesting level of the current paragraph; 0 outside tables.
    pub(super) fn paragraph_table_level(&self) -> usize {
        match self.para.nest_level {
            Some(level) if self.strict_tables => level as usize,
            _ => usize::from(self.para.in_table),
        }
    }

    /// Append a finished block at table nesting `level` (0 for the body).
    pub(super) fn place_block(&mut self, node: ContentNode, level: usize) {
        if level == 0 {
            self.content.push(node);
            return;
        }
        if self.strict_tables {
            self.ensure_depth(level);
        } else {
            self.close_finished_nested();
            self.ensure_depth(self.tables.len().max(1));
        }
        if let Some(table) = self.tables.last_mut() {
            table.push_block(node);
        }
    }

    /// `\trowd`.
    fn on_row_definition(&mut self) {
        if self.strict_tables {
            self.ensure_depth(self.paragraph_table_level().max(1));
            if let Some(table) = self.tables.last_mut() {
                table.define_row();
            }
            return;
        }

        // Text already in the open cell belongs before a nested table.
        if self.para.in_table && self.para.has_content() && !self.tables.is_empty() {
            self.finalize_paragraph();
        }
        match self.tables.last_mut() {
            Some(table) if !table.has_pending_content() => table.define_row(),
            _ => self
                .tables
                .push(TableContext::new(self.options.include_raw_content)),
        }
    }

    /// `\cell` / `\nestcell`.
    fn on_cell(&mut self, nested: bool) {
        self.para.in_table = true;
        let level = self.boundary_level(nested);
        if self.strict_tables {
            self.para.nest_level = Some(level as u32);
        }
        self.finalize_paragraph();
        if self.strict_tables {
            self.ensure_depth(level);
        } else {
            self.close_finished_nested();
            self.ensure_depth(self.tables.len().max(1));
        }
        if let Some(table) = self.tables.last_mut() {
            table.end_cell();
        }
    }

    /// `\row` / `\nestrow`.
    fn on_row(&mut self, nested: bool) {
        let level = self.boundary_level(nested);
        if self.para.has_content() {
            self.para.in_table = true;
            self.finalize_paragraph();
        }
        if self.strict_tables {
            self.ensure_depth(level);
        } else {
            self.close_finished_nested();
        }
        if let Some(table) = self.tables.last_mut() {
            table.end_row();
        }
    }

    /// Nesting level a cell or row boundary applies to in strict mode.
    fn boundary_level(&self, nested: bool) -> usize {
        if !nested {
            return 1;
        }
        match self.para.nest_level {
            Some(level) if level >= 2 => level as usize,
            _ => self.tables.len().max(2),
        }
    }

    /// Open or close tables until exactly `level` are open.
    fn ensure_depth(&mut self, level: usize) {
        while self.tables.len() > level {
            self.close_top_table();
        }
        while self.tables.len() < level {
            self.tables
                .push(TableContext::new(self.options.include_raw_content));
        }
    }

    /// Close inner tables whose last row has ended.
    fn close_finished_nested(&mut self) {
        while self.tables.len() > 1 && self.tables.last().is_some_and(|t| !t.is_row_open()) {
            self.close_top_table();
        }
    }

    fn close_top_table(&mut self) {
        if let Some(table) = self.tables.pop()
            && let Some(node) = table.finish()
        {
            match self.tables.last_mut() {
                Some(parent) => parent.push_block(node),
                None => self.content.push(node),
            }
        }
    }

    pub(super) fn close_tables(&mut self) {
        while !self.tables.is_empty() {
            self.close_top_table();
        }
    }
}
