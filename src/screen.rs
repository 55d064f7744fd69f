// Copyright 2025 The devcon-term Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cursor, modes, SGR and charset state: the glue that drives a [`Page`]
//! from the parser's classified sequences. This isn't part of the core's
//! narrow contract (the spec treats rendering and input as external
//! collaborators) but every core needs *something* consuming parser
//! output to be exercisable end to end, so this module plays that role
//! for tests the way the upstream crate's own terminal-state module does.

use crate::attrs::{Attr, Color};
use crate::char::Char;
use crate::error::Result;
use crate::history::History;
use crate::page::Page;
use crate::parser::{Command, Parser, SeqType};
use crate::utf8::Utf8Decoder;
use crate::Size;

#[derive(Clone, Copy, Default)]
struct SavedCursor {
    x: usize,
    y: usize,
    attr: Attr,
}

pub struct Screen {
    page: Page,
    history: History,
    parser: Parser,
    decoder: Utf8Decoder,
    cursor_x: usize,
    cursor_y: usize,
    attr: Attr,
    insert_mode: bool,
    saved: SavedCursor,
    age: u64,
}

impl Screen {
    pub fn new(size: Size, scrollback_lines: usize) -> Result<Screen> {
        let page = Page::new(size.width, size.height, Attr::default())?;
        Ok(Screen {
            page,
            history: History::new(scrollback_lines),
            parser: Parser::new(),
            decoder: Utf8Decoder::new(),
            cursor_x: 0,
            cursor_y: 0,
            attr: Attr::default(),
            insert_mode: false,
            saved: SavedCursor::default(),
            age: 0,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_x, self.cursor_y)
    }

    pub fn resize(&mut self, size: Size) -> Result<()> {
        self.page.resize(size.width, size.height, self.attr, self.age, Some(&mut self.history))?;
        self.cursor_x = self.cursor_x.min(size.width.saturating_sub(1));
        self.cursor_y = self.cursor_y.min(size.height.saturating_sub(1));
        Ok(())
    }

    /// Feeds a raw byte stream: UTF-8 decode, then parser feed, then
    /// dispatch each completed sequence against the page.
    pub fn process(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            let points = self.decoder.feed(byte);
            for point in points {
                self.age += 1;
                let age = self.age;
                let (seq_command, seq_type, terminator, args0, args1, charset) = {
                    let (seq, ty) = self.parser.feed(point);
                    match seq {
                        Some(seq) => (
                            seq.command,
                            ty,
                            seq.terminator,
                            seq.arg_or(0, -1),
                            seq.arg_or(1, -1),
                            seq.charset,
                        ),
                        None => continue,
                    }
                };
                self.dispatch(seq_type, seq_command, terminator, args0, args1, charset, age);
            }
        }
    }

    fn line_advance(&mut self, age: u64) {
        let (idx, num) = self.page.scroll_region();
        if self.cursor_y + 1 >= idx + num {
            self.page.scroll_up(1, self.attr, age, Some(&mut self.history));
        } else {
            self.cursor_y += 1;
        }
    }

    fn dispatch(
        &mut self,
        ty: SeqType,
        command: Option<Command>,
        terminator: u32,
        arg0: i32,
        arg1: i32,
        _charset: Option<u8>,
        age: u64,
    ) {
        match ty {
            SeqType::Graphic => self.put_graphic(terminator, age),
            SeqType::Control => self.control(command, age),
            SeqType::Escape => self.escape(command, age),
            SeqType::Csi => self.csi(command, arg0, arg1, age),
            SeqType::Dcs | SeqType::Osc | SeqType::Ignore => {}
        }
    }

    fn put_graphic(&mut self, ucs4: u32, age: u64) {
        let width = self.page.width();
        if width == 0 {
            return;
        }
        let ch = Char::from(char::from_u32(ucs4).unwrap_or('\u{FFFD}'));
        let cwidth = ch.lookup_width().clamp(0, 2) as u8;
        if self.cursor_x + (cwidth.max(1) as usize) > width {
            self.cursor_x = 0;
            self.line_advance(age);
        }
        self.page.write(self.cursor_x, self.cursor_y, ch, cwidth, self.attr, age, self.insert_mode);
        self.cursor_x = (self.cursor_x + cwidth.max(1) as usize).min(width);
    }

    fn control(&mut self, command: Option<Command>, age: u64) {
        match command {
            Some(Command::CarriageReturn) => self.cursor_x = 0,
            Some(Command::LineFeed) | Some(Command::VerticalTab) | Some(Command::FormFeed) => {
                self.line_advance(age)
            }
            Some(Command::Backspace) => self.cursor_x = self.cursor_x.saturating_sub(1),
            Some(Command::Tab) => {
                let width = self.page.width().max(1);
                self.cursor_x = ((self.cursor_x / 8) + 1) * 8;
                self.cursor_x = self.cursor_x.min(width - 1);
            }
            _ => {}
        }
    }

    fn escape(&mut self, command: Option<Command>, age: u64) {
        match command {
            Some(Command::Ris) => {
                self.attr = Attr::default();
                self.cursor_x = 0;
                self.cursor_y = 0;
                self.page.reset(self.attr, age);
            }
            Some(Command::Ind) => self.line_advance(age),
            Some(Command::Nel) => {
                self.cursor_x = 0;
                self.line_advance(age);
            }
            Some(Command::Ri) => {
                let (idx, _) = self.page.scroll_region();
                if self.cursor_y == idx {
                    self.page.scroll_down(1, self.attr, age, Some(&mut self.history));
                } else {
                    self.cursor_y = self.cursor_y.saturating_sub(1);
                }
            }
            Some(Command::Decsc) => {
                self.saved = SavedCursor { x: self.cursor_x, y: self.cursor_y, attr: self.attr };
            }
            Some(Command::Decrc) => {
                self.cursor_x = self.saved.x;
                self.cursor_y = self.saved.y;
                self.attr = self.saved.attr;
            }
            _ => {}
        }
    }

    fn csi(&mut self, command: Option<Command>, arg0: i32, arg1: i32, age: u64) {
        let width = self.page.width();
        let height = self.page.height();
        let n = |v: i32| if v <= 0 { 1usize } else { v as usize };
        match command {
            Some(Command::Cup) => {
                self.cursor_y = (n(arg0) - 1).min(height.saturating_sub(1));
                self.cursor_x = (n(arg1) - 1).min(width.saturating_sub(1));
            }
            Some(Command::Cuu) => self.cursor_y = self.cursor_y.saturating_sub(n(arg0)),
            Some(Command::Cud) => self.cursor_y = (self.cursor_y + n(arg0)).min(height.saturating_sub(1)),
            Some(Command::Cuf) => self.cursor_x = (self.cursor_x + n(arg0)).min(width.saturating_sub(1)),
            Some(Command::Cub) => self.cursor_x = self.cursor_x.saturating_sub(n(arg0)),
            Some(Command::Cnl) => {
                self.cursor_x = 0;
                self.cursor_y = (self.cursor_y + n(arg0)).min(height.saturating_sub(1));
            }
            Some(Command::Cpl) => {
                self.cursor_x = 0;
                self.cursor_y = self.cursor_y.saturating_sub(n(arg0));
            }
            Some(Command::Cha) => self.cursor_x = (n(arg0) - 1).min(width.saturating_sub(1)),
            Some(Command::Ed) => {
                let (fx, fy, tx, ty) = match arg0 {
                    1 => (0, 0, self.cursor_x, self.cursor_y),
                    2 | 3 => (0, 0, width.saturating_sub(1), height.saturating_sub(1)),
                    _ => (self.cursor_x, self.cursor_y, width.saturating_sub(1), height.saturating_sub(1)),
                };
                self.page.erase(fx, fy, tx, ty, self.attr, age, false);
                if arg0 == 3 {
                    self.history.clear();
                }
            }
            Some(Command::El) => {
                let (fx, tx) = match arg0 {
                    1 => (0, self.cursor_x),
                    2 => (0, width.saturating_sub(1)),
                    _ => (self.cursor_x, width.saturating_sub(1)),
                };
                self.page.erase(fx, self.cursor_y, tx, self.cursor_y, self.attr, age, false);
            }
            Some(Command::Il) => self.page.insert_lines(self.cursor_y, n(arg0), self.attr, age),
            Some(Command::Dl) => self.page.delete_lines(self.cursor_y, n(arg0), self.attr, age),
            Some(Command::Ich) => self.page.insert_cells(self.cursor_x, self.cursor_y, n(arg0), self.attr, age),
            Some(Command::Dch) => self.page.delete_cells(self.cursor_x, self.cursor_y, n(arg0), self.attr, age),
            Some(Command::Su) => self.page.scroll_up(n(arg0), self.attr, age, Some(&mut self.history)),
            Some(Command::Sd) => self.page.scroll_down(n(arg0), self.attr, age, Some(&mut self.history)),
            Some(Command::Decstbm) => {
                let top = n(arg0).saturating_sub(1);
                let bottom = if arg1 <= 0 { height } else { (arg1 as usize).min(height) };
                self.page.set_scroll_region(top, bottom.saturating_sub(top));
                self.cursor_x = 0;
                self.cursor_y = 0;
            }
            // This glue layer doesn't track DECLRMM mode, so the
            // DECSLRM/SC ambiguity always resolves to save-cursor, which
            // matches every terminal's power-on default (DECLRMM off).
            Some(Command::DecslrmOrSc) => {
                self.saved = SavedCursor { x: self.cursor_x, y: self.cursor_y, attr: self.attr };
            }
            Some(Command::Rc) => {
                self.cursor_x = self.saved.x;
                self.cursor_y = self.saved.y;
                self.attr = self.saved.attr;
            }
            Some(Command::Sgr) => self.sgr(arg0),
            _ => {}
        }
    }

    fn sgr(&mut self, arg0: i32) {
        match arg0 {
            -1 | 0 => self.attr = Attr::default(),
            1 => self.attr.bold = true,
            3 => self.attr.italic = true,
            4 => self.attr.underline = true,
            5 => self.attr.blink = true,
            7 => self.attr.inverse = true,
            8 => self.attr.hidden = true,
            9 => self.attr.strikethrough = true,
            22 => self.attr.bold = false,
            23 => self.attr.italic = false,
            24 => self.attr.underline = false,
            25 => self.attr.blink = false,
            27 => self.attr.inverse = false,
            28 => self.attr.hidden = false,
            29 => self.attr.strikethrough = false,
            30..=37 => self.attr.fg = Color::Named((arg0 - 30) as u8),
            39 => self.attr.fg = Color::Default,
            40..=47 => self.attr.bg = Color::Named((arg0 - 40) as u8),
            49 => self.attr.bg = Color::Default,
            90..=97 => self.attr.fg = Color::Named((arg0 - 90 + 8) as u8),
            100..=107 => self.attr.bg = Color::Named((arg0 - 100 + 8) as u8),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_row_chars(s: &Screen) -> String {
        s.page()
            .line(0)
            .unwrap()
            .cells()
            .iter()
            .take_while(|c| !c.is_empty())
            .map(|c| c.ch.resolve().first().map(|&u| char::from_u32(u).unwrap_or(' ')).unwrap_or(' '))
            .collect()
    }

    #[test]
    fn writes_plain_text() {
        let mut s = Screen::new(Size { width: 10, height: 5 }, 10).unwrap();
        s.process(b"hello");
        assert_eq!(first_row_chars(&s), "hello");
        assert_eq!(s.cursor(), (5, 0));
    }

    #[test]
    fn crlf_moves_to_next_line() {
        let mut s = Screen::new(Size { width: 10, height: 5 }, 10).unwrap();
        s.process(b"ab\r\ncd");
        assert_eq!(s.cursor(), (2, 1));
    }

    #[test]
    fn cup_moves_cursor() {
        let mut s = Screen::new(Size { width: 10, height: 5 }, 10).unwrap();
        s.process(b"\x1b[3;4H");
        assert_eq!(s.cursor(), (3, 2));
    }

    #[test]
    fn sgr_bold_then_reset() {
        let mut s = Screen::new(Size { width: 10, height: 5 }, 10).unwrap();
        s.process(b"\x1b[1mX\x1b[0mY");
        let row = s.page().line(0).unwrap();
        assert!(row.cell(0).unwrap().attr.bold);
        assert!(!row.cell(1).unwrap().attr.bold);
    }

    #[test]
    fn ris_clears_screen_and_homes_cursor() {
        let mut s = Screen::new(Size { width: 10, height: 5 }, 10).unwrap();
        s.process(b"hello\x1bc");
        assert_eq!(s.cursor(), (0, 0));
        assert!(s.page().line(0).unwrap().cell(0).unwrap().is_empty());
    }

    #[test]
    fn utf8_fallback_inside_escape_scenario_f() {
        // 0xC3 0x28 is a malformed continuation; it should fall back to
        // two Latin-1 code points rather than eating the following ESC c.
        let mut s = Screen::new(Size { width: 10, height: 5 }, 10).unwrap();
        s.process(&[0xC3, 0x28, 0x1B, b'c']);
        assert_eq!(s.cursor(), (0, 0));
    }
}
