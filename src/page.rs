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

//! The 2-D cell grid: an array of [`Line`]s plus a scroll region. Lines are
//! exchanged with a [`History`] by ownership transfer (moved, never
//! copied) as the scroll region rolls up and down.

use crate::attrs::Attr;
use crate::cell::Cell;
use crate::char::Char;
use crate::error::{Error, Result};
use crate::history::History;
use crate::line::Line;

pub struct Page {
    lines: Vec<Line>,
    width: usize,
    height: usize,
    scroll_idx: usize,
    scroll_num: usize,
    scroll_fill: usize,
    pub age: u64,
}

impl Page {
    pub fn new(cols: usize, rows: usize, attr: Attr) -> Result<Page> {
        let mut page = Page {
            lines: Vec::new(),
            width: 0,
            height: 0,
            scroll_idx: 0,
            scroll_num: 0,
            scroll_fill: 0,
            age: 0,
        };
        page.reserve(cols, rows, attr, 0)?;
        page.width = cols;
        page.height = rows;
        page.scroll_idx = 0;
        page.scroll_num = rows;
        for line in page.lines.iter_mut().take(rows) {
            line.set_width(cols);
        }
        Ok(page)
    }

    pub fn free(self) {}

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn n_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn scroll_region(&self) -> (usize, usize) {
        (self.scroll_idx, self.scroll_num)
    }

    pub fn scroll_fill(&self) -> usize {
        self.scroll_fill
    }

    pub fn line(&self, y: usize) -> Option<&Line> {
        if y >= self.height {
            return None;
        }
        self.lines.get(y)
    }

    /// Ensures `n_lines >= rows` and that each of the first `min(n_lines,
    /// rows)` lines has `n_cells >= cols`. Lines inside the current visible
    /// region protect their existing content up to the current page width;
    /// lines beyond it, and newly created lines, protect nothing.
    pub fn reserve(&mut self, cols: usize, rows: usize, attr: Attr, age: u64) -> Result<()> {
        let n_lines = self.lines.len();
        let visible = self.height;
        for (i, line) in self.lines.iter_mut().enumerate().take(n_lines.min(rows)) {
            let protect_width = if i < visible { self.width } else { 0 };
            line.reserve(cols, attr, age, protect_width)?;
        }
        if rows > n_lines {
            self.lines
                .try_reserve(rows - n_lines)
                .map_err(|_| Error::OutOfMemory)?;
            for _ in n_lines..rows {
                self.lines.push(Line::new(cols, attr, age)?);
            }
        }
        Ok(())
    }

    /// Resizes the visible grid to `cols x rows`, growing capacity first.
    /// Shrinking height scrolls surplus rows into `history` (after
    /// consuming any empty scroll-region slack); growing height pulls rows
    /// back out of `history` when available.
    pub fn resize(
        &mut self,
        cols: usize,
        rows: usize,
        attr: Attr,
        age: u64,
        mut history: Option<&mut History>,
    ) -> Result<()> {
        self.reserve(cols, rows, attr, age)?;
        let old_height = self.height;

        if rows < old_height {
            let slack = self.scroll_num.saturating_sub(self.scroll_fill);
            let excess = old_height - rows;
            let to_scroll = excess.saturating_sub(slack);
            if to_scroll > 0 {
                self.scroll_up(to_scroll, attr, age, history.as_deref_mut());
            }
            let margin_start = self.scroll_idx + self.scroll_num;
            let margin_len = old_height.saturating_sub(margin_start);
            let shift = old_height - rows;
            for i in 0..margin_len {
                let dst = margin_start + i - shift.min(margin_start + i);
                self.lines.swap(margin_start + i, dst);
            }
            self.scroll_num = self
                .scroll_num
                .saturating_sub(to_scroll)
                .min(rows.saturating_sub(self.scroll_idx.min(rows)));
            self.height = rows;
        } else if rows > old_height {
            let grow = rows - old_height;
            let margin_start = self.scroll_idx + self.scroll_num;
            let margin_len = old_height.saturating_sub(margin_start);
            for i in (0..margin_len).rev() {
                self.lines.swap(margin_start + i, margin_start + i + grow);
            }
            self.scroll_num += grow;
            self.height = rows;
            if let Some(h) = history.as_deref_mut() {
                let pulled = grow.min(h.len());
                if pulled > 0 {
                    self.scroll_down(pulled, attr, age, Some(h));
                }
            }
        }

        self.width = cols;
        for line in self.lines.iter_mut().take(self.height) {
            line.set_width(cols);
        }
        Ok(())
    }

    pub fn set_scroll_region(&mut self, idx: usize, num: usize) {
        if self.height == 0 {
            self.scroll_idx = 0;
            self.scroll_num = 0;
            return;
        }
        let idx = idx.min(self.height - 1);
        let num = num.min(self.height - idx);
        self.scroll_idx = idx;
        self.scroll_num = num;
    }

    /// Scrolls the top `num` lines of the scroll region into `history` (or
    /// resets them in place if there's no history or allocation fails),
    /// then rotates them to the bottom of the region.
    pub fn scroll_up(&mut self, num: usize, attr: Attr, age: u64, history: Option<&mut History>) {
        let num = num.min(self.scroll_num);
        if num == 0 {
            return;
        }
        match history {
            Some(h) => {
                for i in 0..num {
                    let idx = self.scroll_idx + i;
                    match Line::new(self.width, attr, age) {
                        Ok(fresh) => {
                            let old = std::mem::replace(&mut self.lines[idx], fresh);
                            h.push(old);
                        }
                        Err(_) => self.lines[idx].reset(attr, age),
                    }
                }
            }
            None => {
                for i in 0..num {
                    let idx = self.scroll_idx + i;
                    self.lines[idx].reset(attr, age);
                }
            }
        }
        let region = self.scroll_idx..self.scroll_idx + self.scroll_num;
        self.lines[region].rotate_left(num);
        self.scroll_fill = self.scroll_fill.saturating_sub(num);
    }

    /// Symmetric with `scroll_up`: pops up to `num` lines back from
    /// `history` into the top of the scroll region; a failed pop resets
    /// the existing bottom line instead of losing content.
    pub fn scroll_down(&mut self, num: usize, attr: Attr, age: u64, history: Option<&mut History>) {
        let num = num.min(self.scroll_num);
        if num == 0 {
            return;
        }
        let region = self.scroll_idx..self.scroll_idx + self.scroll_num;
        self.lines[region].rotate_right(num);
        match history {
            Some(h) => {
                // Pop is LIFO (most recently scrolled-away line first), and
                // that line was closest to the scroll boundary, so it goes
                // to the bottom of the restored block, not the top.
                for i in (0..num).rev() {
                    let idx = self.scroll_idx + i;
                    match h.pop(self.width, attr, age) {
                        Some(popped) => self.lines[idx] = popped,
                        None => self.lines[idx].reset(attr, age),
                    }
                }
            }
            None => {
                for i in 0..num {
                    let idx = self.scroll_idx + i;
                    self.lines[idx].reset(attr, age);
                }
            }
        }
        // Asymmetric with scroll_up by design (see spec open questions):
        // fill only grows once it's already non-zero.
        if self.scroll_fill > 0 {
            self.scroll_fill = (self.scroll_fill + num).min(self.scroll_num);
        }
    }

    /// `pos_y == scroll_idx` counts as inside the region for insert (the
    /// region's top can absorb an inserted line); a `pos_y` below the
    /// configured region roots a temporary one-line region there instead.
    pub fn insert_lines(&mut self, pos_y: usize, num: usize, attr: Attr, age: u64) {
        if pos_y >= self.height {
            return;
        }
        let (orig_idx, orig_num) = (self.scroll_idx, self.scroll_num);
        if pos_y >= self.scroll_idx && pos_y < self.scroll_idx + self.scroll_num {
            self.scroll_idx = pos_y;
            self.scroll_num = orig_idx + orig_num - pos_y;
        } else {
            self.scroll_idx = pos_y;
            self.scroll_num = 1;
        }
        self.scroll_down(num, attr, age, None);
        self.scroll_idx = orig_idx;
        self.scroll_num = orig_num;
    }

    /// Mirror of `insert_lines`, but `pos_y == scroll_idx` uses `>` rather
    /// than `>=` at the boundary check, per the documented asymmetry
    /// between the two operations; observably identical to `insert_lines`
    /// because callers already clamp `pos_y` into the region before
    /// calling either.
    pub fn delete_lines(&mut self, pos_y: usize, num: usize, attr: Attr, age: u64) {
        if pos_y >= self.height {
            return;
        }
        let (orig_idx, orig_num) = (self.scroll_idx, self.scroll_num);
        if pos_y > self.scroll_idx && pos_y < self.scroll_idx + self.scroll_num {
            self.scroll_idx = pos_y;
            self.scroll_num = orig_idx + orig_num - pos_y;
        } else if pos_y == self.scroll_idx {
            self.scroll_idx = orig_idx;
            self.scroll_num = orig_num;
        } else {
            self.scroll_idx = pos_y;
            self.scroll_num = 1;
        }
        self.scroll_up(num, attr, age, None);
        self.scroll_idx = orig_idx;
        self.scroll_num = orig_num;
    }

    pub fn get_cell(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        if y >= self.height {
            return None;
        }
        self.lines.get_mut(y)?.cell_mut(x)
    }

    pub fn write(&mut self, x: usize, y: usize, ch: Char, cwidth: u8, attr: Attr, age: u64, insert_mode: bool) {
        if y >= self.height {
            tracing::warn!(x, y, "write out of page bounds");
            return;
        }
        if let Some(line) = self.lines.get_mut(y) {
            line.write(x, ch, cwidth, attr, age, insert_mode);
        }
    }

    pub fn insert_cells(&mut self, x: usize, y: usize, num: usize, attr: Attr, age: u64) {
        if y >= self.height {
            return;
        }
        if let Some(line) = self.lines.get_mut(y) {
            line.insert(x, num, attr, age);
        }
    }

    pub fn delete_cells(&mut self, x: usize, y: usize, num: usize, attr: Attr, age: u64) {
        if y >= self.height {
            return;
        }
        if let Some(line) = self.lines.get_mut(y) {
            line.delete(x, num, attr, age);
        }
    }

    pub fn append(&mut self, x: usize, y: usize, ucs4: u32, age: u64) {
        if y >= self.height {
            return;
        }
        if let Some(line) = self.lines.get_mut(y) {
            line.append(x, ucs4, age);
        }
    }

    /// Erases `[from_x, from_y] .. [to_x, to_y]` inclusive, row by row:
    /// the first and last rows are clipped at `from_x`/`to_x`, middle rows
    /// are erased in full.
    pub fn erase(
        &mut self,
        from_x: usize,
        from_y: usize,
        to_x: usize,
        to_y: usize,
        attr: Attr,
        age: u64,
        keep_protected: bool,
    ) {
        if self.height == 0 || from_y >= self.height {
            return;
        }
        let to_y = to_y.min(self.height - 1);
        for y in from_y..=to_y {
            let width = self.width;
            let (start, num) = if from_y == to_y {
                (from_x, (to_x.saturating_sub(from_x)) + 1)
            } else if y == from_y {
                (from_x, width.saturating_sub(from_x))
            } else if y == to_y {
                (0, (to_x + 1).min(width))
            } else {
                (0, width)
            };
            if let Some(line) = self.lines.get_mut(y) {
                line.erase(start, num, attr, age, keep_protected);
            }
        }
    }

    pub fn reset(&mut self, attr: Attr, age: u64) {
        if self.height == 0 || self.width == 0 {
            return;
        }
        self.erase(0, 0, self.width - 1, self.height - 1, attr, age, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_str(page: &mut Page, y: usize, s: &str) {
        for (x, c) in s.chars().enumerate() {
            page.write(x, y, Char::from(c), 1, Attr::default(), 1, false);
        }
    }

    fn row_chars(page: &Page, y: usize) -> Vec<char> {
        page.line(y)
            .unwrap()
            .cells()
            .iter()
            .map(|c| c.ch.resolve().first().map(|&u| char::from_u32(u).unwrap_or(' ')).unwrap_or(' '))
            .collect()
    }

    #[test]
    fn scroll_with_history_scenario_a() {
        let mut page = Page::new(4, 4, Attr::default()).unwrap();
        let mut history = History::new(8);
        write_str(&mut page, 0, "A");
        write_str(&mut page, 1, "B");
        write_str(&mut page, 2, "C");
        write_str(&mut page, 3, "D");
        page.scroll_up(2, Attr::default(), 1, Some(&mut history));

        assert_eq!(row_chars(&page, 0)[0], 'C');
        assert_eq!(row_chars(&page, 1)[0], 'D');
        assert!(page.line(2).unwrap().cell(0).unwrap().is_empty());
        assert!(page.line(3).unwrap().cell(0).unwrap().is_empty());
        assert_eq!(history.len(), 2);

        let top = history.pop(4, Attr::default(), 0).unwrap();
        assert_eq!(top.cell(0).unwrap().ch.resolve(), &['B' as u32]);
        let top = history.pop(4, Attr::default(), 0).unwrap();
        assert_eq!(top.cell(0).unwrap().ch.resolve(), &['A' as u32]);
    }

    #[test]
    fn scroll_up_then_down_restores_visible_lines() {
        let mut page = Page::new(4, 4, Attr::default()).unwrap();
        let mut history = History::new(8);
        for y in 0..4 {
            write_str(&mut page, y, &((b'A' + y as u8) as char).to_string());
        }
        let before: Vec<Vec<char>> = (0..4).map(|y| row_chars(&page, y)).collect();
        page.scroll_up(2, Attr::default(), 1, Some(&mut history));
        page.scroll_down(2, Attr::default(), 2, Some(&mut history));
        let after: Vec<Vec<char>> = (0..4).map(|y| row_chars(&page, y)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn page_ownership_never_duplicated() {
        // After a scroll-up/scroll-down round trip, history is empty again
        // and no line content was duplicated onto the page.
        let mut page = Page::new(2, 2, Attr::default()).unwrap();
        let mut history = History::new(4);
        page.scroll_up(2, Attr::default(), 1, Some(&mut history));
        assert_eq!(history.len(), 2);
        page.scroll_down(2, Attr::default(), 2, Some(&mut history));
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn reserve_is_monotone() {
        let mut page = Page::new(4, 4, Attr::default()).unwrap();
        page.reserve(8, 8, Attr::default(), 1).unwrap();
        assert!(page.n_lines() >= 4);
        let n_lines_after_first = page.n_lines();
        page.reserve(2, 2, Attr::default(), 2).unwrap();
        assert!(page.n_lines() >= n_lines_after_first);
    }

    #[test]
    fn set_scroll_region_clamps() {
        let mut page = Page::new(4, 4, Attr::default()).unwrap();
        page.set_scroll_region(10, 10);
        let (idx, num) = page.scroll_region();
        assert!(idx < 4);
        assert!(idx + num <= 4);
    }
}
