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

//! A single grid position: one [`Char`], its cached display width, the
//! rendition attributes in effect when it was written, and an age used by
//! renderers to find dirty regions.

use crate::attrs::Attr;
use crate::char::Char;

#[derive(Clone, Debug, Default)]
pub struct Cell {
    pub ch: Char,
    pub cwidth: u8,
    pub attr: Attr,
    pub age: u64,
}

impl Cell {
    /// A blank cell: null character, zero width, default attributes, null
    /// age. Equivalent to zero-initialised storage.
    pub fn blank() -> Cell {
        Cell::default()
    }

    pub fn blank_with(attr: Attr, age: u64) -> Cell {
        Cell { ch: Char::Null, cwidth: 0, attr, age }
    }

    pub fn new(ch: Char, cwidth: u8, attr: Attr, age: u64) -> Cell {
        Cell { ch, cwidth, attr, age }
    }

    /// Replaces this cell's character, releasing the old one first.
    pub fn set(&mut self, ch: Char, cwidth: u8, attr: Attr, age: u64) {
        self.ch = ch;
        self.cwidth = cwidth;
        self.attr = attr;
        self.age = age;
    }

    /// Appends a combining mark to this cell's character in place.
    pub fn append(&mut self, ucs4: u32, age: u64) {
        let ch = std::mem::take(&mut self.ch);
        self.ch = Char::merge(ch, ucs4);
        self.age = age;
    }

    pub fn is_empty(&self) -> bool {
        self.ch.is_null()
    }

    pub fn width(&self) -> u8 {
        self.cwidth
    }
}
