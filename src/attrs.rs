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

//! Cell rendition attributes: colors and the boolean modifiers SGR toggles.

/// A foreground or background color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    /// One of the sixteen named ANSI colors, 0-15.
    Named(u8),
    /// An xterm 256-color palette index.
    Indexed(u8),
    /// 24-bit direct color.
    Rgb(u8, u8, u8),
}

/// Rendition state for a single cell, set by SGR and consumed by the video
/// driver's glyph blit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Attr {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub inverse: bool,
    pub blink: bool,
    pub hidden: bool,
    pub strikethrough: bool,
    /// DECSCA-protected cells are skipped by `erase` when the caller asks
    /// to keep protected content.
    pub protect: bool,
}

impl Attr {
    pub const DEFAULT: Attr = Attr {
        fg: Color::Default,
        bg: Color::Default,
        bold: false,
        italic: false,
        underline: false,
        inverse: false,
        blink: false,
        hidden: false,
        strikethrough: false,
        protect: false,
    };

    pub fn is_default(&self) -> bool {
        *self == Attr::DEFAULT
    }
}
