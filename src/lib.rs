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

//! In-kernel developer console terminal core.
//!
//! Three layers, leaves first: [`char`]/[`cell`]/[`attrs`] (one display
//! position), [`line`]/[`page`]/[`history`] (the 2-D grid and its
//! scrollback), and [`utf8`]/[`parser`] (bytes in, classified sequences
//! out). [`screen`] is the thin glue that drives a `Page` from parsed
//! sequences; it's not part of the core's narrow contract and is only
//! exposed for white-box testing behind the `internal-test` feature, the
//! same way the upstream crate this one is built from exposes its own
//! terminal-state module.

pub mod attrs;
pub mod cell;
pub mod char;
pub mod error;
pub mod history;
pub mod line;
pub mod page;
pub mod parser;
#[cfg(any(test, feature = "internal-test"))]
pub mod screen;
#[cfg(not(any(test, feature = "internal-test")))]
mod screen;
pub mod utf8;

pub use attrs::{Attr, Color};
pub use cell::Cell;
pub use char::Char;
pub use error::{Error, Result};
pub use history::History;
pub use line::Line;
pub use page::Page;
pub use parser::{Command, Parser, Seq, SeqType};
#[cfg(any(test, feature = "internal-test"))]
pub use screen::Screen;
pub use utf8::Utf8Decoder;

/// Grid dimensions, in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}
