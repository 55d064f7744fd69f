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

//! Typed errors for the small set of genuinely fallible operations in the
//! core: allocation at the reserve/resize boundary, and the parser's
//! defensive recovery from an impossible state transition.

use thiserror::Error;

/// Errors surfaced by the core.
///
/// Everything else describe in the data-model's error handling design
/// (out-of-bounds access, a dropped combining mark, a history pop that
/// can't be widened) degrades silently and is represented by a plain
/// return value rather than this type.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Growing a line or a page past its current capacity failed.
    #[error("out of memory")]
    OutOfMemory,

    /// The parser state machine reached a transition it has no table entry
    /// for. Recoverable: the caller should treat this as equivalent to a
    /// `CAN` and keep feeding bytes.
    #[error("invalid parser transition from state {state}")]
    Invalid { state: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
