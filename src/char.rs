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

//! A cell's character: a base code point plus up to [`MAX_COMBINING`]
//! combining marks.
//!
//! The original data model packs this into a single tagged machine word to
//! keep cell storage cache-dense. Here it's a discriminated enum instead:
//! `Packed` holds up to three code points inline (no allocation), `Boxed`
//! holds four or more in a heap buffer. The crossover is exactly at four
//! code points, matching the "1-3 inline, 4+ allocated" testable property.

use static_assertions::const_assert;
use unicode_width::UnicodeWidthChar;

/// Soft limit on combining marks per base character. Beyond this, `merge`
/// silently drops the mark and returns the Char unchanged.
pub const MAX_COMBINING: usize = 64;

const REPLACEMENT_CHARACTER: u32 = 0xFFFD;
const PACKED_ABSENT: u32 = u32::MAX;
const PACKED_CAP: usize = 3;

/// A base code point plus zero or more combining marks.
#[derive(Clone, Debug)]
pub enum Char {
    /// No code points at all (an empty/background cell).
    Null,
    /// 1 to 3 code points, stored inline. Absent slots hold
    /// [`PACKED_ABSENT`].
    Packed([u32; PACKED_CAP]),
    /// 4 or more code points.
    Boxed(Box<[u32]>),
}

// The packed form must stay small enough that `Cell` (which embeds a Char)
// remains cheap to move; this is the same sizing discipline the cell
// module's SmallVec field is held to.
const_assert!(std::mem::size_of::<[u32; PACKED_CAP]>() <= 16);

impl Default for Char {
    fn default() -> Self {
        Char::Null
    }
}

impl Char {
    /// Releases `previous` (a no-op in this port; see `free`) and returns a
    /// fresh Char containing just `ucs4`.
    pub fn set(_previous: Char, ucs4: u32) -> Char {
        Char::Packed([ucs4, PACKED_ABSENT, PACKED_ABSENT])
    }

    /// Appends `ucs4` as a combining mark onto `base`.
    ///
    /// Returns `base` unchanged (not an error) if `ucs4` is out of UCS-4
    /// range, if the soft combining-mark limit would be exceeded, or if
    /// promoting to boxed storage fails to allocate — in every case the
    /// caller gets back exactly what it passed in, marks already on
    /// `base` included, never a truncated replacement.
    pub fn merge(base: Char, ucs4: u32) -> Char {
        if ucs4 > 0x0010_FFFF {
            return base;
        }
        let mut points = base.resolve().to_vec();
        if points.len() >= MAX_COMBINING + 1 {
            tracing::warn!(limit = MAX_COMBINING, "dropping combining mark past soft limit");
            return base;
        }
        points.push(ucs4);
        match Char::from_points(&points) {
            Some(merged) => merged,
            None => base,
        }
    }

    /// Deep-copies `self`. Packed and null values are copied by value;
    /// boxed values allocate independent storage. An allocation failure
    /// (observed via `try_reserve`) falls back to a packed replacement
    /// character rather than propagating an error — duplication never
    /// observably fails.
    pub fn dup(&self) -> Char {
        match self {
            Char::Null => Char::Null,
            Char::Packed(p) => Char::Packed(*p),
            Char::Boxed(b) => {
                let mut v: Vec<u32> = Vec::new();
                if v.try_reserve_exact(b.len()).is_err() {
                    return Char::Packed([REPLACEMENT_CHARACTER, PACKED_ABSENT, PACKED_ABSENT]);
                }
                v.extend_from_slice(b);
                Char::Boxed(v.into_boxed_slice())
            }
        }
    }

    /// No-op kept for API parity with the original out-of-line free; real
    /// teardown happens via `Drop`.
    pub fn free(self) {}

    /// The code points making up this Char, base first then combining
    /// marks in append order.
    pub fn resolve(&self) -> &[u32] {
        match self {
            Char::Null => &[],
            Char::Packed(p) => {
                let len = p.iter().take_while(|&&v| v != PACKED_ABSENT).count();
                &p[..len]
            }
            Char::Boxed(b) => b,
        }
    }

    /// `wcwidth` of the base code point, clamped to non-negative. Combining
    /// marks never widen a cell.
    pub fn lookup_width(&self) -> u32 {
        let points = self.resolve();
        let Some(&base) = points.first() else {
            return 0;
        };
        match char::from_u32(base).and_then(|c| c.width()) {
            Some(w) => w as u32,
            None => 0,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Char::Null)
    }

    pub fn is_allocated(&self) -> bool {
        matches!(self, Char::Boxed(_))
    }

    /// Tagged-word identity: `same(a, b)` implies `equal(a, b)` but not the
    /// reverse (two boxed allocations with identical contents are `equal`
    /// but not `same`). Used by callers to short-circuit writes that would
    /// be no-ops.
    pub fn same(&self, other: &Char) -> bool {
        match (self, other) {
            (Char::Null, Char::Null) => true,
            (Char::Packed(a), Char::Packed(b)) => a == b,
            (Char::Boxed(a), Char::Boxed(b)) => std::ptr::eq(a.as_ptr(), b.as_ptr()),
            _ => false,
        }
    }

    pub fn equal(&self, other: &Char) -> bool {
        self.resolve() == other.resolve()
    }

    /// Builds a Char from a flat code-point list, or `None` if promoting to
    /// boxed storage was required and allocation failed. The caller (only
    /// `merge`) owns the original `Char` and decides what to fall back to.
    fn from_points(points: &[u32]) -> Option<Char> {
        match points.len() {
            0 => Some(Char::Null),
            n if n <= PACKED_CAP => {
                let mut p = [PACKED_ABSENT; PACKED_CAP];
                p[..n].copy_from_slice(points);
                Some(Char::Packed(p))
            }
            n => {
                #[cfg(test)]
                if FORCE_ALLOC_FAILURE.with(std::cell::Cell::get) {
                    return None;
                }
                let mut v: Vec<u32> = Vec::new();
                v.try_reserve_exact(n).ok()?;
                v.extend_from_slice(points);
                Some(Char::Boxed(v.into_boxed_slice()))
            }
        }
    }
}

/// Test-only fault injection: there is no way to deterministically exhaust
/// the allocator in a unit test, so the boxed-promotion path checks this
/// flag first to exercise the allocation-failure branch of `merge`/
/// `from_points` on demand. Thread-local so it can't make other tests'
/// allocations spuriously "fail" when the suite runs in parallel.
#[cfg(test)]
thread_local! {
    static FORCE_ALLOC_FAILURE: std::cell::Cell<bool> = const { std::cell::Cell::new(false) };
}

impl From<char> for Char {
    fn from(c: char) -> Self {
        Char::set(Char::Null, c as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_combining_marks() {
        let mut ch = Char::from('a');
        for mark in [0x0301u32, 0x0302, 0x0303] {
            ch = Char::merge(ch, mark);
        }
        assert_eq!(ch.resolve(), &['a' as u32, 0x0301, 0x0302, 0x0303]);
    }

    #[test]
    fn pack_boundary() {
        let one = Char::from('a');
        assert!(!one.is_allocated());
        let two = Char::merge(one, 0x0301);
        assert!(!two.is_allocated());
        let three = Char::merge(two, 0x0302);
        assert!(!three.is_allocated());
        let four = Char::merge(three, 0x0303);
        assert!(four.is_allocated());
    }

    #[test]
    fn same_implies_equal() {
        let a = Char::from('x');
        let b = a.dup();
        assert!(!a.same(&b) || a.equal(&b));
        assert!(a.equal(&b));
    }

    #[test]
    fn merge_rejects_out_of_range() {
        let a = Char::from('a');
        let b = Char::merge(a.dup(), 0x0011_0000);
        assert_eq!(a.resolve(), b.resolve());
    }

    #[test]
    fn combining_overflow_drops_past_soft_limit() {
        let mut ch = Char::from('a');
        for i in 0..MAX_COMBINING as u32 {
            ch = Char::merge(ch, 0x0300 + (i % 16));
        }
        assert_eq!(ch.resolve().len(), MAX_COMBINING + 1);
        let past_limit = Char::merge(ch.dup(), 0x0310);
        assert_eq!(past_limit.resolve().len(), MAX_COMBINING + 1);
    }

    #[test]
    fn lookup_width_ignores_combining_marks() {
        let ch = Char::merge(Char::from('a'), 0x0301);
        assert_eq!(ch.lookup_width(), 1);
    }

    #[test]
    fn null_has_no_width_and_resolves_empty() {
        assert_eq!(Char::Null.resolve(), &[] as &[u32]);
        assert_eq!(Char::Null.lookup_width(), 0);
    }

    #[test]
    fn merge_preserves_existing_marks_on_allocation_failure() {
        let mut ch = Char::from('a');
        for mark in [0x0301u32, 0x0302, 0x0303] {
            ch = Char::merge(ch, mark);
        }
        assert!(ch.is_allocated());
        let before = ch.resolve().to_vec();

        FORCE_ALLOC_FAILURE.with(|f| f.set(true));
        let after = Char::merge(ch, 0x0304);
        FORCE_ALLOC_FAILURE.with(|f| f.set(false));

        // A failed promotion must return `base` verbatim, not a packed
        // replacement holding only the base code point.
        assert_eq!(after.resolve(), before.as_slice());
        assert!(after.is_allocated());
    }
}
