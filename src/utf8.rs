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

//! A byte-at-a-time UTF-8 decoder with ISO-8859-1 fallback.
//!
//! Deliberately permissive: there's no overlong check, no surrogate
//! rejection, no noncharacter rejection. A malformed continuation flushes
//! whatever was buffered as individual ISO-8859-1 code points rather than
//! emitting a replacement character, so a terminal never loses bytes it
//! can otherwise display.

use smallvec::SmallVec;

fn lead_len(byte: u8) -> Option<usize> {
    if byte < 0x80 {
        Some(1)
    } else if byte & 0xE0 == 0xC0 {
        Some(2)
    } else if byte & 0xF0 == 0xE0 {
        Some(3)
    } else if byte & 0xF8 == 0xF0 {
        Some(4)
    } else {
        None
    }
}

fn lead_mask(len: usize) -> u32 {
    match len {
        2 => 0x1F,
        3 => 0x0F,
        4 => 0x07,
        _ => 0xFF,
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

#[derive(Default)]
pub struct Utf8Decoder {
    pending: SmallVec<[u8; 4]>,
    expected: usize,
    accum: u32,
}

impl Utf8Decoder {
    pub fn new() -> Utf8Decoder {
        Utf8Decoder::default()
    }

    fn reset_seq(&mut self) {
        self.pending.clear();
        self.expected = 0;
        self.accum = 0;
    }

    /// Feeds one byte, returning the (possibly empty) sequence of code
    /// points it completes. Most calls return 0 or 1 code points; a
    /// malformed continuation can return up to 4 (the flushed prefix plus
    /// whatever the new byte itself resolves to).
    pub fn feed(&mut self, byte: u8) -> SmallVec<[u32; 4]> {
        let mut out = SmallVec::new();
        if self.expected == 0 {
            match lead_len(byte) {
                Some(1) => out.push(byte as u32),
                Some(len) => {
                    self.pending.clear();
                    self.pending.push(byte);
                    self.expected = len;
                    self.accum = (byte as u32) & lead_mask(len);
                }
                None => out.push(byte as u32),
            }
            return out;
        }

        if is_continuation(byte) {
            self.accum = (self.accum << 6) | (byte as u32 & 0x3F);
            self.pending.push(byte);
            if self.pending.len() == self.expected {
                out.push(self.accum);
                self.reset_seq();
            }
            return out;
        }

        for &b in self.pending.iter() {
            out.push(b as u32);
        }
        self.reset_seq();
        out.extend(self.feed(byte));
        out
    }
}

/// UTF-8-encodes a single UCS-4 code point. Returns a 0-length slice for
/// values above `0x1FFFFF` (beyond the 4-byte encoding range).
pub fn encode_ucs4(g: u32) -> ([u8; 4], usize) {
    let mut buf = [0u8; 4];
    if g <= 0x7F {
        buf[0] = g as u8;
        (buf, 1)
    } else if g <= 0x7FF {
        buf[0] = 0xC0 | ((g >> 6) as u8);
        buf[1] = 0x80 | ((g & 0x3F) as u8);
        (buf, 2)
    } else if g <= 0xFFFF {
        buf[0] = 0xE0 | ((g >> 12) as u8);
        buf[1] = 0x80 | (((g >> 6) & 0x3F) as u8);
        buf[2] = 0x80 | ((g & 0x3F) as u8);
        (buf, 3)
    } else if g <= 0x1F_FFFF {
        buf[0] = 0xF0 | ((g >> 18) as u8);
        buf[1] = 0x80 | (((g >> 12) & 0x3F) as u8);
        buf[2] = 0x80 | (((g >> 6) & 0x3F) as u8);
        buf[3] = 0x80 | ((g & 0x3F) as u8);
        (buf, 4)
    } else {
        (buf, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(bytes: &[u8]) -> Vec<u32> {
        let mut dec = Utf8Decoder::new();
        bytes.iter().flat_map(|&b| dec.feed(b)).collect()
    }

    #[test]
    fn ascii_passes_through() {
        assert_eq!(feed_all(b"Hi!"), vec!['H' as u32, 'i' as u32, '!' as u32]);
    }

    #[test]
    fn well_formed_multibyte_decodes() {
        // "é" = U+00E9 = 0xC3 0xA9
        assert_eq!(feed_all(&[0xC3, 0xA9]), vec![0x00E9]);
    }

    #[test]
    fn malformed_continuation_falls_back_to_latin1() {
        assert_eq!(feed_all(&[0xC3, 0x28]), vec![0xC3, 0x28]);
    }

    #[test]
    fn encode_round_trips_ascii_and_bmp() {
        assert_eq!(encode_ucs4('A' as u32), ([b'A', 0, 0, 0], 1));
        let (buf, len) = encode_ucs4(0x00E9);
        assert_eq!(&buf[..len], &[0xC3, 0xA9]);
    }

    #[test]
    fn encode_rejects_out_of_range() {
        let (_, len) = encode_ucs4(0x0020_0000);
        assert_eq!(len, 0);
    }
}
