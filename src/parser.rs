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

//! A Paul Williams-style DEC/ANSI parser: a small state machine that turns
//! a stream of UCS-4 code points into classified sequences (graphic text,
//! C0/C1 controls, escape sequences, CSI, DCS and OSC). DCS and OSC
//! payloads are recognized and buffered but never executed — that's an
//! explicit non-goal of this core.

use smallvec::SmallVec;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Ground,
    Escape,
    EscapeIntermediate,
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    CsiIgnore,
    DcsEntry,
    DcsParam,
    DcsIntermediate,
    DcsPassthrough,
    DcsIgnore,
    OscString,
    StIgnore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeqType {
    Graphic,
    Control,
    Escape,
    Csi,
    Dcs,
    Osc,
    Ignore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    // C0
    Bell,
    Backspace,
    Tab,
    LineFeed,
    VerticalTab,
    FormFeed,
    CarriageReturn,
    Control(u32),
    // Escape
    Ris,
    Ind,
    Nel,
    Hts,
    Ri,
    Decsc,
    Decrc,
    Scs(u8),
    EscUnknown(u32),
    // CSI
    Ich,
    Cuu,
    Cud,
    Cuf,
    Cub,
    Cnl,
    Cpl,
    Cha,
    Cup,
    Ed,
    El,
    Il,
    Dl,
    Dch,
    Su,
    Sd,
    Sgr,
    Decstbm,
    /// `s` is ambiguous at the parser level: DECSLRM (set left/right
    /// margins) when DECLRMM mode is on, save-cursor otherwise. The
    /// caller disambiguates using mode state this core doesn't track.
    DecslrmOrSc,
    Rc,
    CsiUnknown(u32),
    // String types, payload not modeled
    DcsIgnored,
    OscIgnored,
}

/// A fully or partially assembled sequence. Borrowed from the parser and
/// valid only until the next `feed` call.
#[derive(Clone, Debug, Default)]
pub struct Seq {
    pub command: Option<Command>,
    pub terminator: u32,
    /// Bitset over intermediate bytes 0x20..=0x2F, bit `b - 0x20`.
    pub intermediates: u32,
    pub charset: Option<u8>,
    pub args: SmallVec<[i32; 16]>,
    /// Raw payload bytes for DCS/OSC (recognized, never executed).
    pub st: SmallVec<[u8; 32]>,
}

impl Seq {
    fn clear(&mut self) {
        self.command = None;
        self.terminator = 0;
        self.intermediates = 0;
        self.charset = None;
        self.args.clear();
        self.st.clear();
    }

    pub fn n_args(&self) -> usize {
        self.args.len()
    }

    pub fn arg(&self, i: usize) -> Option<i32> {
        self.args.get(i).copied().filter(|&v| v >= 0)
    }

    pub fn arg_or(&self, i: usize, default: i32) -> i32 {
        self.arg(i).unwrap_or(default)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum StringKind {
    Osc,
    Dcs,
}

pub struct Parser {
    state: State,
    seq: Seq,
    awaiting_st: bool,
    string_kind: Option<StringKind>,
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

impl Parser {
    pub fn new() -> Parser {
        Parser {
            state: State::Ground,
            seq: Seq::default(),
            awaiting_st: false,
            string_kind: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.seq.clear();
        self.awaiting_st = false;
        self.string_kind = None;
    }

    /// A C0 control byte arriving while a sequence is already open is
    /// executed immediately without disturbing the sequence in progress
    /// (`global_edge` already special-cases CAN/SUB/ESC/C1, so this only
    /// sees the rest: 0x00-0x17, 0x19, 0x1C-0x1F).
    fn dispatch_control_mid_sequence(&mut self, raw: u32) -> (bool, SeqType) {
        self.seq.terminator = raw;
        self.seq.command = Some(resolve_control(raw));
        (true, SeqType::Control)
    }

    fn set_intermediate(&mut self, byte: u32) {
        if (0x20..=0x2F).contains(&byte) {
            self.seq.intermediates |= 1 << (byte - 0x20);
        }
    }

    fn has_intermediate(&self, byte: u32) -> bool {
        (0x20..=0x2F).contains(&byte) && self.seq.intermediates & (1 << (byte - 0x20)) != 0
    }

    fn param_digit(&mut self, byte: u32) {
        if self.seq.args.is_empty() {
            self.seq.args.push(-1);
        }
        let last = self.seq.args.last_mut().unwrap();
        let digit = (byte - '0' as u32) as i32;
        *last = if *last < 0 { digit } else { (*last * 10 + digit).min(0xFFFF) };
    }

    /// Feeds one UCS-4 code point, returning the sequence dispatched by
    /// this call (if any) and its classification. A `SeqType::Ignore`
    /// result with `None` means this call only advanced internal state.
    pub fn feed(&mut self, raw: u32) -> (Option<&Seq>, SeqType) {
        let (has_seq, ty) = self.feed_inner(raw);
        (if has_seq { Some(&self.seq) } else { None }, ty)
    }

    fn feed_inner(&mut self, raw: u32) -> (bool, SeqType) {
        if self.awaiting_st {
            self.awaiting_st = false;
            if raw == 0x5C {
                return self.finish_string();
            }
            self.state = State::Escape;
            self.seq.clear();
            return self.step_escape(raw);
        }

        if raw == 0x1B
            && matches!(
                self.state,
                State::OscString | State::DcsPassthrough | State::DcsIgnore
            )
        {
            self.awaiting_st = true;
            return (false, SeqType::Ignore);
        }

        if let Some(result) = self.global_edge(raw) {
            return result;
        }

        match self.state {
            State::Ground => self.step_ground(raw),
            State::Escape => self.step_escape(raw),
            State::EscapeIntermediate => self.step_escape_intermediate(raw),
            State::CsiEntry | State::CsiParam => self.step_csi(raw),
            State::CsiIntermediate => self.step_csi_intermediate(raw),
            State::CsiIgnore => self.step_csi_ignore(raw),
            State::DcsEntry | State::DcsParam | State::DcsIntermediate => self.step_dcs_header(raw),
            State::DcsPassthrough => self.step_dcs_passthrough(raw),
            State::DcsIgnore => self.step_dcs_ignore(raw),
            State::OscString => self.step_osc_string(raw),
            State::StIgnore => self.step_st_ignore(raw),
        }
    }

    fn global_edge(&mut self, raw: u32) -> Option<(bool, SeqType)> {
        match raw {
            0x18 => {
                // CAN
                self.state = State::Ground;
                self.seq.clear();
                Some((false, SeqType::Ignore))
            }
            0x1A => {
                // SUB: executed, then ground.
                self.state = State::Ground;
                self.seq.clear();
                self.seq.terminator = raw;
                self.seq.command = Some(resolve_control(raw));
                Some((true, SeqType::Control))
            }
            0x1B => {
                self.state = State::Escape;
                self.seq.clear();
                Some((false, SeqType::Ignore))
            }
            0x90 => {
                self.state = State::DcsEntry;
                self.seq.clear();
                self.string_kind = Some(StringKind::Dcs);
                Some((false, SeqType::Ignore))
            }
            0x9D => {
                self.state = State::OscString;
                self.seq.clear();
                self.string_kind = Some(StringKind::Osc);
                Some((false, SeqType::Ignore))
            }
            0x9B => {
                self.state = State::CsiEntry;
                self.seq.clear();
                Some((false, SeqType::Ignore))
            }
            0x98 | 0x9E | 0x9F => {
                self.state = State::StIgnore;
                Some((false, SeqType::Ignore))
            }
            0x9C => {
                // ST outside of a string state: no-op.
                if matches!(self.state, State::OscString | State::DcsPassthrough | State::DcsIgnore) {
                    None
                } else {
                    self.state = State::Ground;
                    Some((false, SeqType::Ignore))
                }
            }
            0x80..=0x9F => {
                self.state = State::Ground;
                self.seq.clear();
                self.seq.terminator = raw;
                self.seq.command = Some(resolve_control(raw));
                Some((true, SeqType::Control))
            }
            _ => None,
        }
    }

    fn step_ground(&mut self, raw: u32) -> (bool, SeqType) {
        // DEL is Print in ground (matches the Williams table this parser is
        // grounded on); the "DEL ignored" rule only applies once a
        // sequence is already open, in the state-specific step functions.
        if raw < 0x20 {
            self.seq.clear();
            self.seq.terminator = raw;
            self.seq.command = Some(resolve_control(raw));
            return (true, SeqType::Control);
        }
        self.seq.clear();
        self.seq.terminator = raw;
        (true, SeqType::Graphic)
    }

    fn step_escape(&mut self, raw: u32) -> (bool, SeqType) {
        // The 7-bit forms of CSI/DCS/OSC/SOS/PM/APC are ESC followed
        // immediately by one of these introducer bytes, equivalent to
        // their 8-bit C1 codes handled in `global_edge`.
        match raw {
            0x5B => {
                self.state = State::CsiEntry;
                self.seq.clear();
                return (false, SeqType::Ignore);
            }
            0x50 => {
                self.state = State::DcsEntry;
                self.seq.clear();
                self.string_kind = Some(StringKind::Dcs);
                return (false, SeqType::Ignore);
            }
            0x5D => {
                self.state = State::OscString;
                self.seq.clear();
                self.string_kind = Some(StringKind::Osc);
                return (false, SeqType::Ignore);
            }
            0x58 | 0x5E | 0x5F => {
                self.state = State::StIgnore;
                return (false, SeqType::Ignore);
            }
            _ => {}
        }
        match raw {
            0x20..=0x2F => {
                self.set_intermediate(raw);
                self.state = State::EscapeIntermediate;
                (false, SeqType::Ignore)
            }
            0x30..=0x7E => self.dispatch_escape(raw),
            0x7F => (false, SeqType::Ignore),
            _ if is_c0_execute(raw) => self.dispatch_control_mid_sequence(raw),
            _ => (false, SeqType::Ignore),
        }
    }

    fn step_escape_intermediate(&mut self, raw: u32) -> (bool, SeqType) {
        match raw {
            0x20..=0x2F => {
                self.set_intermediate(raw);
                (false, SeqType::Ignore)
            }
            0x30..=0x7E => self.dispatch_escape(raw),
            0x7F => (false, SeqType::Ignore),
            _ if is_c0_execute(raw) => self.dispatch_control_mid_sequence(raw),
            _ => (false, SeqType::Ignore),
        }
    }

    fn dispatch_escape(&mut self, raw: u32) -> (bool, SeqType) {
        self.seq.terminator = raw;
        let (command, charset) = resolve_escape(raw, self.seq.intermediates);
        self.seq.command = Some(command);
        self.seq.charset = charset;
        self.state = State::Ground;
        (true, SeqType::Escape)
    }

    fn step_csi(&mut self, raw: u32) -> (bool, SeqType) {
        match raw {
            0x30..=0x39 => {
                self.param_digit(raw);
                self.state = State::CsiParam;
                (false, SeqType::Ignore)
            }
            0x3B => {
                self.seq.args.push(-1);
                self.state = State::CsiParam;
                (false, SeqType::Ignore)
            }
            0x3A => {
                self.state = State::CsiIgnore;
                (false, SeqType::Ignore)
            }
            0x3C..=0x3F => {
                // Private-marker bytes are tracked like intermediates but
                // keyed one bit past the standard 0x20-0x2F range so they
                // don't collide with real intermediates.
                self.seq.intermediates |= 1 << (16 + (raw - 0x3C));
                self.state = State::CsiParam;
                (false, SeqType::Ignore)
            }
            0x20..=0x2F => {
                self.set_intermediate(raw);
                self.state = State::CsiIntermediate;
                (false, SeqType::Ignore)
            }
            0x40..=0x7E => self.dispatch_csi(raw),
            0x7F => (false, SeqType::Ignore),
            _ if is_c0_execute(raw) => self.dispatch_control_mid_sequence(raw),
            _ => (false, SeqType::Ignore),
        }
    }

    fn step_csi_intermediate(&mut self, raw: u32) -> (bool, SeqType) {
        match raw {
            0x20..=0x2F => {
                self.set_intermediate(raw);
                (false, SeqType::Ignore)
            }
            0x30..=0x3F => {
                self.state = State::CsiIgnore;
                (false, SeqType::Ignore)
            }
            0x40..=0x7E => self.dispatch_csi(raw),
            0x7F => (false, SeqType::Ignore),
            _ if is_c0_execute(raw) => self.dispatch_control_mid_sequence(raw),
            _ => (false, SeqType::Ignore),
        }
    }

    fn step_csi_ignore(&mut self, raw: u32) -> (bool, SeqType) {
        match raw {
            0x40..=0x7E => {
                self.state = State::Ground;
                (false, SeqType::Ignore)
            }
            _ => (false, SeqType::Ignore),
        }
    }

    fn dispatch_csi(&mut self, raw: u32) -> (bool, SeqType) {
        self.seq.terminator = raw;
        let n_args = self.seq.n_args();
        let arg0 = self.seq.arg_or(0, -1);
        self.seq.command = Some(resolve_csi(raw, self.seq.intermediates, n_args, arg0));
        self.state = State::Ground;
        (true, SeqType::Csi)
    }

    fn step_dcs_header(&mut self, raw: u32) -> (bool, SeqType) {
        match raw {
            0x30..=0x39 => {
                self.param_digit(raw);
                self.state = State::DcsParam;
                (false, SeqType::Ignore)
            }
            0x3B => {
                self.seq.args.push(-1);
                self.state = State::DcsParam;
                (false, SeqType::Ignore)
            }
            0x20..=0x2F => {
                self.set_intermediate(raw);
                self.state = State::DcsIntermediate;
                (false, SeqType::Ignore)
            }
            0x3A | 0x3C..=0x3F => {
                self.state = State::DcsIgnore;
                (false, SeqType::Ignore)
            }
            0x40..=0x7E => {
                self.seq.terminator = raw;
                self.state = State::DcsPassthrough;
                (false, SeqType::Ignore)
            }
            // C0 controls (and anything else undefined here, including
            // 0x7F) are ignored in place; the DCS header being assembled
            // is left untouched.
            _ => (false, SeqType::Ignore),
        }
    }

    fn step_dcs_passthrough(&mut self, raw: u32) -> (bool, SeqType) {
        if raw <= 0x7F {
            self.seq.st.push(raw as u8);
        }
        (false, SeqType::Ignore)
    }

    fn step_dcs_ignore(&mut self, _raw: u32) -> (bool, SeqType) {
        (false, SeqType::Ignore)
    }

    fn step_osc_string(&mut self, raw: u32) -> (bool, SeqType) {
        if raw == 0x07 {
            return self.finish_string();
        }
        if raw >= 0x20 && raw < 0x100 {
            self.seq.st.push(raw as u8);
        }
        (false, SeqType::Ignore)
    }

    fn step_st_ignore(&mut self, _raw: u32) -> (bool, SeqType) {
        (false, SeqType::Ignore)
    }

    fn finish_string(&mut self) -> (bool, SeqType) {
        self.seq.terminator = 0x9C;
        let kind = self.string_kind.take();
        self.state = State::Ground;
        match kind {
            Some(StringKind::Osc) => {
                self.seq.command = Some(Command::OscIgnored);
                (true, SeqType::Osc)
            }
            Some(StringKind::Dcs) => {
                self.seq.command = Some(Command::DcsIgnored);
                (true, SeqType::Dcs)
            }
            None => (false, SeqType::Ignore),
        }
    }
}

/// C0 control bytes other than CAN/SUB/ESC, which `global_edge` already
/// handles before any state-specific step function sees them.
fn is_c0_execute(raw: u32) -> bool {
    matches!(raw, 0x00..=0x17 | 0x19 | 0x1C..=0x1F)
}

fn resolve_control(terminator: u32) -> Command {
    match terminator {
        0x07 => Command::Bell,
        0x08 => Command::Backspace,
        0x09 => Command::Tab,
        0x0A => Command::LineFeed,
        0x0B => Command::VerticalTab,
        0x0C => Command::FormFeed,
        0x0D => Command::CarriageReturn,
        other => Command::Control(other),
    }
}

const SCS_INTERMEDIATES: [u32; 7] = [0x28, 0x29, 0x2A, 0x2B, 0x2D, 0x2E, 0x2F];

fn resolve_escape(terminator: u32, intermediates: u32) -> (Command, Option<u8>) {
    let is_scs = SCS_INTERMEDIATES
        .iter()
        .any(|&b| intermediates & (1 << (b - 0x20)) != 0);
    if is_scs {
        return (Command::Scs(terminator as u8), Some(terminator as u8));
    }
    let command = match terminator {
        0x63 => Command::Ris,
        0x44 => Command::Ind,
        0x45 => Command::Nel,
        0x48 => Command::Hts,
        0x4D => Command::Ri,
        0x37 => Command::Decsc,
        0x38 => Command::Decrc,
        other => Command::EscUnknown(other),
    };
    (command, None)
}

/// True if CSI private-marker byte `marker` (one of `0x3C..=0x3F`) was
/// collected for this sequence; private markers are tracked past bit 16
/// of the intermediates bitset (see `step_csi`).
fn has_private_marker(intermediates: u32, marker: u32) -> bool {
    (0x3C..=0x3F).contains(&marker) && intermediates & (1 << (16 + (marker - 0x3C))) != 0
}

fn resolve_csi(terminator: u32, intermediates: u32, n_args: usize, _arg0: i32) -> Command {
    match terminator {
        0x40 => Command::Ich,
        0x41 => Command::Cuu,
        0x42 => Command::Cud,
        0x43 => Command::Cuf,
        0x44 => Command::Cub,
        0x45 => Command::Cnl,
        0x46 => Command::Cpl,
        0x47 => Command::Cha,
        0x48 | 0x66 => Command::Cup,
        0x4A => Command::Ed,
        0x4B => Command::El,
        0x4C => Command::Il,
        0x4D => Command::Dl,
        0x50 => Command::Dch,
        0x53 => Command::Su,
        // 'T' with exactly 5 args is XTERM-IHMT; with fewer it's SD.
        0x54 => {
            if n_args == 5 {
                Command::CsiUnknown(terminator)
            } else {
                Command::Sd
            }
        }
        0x6D => Command::Sgr,
        // `CSI ? ... r` is a private xterm save/restore-style sequence,
        // distinct from plain DECSTBM; left to the caller as unknown.
        0x72 if has_private_marker(intermediates, 0x3F) => Command::CsiUnknown(terminator),
        0x72 => Command::Decstbm,
        // Ambiguous regardless of intermediates: resolved by the caller
        // from DECLRMM mode state, which this parser doesn't track.
        0x73 => Command::DecslrmOrSc,
        0x75 => Command::Rc,
        other => Command::CsiUnknown(other),
    }
}

/// Surfaced only for the defensive "impossible transition" path; the hand
/// written table above is total over its input range, so this exists for
/// API parity with the spec's `Invalid` error kind.
pub fn invalid(state: State) -> Error {
    let name = match state {
        State::Ground => "ground",
        State::Escape => "escape",
        State::EscapeIntermediate => "escape_intermediate",
        State::CsiEntry => "csi_entry",
        State::CsiParam => "csi_param",
        State::CsiIntermediate => "csi_intermediate",
        State::CsiIgnore => "csi_ignore",
        State::DcsEntry => "dcs_entry",
        State::DcsParam => "dcs_param",
        State::DcsIntermediate => "dcs_intermediate",
        State::DcsPassthrough => "dcs_passthrough",
        State::DcsIgnore => "dcs_ignore",
        State::OscString => "osc_string",
        State::StIgnore => "st_ignore",
    };
    Error::Invalid { state: name }
}
