//! Scanner state machine
//!
//! Turns the child's byte stream into [`Instruction`]s one byte at a time.
//! A sequence that is still open when a chunk ends is kept as a
//! [`PartialSequence`] and resumed by the next call, so chunk boundaries
//! never change the result.
//!
//! Ground bytes are either controls (applied immediately), printable ASCII,
//! or UTF-8 which is decoded incrementally. `ESC` opens a partial sequence:
//!
//! - `ESC [` ... final byte: control sequence, mapped through the code table
//! - `ESC ]` ... `BEL` or `ESC \`: operating system command, consumed and dropped
//! - `ESC` intermediates final byte: plain escape, consumed and dropped
//!
//! A sequence that grows past the configured length is dropped and scanning
//! resumes at the next byte.

use tracing::{debug, warn};

use super::dispatch::dispatch_csi;
use super::instruction::{Axis, Instruction};
use super::params::Params;
use crate::core::ColorPalette;

const BEL: u8 = 0x07;
const BS: u8 = 0x08;
const HT: u8 = 0x09;
const LF: u8 = 0x0A;
const VT: u8 = 0x0B;
const FF: u8 = 0x0C;
const CR: u8 = 0x0D;
const CAN: u8 = 0x18;
const SUB: u8 = 0x1A;
const ESC: u8 = 0x1B;
const DEL: u8 = 0x7F;

/// Default bound on the bytes a single sequence may accumulate
pub const DEFAULT_MAX_SEQUENCE_LEN: usize = 256;

/// What kind of sequence the bytes after `ESC` introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// Only `ESC` seen so far
    None,
    /// `ESC [`
    ControlSequence,
    /// `ESC ]`
    OperatingSystemCommand,
    /// `ESC` followed by intermediate bytes
    Escape,
}

/// A sequence that has started but not yet terminated
#[derive(Debug)]
struct PartialSequence {
    /// Raw bytes including the leading `ESC`
    bytes: Vec<u8>,
    prefix: Prefix,
    params: Params,
    /// Parameter currently being accumulated, `None` until a digit arrives
    current: Option<u16>,
    /// Private marker or intermediate seen; syntax is fine but no code maps it
    unsupported: bool,
    /// `ESC` seen inside an OSC string, `\` would terminate it
    string_escape: bool,
}

impl PartialSequence {
    fn new() -> Self {
        Self {
            bytes: vec![ESC],
            prefix: Prefix::None,
            params: Params::new(),
            current: None,
            unsupported: false,
            string_escape: false,
        }
    }

    fn describe(&self) -> String {
        String::from_utf8_lossy(&self.bytes[1..]).into_owned()
    }
}

/// Incremental UTF-8 decoder for ground state
#[derive(Debug, Default)]
struct Utf8Buffer {
    bytes: [u8; 4],
    len: usize,
    needed: usize,
}

impl Utf8Buffer {
    fn start(&mut self, lead: u8) {
        self.needed = match lead {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            _ => 4,
        };
        self.bytes[0] = lead;
        self.len = 1;
    }

    fn pending(&self) -> bool {
        self.len > 0
    }

    /// Add a continuation byte, returning the character once complete
    fn push(&mut self, byte: u8) -> Option<char> {
        self.bytes[self.len] = byte;
        self.len += 1;
        if self.len < self.needed {
            return None;
        }
        let decoded = std::str::from_utf8(&self.bytes[..self.len])
            .ok()
            .and_then(|s| s.chars().next());
        if decoded.is_none() {
            debug!("dropping invalid UTF-8 {:02x?}", &self.bytes[..self.len]);
        }
        self.clear();
        decoded
    }

    fn clear(&mut self) {
        self.len = 0;
        self.needed = 0;
    }
}

/// The escape sequence scanner
#[derive(Debug)]
pub struct Scanner {
    partial: Option<PartialSequence>,
    utf8: Utf8Buffer,
    palette: ColorPalette,
    max_sequence_len: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Create a scanner with the default palette
    pub fn new() -> Self {
        Self::with_palette(ColorPalette::default())
    }

    /// Create a scanner resolving SGR colors through `palette`
    pub fn with_palette(palette: ColorPalette) -> Self {
        Self {
            partial: None,
            utf8: Utf8Buffer::default(),
            palette,
            max_sequence_len: DEFAULT_MAX_SEQUENCE_LEN,
        }
    }

    /// Set the bound on bytes a single sequence may accumulate
    pub fn with_max_sequence_len(mut self, max: usize) -> Self {
        // ESC plus the introducer must always fit
        self.max_sequence_len = max.max(2);
        self
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    pub fn max_sequence_len(&self) -> usize {
        self.max_sequence_len
    }

    /// Check if a sequence is open
    pub fn in_sequence(&self) -> bool {
        self.partial.is_some()
    }

    /// Prefix of the open sequence, if any
    pub fn prefix(&self) -> Option<Prefix> {
        self.partial.as_ref().map(|p| p.prefix)
    }

    /// Drop any open sequence and pending UTF-8 bytes
    pub fn reset(&mut self) {
        self.partial = None;
        self.utf8.clear();
    }

    /// Scan a single byte
    pub fn feed(&mut self, byte: u8) -> Vec<Instruction> {
        let mut out = Vec::new();
        self.scan(byte, &mut out);
        out
    }

    /// Scan a chunk of bytes
    pub fn feed_bytes(&mut self, data: &[u8]) -> Vec<Instruction> {
        let mut out = Vec::with_capacity(data.len());
        for &byte in data {
            self.scan(byte, &mut out);
        }
        out
    }

    /// Scan a single byte, appending completed instructions to `out`
    pub fn scan(&mut self, byte: u8, out: &mut Vec<Instruction>) {
        match self.partial.take() {
            Some(partial) => self.continue_sequence(partial, byte, out),
            None => self.ground(byte, out),
        }
    }

    /// Process a byte with no sequence open
    fn ground(&mut self, byte: u8, out: &mut Vec<Instruction>) {
        if self.utf8.pending() {
            if (0x80..=0xBF).contains(&byte) {
                if let Some(ch) = self.utf8.push(byte) {
                    out.push(Instruction::InsertCharacter(ch));
                }
                return;
            }
            debug!("dropping truncated UTF-8 sequence");
            self.utf8.clear();
        }

        match byte {
            ESC => self.partial = Some(PartialSequence::new()),
            0x00..=0x1F | DEL => out.push(control(byte)),
            0x20..=0x7E => out.push(Instruction::InsertCharacter(byte as char)),
            0xC2..=0xF4 => self.utf8.start(byte),
            _ => debug!("dropping undecodable byte {:#04x}", byte),
        }
    }

    /// Process a byte while a sequence is open
    fn continue_sequence(&mut self, mut partial: PartialSequence, byte: u8, out: &mut Vec<Instruction>) {
        if partial.string_escape {
            if byte == b'\\' {
                debug!("discarding OSC {:?}", partial.describe());
                return;
            }
            // Not a string terminator: the ESC opened a new sequence
            debug!("OSC interrupted by ESC");
            return self.continue_sequence(PartialSequence::new(), byte, out);
        }

        match byte {
            CAN | SUB => {
                debug!("sequence {:?} cancelled", partial.describe());
                return;
            },
            ESC if partial.prefix == Prefix::OperatingSystemCommand => {
                partial.string_escape = true;
                partial.bytes.push(byte);
                self.partial = Some(partial);
                return;
            },
            ESC => {
                debug!("sequence {:?} interrupted by ESC", partial.describe());
                self.partial = Some(PartialSequence::new());
                return;
            },
            BEL if partial.prefix == Prefix::OperatingSystemCommand => {
                debug!("discarding OSC {:?}", partial.describe());
                return;
            },
            // Controls inside a sequence act immediately and leave it open
            0x00..=0x1F => {
                out.push(control(byte));
                self.partial = Some(partial);
                return;
            },
            DEL => {
                self.partial = Some(partial);
                return;
            },
            _ => {},
        }

        partial.bytes.push(byte);
        if partial.bytes.len() > self.max_sequence_len {
            warn!(
                "escape sequence exceeded {} bytes, discarding",
                self.max_sequence_len
            );
            return;
        }

        match partial.prefix {
            Prefix::None => match byte {
                b'[' => partial.prefix = Prefix::ControlSequence,
                b']' => partial.prefix = Prefix::OperatingSystemCommand,
                0x20..=0x2F => partial.prefix = Prefix::Escape,
                0x30..=0x7E => {
                    debug!("ignoring escape sequence {:?}", partial.describe());
                    return;
                },
                _ => {
                    debug!("malformed escape sequence {:02x?}", partial.bytes);
                    return;
                },
            },
            Prefix::Escape => match byte {
                0x20..=0x2F => {},
                0x30..=0x7E => {
                    debug!("ignoring escape sequence {:?}", partial.describe());
                    return;
                },
                _ => {
                    debug!("malformed escape sequence {:02x?}", partial.bytes);
                    return;
                },
            },
            Prefix::OperatingSystemCommand => {},
            Prefix::ControlSequence => match byte {
                b'0'..=b'9' => {
                    let digit = (byte - b'0') as u16;
                    partial.current = Some(
                        partial
                            .current
                            .unwrap_or(0)
                            .saturating_mul(10)
                            .saturating_add(digit),
                    );
                },
                b';' | b':' => {
                    let value = partial.current.take();
                    partial.params.push(value);
                },
                b'?' | b'>' | b'<' | b'=' | 0x20..=0x2F => partial.unsupported = true,
                0x40..=0x7E => {
                    self.finish_control_sequence(partial, byte, out);
                    return;
                },
                _ => {
                    debug!("malformed control sequence {:02x?}", partial.bytes);
                    return;
                },
            },
        }

        self.partial = Some(partial);
    }

    /// Resolve a terminated control sequence into instructions
    fn finish_control_sequence(&mut self, mut partial: PartialSequence, final_byte: u8, out: &mut Vec<Instruction>) {
        if partial.current.is_some() || !partial.params.is_empty() {
            let value = partial.current.take();
            partial.params.push(value);
        }

        if partial.unsupported {
            debug!("ignoring unsupported control sequence {:?}", partial.describe());
            return;
        }

        if !dispatch_csi(final_byte, &partial.params, &self.palette, out) {
            debug!(
                "ignoring unmapped control sequence {:?} params={:?}",
                partial.describe(),
                partial.params
            );
        }
    }
}

/// Single-byte controls
fn control(byte: u8) -> Instruction {
    match byte {
        BS => Instruction::move_by(-1, 0),
        HT => Instruction::InsertCharacter('\t'),
        LF | VT | FF => Instruction::InsertCharacter('\n'),
        CR => Instruction::MoveCursor {
            x: Axis::Absolute(0),
            y: Axis::STAY,
        },
        // BEL and everything else
        _ => Instruction::Ignore,
    }
}
