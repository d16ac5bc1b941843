//! Control sequence code table
//!
//! Maps a completed control sequence (final byte + parameters) to
//! instructions. SGR is the one code that can expand to several
//! instructions; every other code yields exactly one.

use tracing::debug;

use super::instruction::{Attribute, Axis, EraseMode, Instruction, StatusQuery};
use super::params::Params;
use crate::core::{ColorPalette, Rgb};

/// Convert a control sequence into instructions.
///
/// Returns `false` if the final byte has no mapping; nothing is pushed then.
pub(super) fn dispatch_csi(
    final_byte: u8,
    params: &Params,
    palette: &ColorPalette,
    out: &mut Vec<Instruction>,
) -> bool {
    let count = |index: usize| params.count(index) as i32;

    let instruction = match final_byte {
        // CUU - Cursor Up
        b'A' => Instruction::move_by(0, -count(0)),
        // CUD - Cursor Down
        b'B' => Instruction::move_by(0, count(0)),
        // CUF - Cursor Forward
        b'C' => Instruction::move_by(count(0), 0),
        // CUB - Cursor Back
        b'D' => Instruction::move_by(-count(0), 0),
        // CNL - Cursor Next Line
        b'E' => Instruction::MoveCursor {
            x: Axis::Absolute(0),
            y: Axis::Relative(count(0)),
        },
        // CPL - Cursor Previous Line
        b'F' => Instruction::MoveCursor {
            x: Axis::Absolute(0),
            y: Axis::Relative(-count(0)),
        },
        // CHA - Cursor Horizontal Absolute
        b'G' => Instruction::MoveCursor {
            x: Axis::Absolute(params.count(0) as u32 - 1),
            y: Axis::STAY,
        },
        // CUP - Cursor Position, HVP - Horizontal Vertical Position
        b'H' | b'f' => Instruction::CursorPosition {
            row: params.count(0) as u32 - 1,
            col: params.count(1) as u32 - 1,
        },
        // ED - Erase in Display
        b'J' => match params.get_or(0, 0) {
            0 => Instruction::EraseInDisplay(EraseMode::ToEnd),
            1 => Instruction::EraseInDisplay(EraseMode::ToStart),
            2 => Instruction::EraseInDisplay(EraseMode::All),
            3 => Instruction::EraseInDisplay(EraseMode::Scrollback),
            mode => {
                debug!("ED with unknown mode {}", mode);
                Instruction::Ignore
            },
        },
        // EL - Erase in Line
        b'K' => match params.get_or(0, 0) {
            0 => Instruction::EraseInLine(EraseMode::ToEnd),
            1 => Instruction::EraseInLine(EraseMode::ToStart),
            2 => Instruction::EraseInLine(EraseMode::All),
            mode => {
                debug!("EL with unknown mode {}", mode);
                Instruction::Ignore
            },
        },
        // SU - Scroll Up
        b'S' => Instruction::ScrollUp(params.count(0) as u32),
        // SD - Scroll Down
        b'T' => Instruction::ScrollDown(params.count(0) as u32),
        // SGR - Select Graphic Rendition
        b'm' => {
            select_graphic_rendition(params, palette, out);
            return true;
        },
        // DSR - Device Status Report
        b'n' => match params.get_or(0, 0) {
            5 => Instruction::DeviceStatusReport(StatusQuery::OperatingStatus),
            6 => Instruction::DeviceStatusReport(StatusQuery::CursorPosition),
            query => {
                debug!("DSR with unknown query {}", query);
                Instruction::Ignore
            },
        },
        _ => return false,
    };

    out.push(instruction);
    true
}

/// Expand an SGR parameter list into one instruction per rendition item
fn select_graphic_rendition(params: &Params, palette: &ColorPalette, out: &mut Vec<Instruction>) {
    if params.is_empty() {
        out.push(Instruction::SetAttribute(Attribute::Normal));
        return;
    }

    let values: Vec<Option<u16>> = params.iter().collect();
    let mut i = 0;
    while i < values.len() {
        let code = values[i].unwrap_or(0);
        let instruction = match code {
            0 => Some(Instruction::SetAttribute(Attribute::Normal)),
            1 => Some(Instruction::SetAttribute(Attribute::Bold)),
            3 => Some(Instruction::SetAttribute(Attribute::Italic)),
            4 => Some(Instruction::SetAttribute(Attribute::Underline)),
            22 => Some(Instruction::SetAttribute(Attribute::NoBold)),
            23 => Some(Instruction::SetAttribute(Attribute::NoItalic)),
            24 => Some(Instruction::SetAttribute(Attribute::NoUnderline)),
            30..=37 => Some(Instruction::SetForeground(
                palette.ansi[(code - 30) as usize],
            )),
            39 => Some(Instruction::SetForeground(palette.foreground)),
            40..=47 => Some(Instruction::SetBackground(
                palette.ansi[(code - 40) as usize],
            )),
            49 => Some(Instruction::SetBackground(palette.background)),
            90..=97 => Some(Instruction::SetForeground(
                palette.ansi[(code - 90 + 8) as usize],
            )),
            100..=107 => Some(Instruction::SetBackground(
                palette.ansi[(code - 100 + 8) as usize],
            )),
            38 | 48 => {
                let (color, consumed) = extended_color(&values[i + 1..], palette);
                i += consumed;
                color.map(|rgb| {
                    if code == 38 {
                        Instruction::SetForeground(rgb)
                    } else {
                        Instruction::SetBackground(rgb)
                    }
                })
            },
            _ => {
                debug!("unsupported SGR parameter {}", code);
                None
            },
        };
        if let Some(instruction) = instruction {
            out.push(instruction);
        }
        i += 1;
    }
}

/// Parse the tail of SGR 38/48: `5;n` or `2;r;g;b`.
///
/// Returns the color (if well formed) and how many parameters were consumed.
/// A malformed tail swallows the rest of the list, as xterm does.
fn extended_color(rest: &[Option<u16>], palette: &ColorPalette) -> (Option<Rgb>, usize) {
    match rest.first().copied().flatten() {
        Some(5) => match rest.get(1).copied().flatten().map(u8::try_from) {
            Some(Ok(index)) => (Some(palette.indexed(index)), 2),
            _ => (None, rest.len().min(2)),
        },
        Some(2) if rest.len() >= 4 => {
            let channel = |i: usize| rest[i].unwrap_or(0) as u32;
            (Some(Rgb::clamped(channel(1), channel(2), channel(3))), 4)
        },
        _ => (None, rest.len()),
    }
}
