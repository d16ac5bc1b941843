//! Instructions produced by the scanner
//!
//! Each instruction is self-contained: it carries every parameter needed to
//! apply it, with defaults already resolved, so the state machine never looks
//! back at scanner state.

use serde::{Deserialize, Serialize};

use crate::core::Rgb;

/// One axis of a cursor move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Offset from the current coordinate
    Relative(i32),
    /// Zero-based target coordinate
    Absolute(u32),
}

impl Axis {
    /// No movement on this axis
    pub const STAY: Axis = Axis::Relative(0);
}

/// Region selector for erase instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EraseMode {
    /// Mode 0: from the cursor to the end (inclusive)
    ToEnd,
    /// Mode 1: from the start to the cursor (inclusive)
    ToStart,
    /// Mode 2: everything
    All,
    /// Mode 3 (display only): saved scrollback lines
    Scrollback,
}

/// Style changes carried by SGR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attribute {
    /// Reset flags and both colors to their defaults
    Normal,
    Bold,
    Italic,
    Underline,
    NoBold,
    NoItalic,
    NoUnderline,
}

/// Device status report queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusQuery {
    /// DSR 5: "are you OK?"
    OperatingStatus,
    /// DSR 6: cursor position report
    CursorPosition,
}

/// Instructions produced by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Draw a character at the cursor. `'\n'` and `'\t'` are applied as
    /// line feed and tab rather than drawn.
    InsertCharacter(char),

    /// Move the cursor, each axis independently relative or absolute
    MoveCursor { x: Axis, y: Axis },

    /// Move to an absolute zero-based cell (CUP / HVP)
    CursorPosition { row: u32, col: u32 },

    /// EL
    EraseInLine(EraseMode),

    /// ED
    EraseInDisplay(EraseMode),

    /// SU: content moves up by n lines
    ScrollUp(u32),

    /// SD: content moves down by n lines
    ScrollDown(u32),

    SetForeground(Rgb),

    SetBackground(Rgb),

    SetAttribute(Attribute),

    DeviceStatusReport(StatusQuery),

    /// Recognized byte with no effect (bell, stray controls)
    Ignore,
}

impl Instruction {
    /// Check if this is an insert instruction
    pub fn is_insert(&self) -> bool {
        matches!(self, Instruction::InsertCharacter(_))
    }

    /// Check if this instruction has no effect
    pub fn is_ignore(&self) -> bool {
        matches!(self, Instruction::Ignore)
    }

    /// Relative move on both axes
    pub fn move_by(dx: i32, dy: i32) -> Self {
        Instruction::MoveCursor {
            x: Axis::Relative(dx),
            y: Axis::Relative(dy),
        }
    }
}
