//! Terminal Core Module
//!
//! Platform-independent terminal state. This module contains:
//! - Colors and palette lookup
//! - Cell and pen representation
//! - Cursor position and viewport size
//! - The screen grid
//! - The state machine that applies scanner instructions
//! - Deterministic snapshot generation
//!
//! The core is completely deterministic: given the same sequence of
//! instructions, it always produces the same state and render commands.

mod cell;
mod color;
mod cursor;
mod machine;
mod screen;
mod snapshot;

pub use cell::{Attributes, Cell, Pen};
pub use color::{ColorPalette, Rgb};
pub use cursor::{Position, Size};
pub use machine::{StateMachine, TerminalState};
pub use screen::Screen;
pub use snapshot::Snapshot;
