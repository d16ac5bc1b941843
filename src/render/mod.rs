//! Render commands
//!
//! The state machine appends one command per visible effect to a
//! [`RenderQueue`]. A renderer drains the queue on its own cadence; every
//! command carries the absolute state needed to draw it, so a renderer never
//! has to remember earlier commands to interpret a later one.

use std::collections::vec_deque::{self, VecDeque};

use serde::{Deserialize, Serialize};

use crate::core::{Attributes, Position, Rgb};

/// Direction of a scroll command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollDirection {
    /// Content moves up, blank lines appear at the bottom
    Up,
    /// Content moves down, blank lines appear at the top
    Down,
}

/// A renderer-agnostic description of one visual effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderCommand {
    /// Draw a glyph into a cell
    DrawCharacter {
        ch: char,
        position: Position,
        foreground: Rgb,
        background: Rgb,
        attributes: Attributes,
    },
    /// The cursor now sits at `position`
    MoveCursor { position: Position },
    /// The pen colors changed
    SetColors { foreground: Rgb, background: Rgb },
    /// The pen style flags changed
    SetAttributes { attributes: Attributes },
    /// Blank every cell from `from` to `to` inclusive, in reading order
    Erase {
        from: Position,
        to: Position,
        background: Rgb,
    },
    /// Shift the whole viewport by `lines`, filling with `background`
    Scroll {
        direction: ScrollDirection,
        lines: usize,
        background: Rgb,
    },
}

/// Ordered, append-only queue of render commands
#[derive(Debug, Default)]
pub struct RenderQueue {
    commands: VecDeque<RenderCommand>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push_back(command);
    }

    /// Take the oldest pending command
    pub fn pop(&mut self) -> Option<RenderCommand> {
        self.commands.pop_front()
    }

    /// Remove and yield every pending command in order
    pub fn drain(&mut self) -> vec_deque::Drain<'_, RenderCommand> {
        self.commands.drain(..)
    }

    /// Pending commands without consuming them
    pub fn iter(&self) -> vec_deque::Iter<'_, RenderCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
