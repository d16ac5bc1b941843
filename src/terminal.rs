//! Terminal Driver
//!
//! Ties together the scanner, the state machine and the render queue, and
//! pumps a live session through them. This is the main integration point
//! between the byte stream and the terminal state.

use crate::app::Config;
use crate::core::{ColorPalette, Screen, Size, Snapshot, StateMachine};
use crate::input::{encode_key, encode_text, Key, Modifiers};
use crate::render::{RenderCommand, RenderQueue};
use crate::scanner::{Instruction, Scanner};
use crate::session::{Session, SessionError, SessionResult};

/// Whether the session is still producing output after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Running,
    /// The session is dead and all of its output has been applied
    Ended,
}

/// Scanner, state machine and render queue for one session
#[derive(Debug)]
pub struct Terminal {
    scanner: Scanner,
    machine: StateMachine,
    renders: RenderQueue,
    /// Instructions from the byte being applied
    pending: Vec<Instruction>,
}

impl Terminal {
    /// Create a terminal from configuration
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            config.scanner(),
            StateMachine::new(config.size(), config.colors.clone()),
        )
    }

    /// Create a terminal with the default palette and bounds
    pub fn with_size(cols: usize, rows: usize) -> Self {
        let palette = ColorPalette::default();
        Self::with_parts(
            Scanner::with_palette(palette.clone()),
            StateMachine::new(Size::new(cols, rows), palette),
        )
    }

    fn with_parts(scanner: Scanner, machine: StateMachine) -> Self {
        Self {
            scanner,
            machine,
            renders: RenderQueue::new(),
            pending: Vec::new(),
        }
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn screen(&self) -> &Screen {
        self.machine.screen()
    }

    /// Scan bytes from the shell and apply every completed instruction
    pub fn feed(&mut self, data: &[u8]) {
        for &byte in data {
            self.scanner.scan(byte, &mut self.pending);
            for instruction in self.pending.drain(..) {
                self.machine.apply(instruction, &mut self.renders);
            }
        }
    }

    /// Render commands not yet drained
    pub fn renders(&self) -> &RenderQueue {
        &self.renders
    }

    pub fn renders_mut(&mut self) -> &mut RenderQueue {
        &mut self.renders
    }

    /// Take every pending render command in order
    pub fn drain_renders(&mut self) -> Vec<RenderCommand> {
        self.renders.drain().collect()
    }

    /// Capture the current screen, cursor and pen
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_machine(&self.machine)
    }

    /// Take replies to status queries that still need to reach the shell
    pub fn take_responses(&mut self) -> Vec<String> {
        self.machine.take_responses()
    }

    /// Apply everything the session produced since the last tick and write
    /// status replies back to it
    pub fn tick(&mut self, session: &mut Session) -> SessionResult<TickStatus> {
        for chunk in session.drain_all_bytes() {
            self.feed(&chunk);
        }

        for response in self.take_responses() {
            match session.write(&response) {
                // Nobody left to answer
                Ok(()) | Err(SessionError::Closed) => {},
                Err(e) => return Err(e),
            }
        }

        if session.has_ended() {
            Ok(TickStatus::Ended)
        } else {
            Ok(TickStatus::Running)
        }
    }

    /// Encode a key press and write it to the session
    pub fn send_input(&self, session: &mut Session, key: Key, modifiers: Modifiers) -> SessionResult<()> {
        session.write(&encode_key(key, modifiers))
    }

    /// Normalize text and write it to the session
    pub fn send_text(&self, session: &mut Session, text: &str) -> SessionResult<()> {
        session.write(&encode_text(text))
    }
}
