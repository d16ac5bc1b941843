//! Deterministic snapshot generation
//!
//! Snapshots capture the visible terminal state in a serializable format
//! for testing and debugging. Given the same byte stream, the state machine
//! must produce identical snapshots regardless of how the stream was chunked.

use serde::{Deserialize, Serialize};

use super::cell::Pen;
use super::cursor::Position;
use super::machine::StateMachine;

/// A snapshot of the terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cols: usize,
    pub rows: usize,
    /// Text of each row, trailing blanks trimmed
    pub lines: Vec<String>,
    pub cursor: Position,
    pub pen: Pen,
}

impl Snapshot {
    /// Capture the state machine's current state
    pub fn from_machine(machine: &StateMachine) -> Self {
        let screen = machine.screen();
        Self {
            cols: screen.cols(),
            rows: screen.rows(),
            lines: screen.text(),
            cursor: machine.cursor(),
            pen: *machine.pen(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Screen text, one row per line, trailing empty rows removed
    pub fn to_text(&self) -> String {
        let mut result = String::new();
        for line in &self.lines {
            result.push_str(line);
            result.push('\n');
        }
        while result.ends_with("\n\n") {
            result.pop();
        }
        result
    }
}
