//! Willow Terminal Library
//!
//! Runs a shell in a pseudoterminal and turns its output into terminal
//! state and renderer-agnostic draw commands. This crate provides:
//!
//! - `session`: PTY-backed shell sessions with a background reader
//! - `scanner`: incremental escape sequence scanner producing instructions
//! - `core`: terminal state machine, screen grid and snapshots
//! - `render`: the ordered render command queue
//! - `input`: keyboard input encoding
//! - `app`: configuration
//!
//! [`Terminal`] wires these together for a single session.

pub mod app;
pub mod core;
pub mod input;
pub mod pty;
pub mod render;
pub mod scanner;
pub mod session;
pub mod terminal;

pub use app::Config;
pub use render::{RenderCommand, RenderQueue};
pub use scanner::{Instruction, Scanner};
pub use session::{Session, SessionError, SessionOptions};
pub use terminal::{Terminal, TickStatus};
