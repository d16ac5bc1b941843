//! Escape sequence scanner
//!
//! Converts the raw output of the child process into [`Instruction`]s.
//! The scanner is incremental: bytes may arrive in arbitrary chunks and an
//! unfinished sequence is carried over to the next call.

mod dispatch;
mod instruction;
mod params;
mod state;

pub use instruction::{Attribute, Axis, EraseMode, Instruction, StatusQuery};
pub use params::{Params, MAX_PARAMS, MAX_PARAM_VALUE};
pub use state::{Prefix, Scanner, DEFAULT_MAX_SEQUENCE_LEN};
