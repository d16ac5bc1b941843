//! PTY (Pseudoterminal) handling
//!
//! This module provides the low-level half of a session: opening a
//! pseudoterminal pair, spawning the shell on the slave side, and raw I/O on
//! the master side.

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::Pty;

/// Error type for PTY operations
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("Failed to open PTY master: {0}")]
    OpenMaster(#[source] nix::Error),

    #[error("Failed to grant PTY access: {0}")]
    GrantPty(#[source] nix::Error),

    #[error("Failed to unlock PTY: {0}")]
    UnlockPty(#[source] nix::Error),

    #[error("Failed to get PTY slave name: {0}")]
    PtsName(#[source] nix::Error),

    #[error("Failed to fork: {0}")]
    Fork(#[source] nix::Error),

    #[error("Failed to execute {shell}: {source}")]
    Exec {
        shell: String,
        #[source]
        source: nix::Error,
    },

    #[error("Invalid argument {0:?}: contains a NUL byte")]
    InvalidArgument(String),

    #[error("Failed to set window size: {0}")]
    SetWinsize(#[source] nix::Error),

    #[error("Failed to read from PTY: {0}")]
    Read(#[source] nix::Error),

    #[error("Failed to write to PTY: {0}")]
    Write(#[source] nix::Error),

    #[error("Failed to set non-blocking mode: {0}")]
    SetNonBlocking(#[source] nix::Error),

    #[error("Failed to poll: {0}")]
    Poll(#[source] nix::Error),

    #[error("Failed to wait for child: {0}")]
    Wait(#[source] nix::Error),

    #[error("Failed to signal child: {0}")]
    Signal(#[source] nix::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for PTY operations
pub type PtyResult<T> = Result<T, PtyError>;

/// Window size for PTY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
}

impl WindowSize {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { rows, cols }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

/// Result of waiting for the master to become readable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Data is waiting
    Readable,
    /// Nothing arrived before the timeout
    Idle,
    /// The slave side hung up or the descriptor failed
    Closed,
}
