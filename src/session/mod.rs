//! Shell sessions
//!
//! A [`Session`] owns a PTY, the shell running on its slave side, and one
//! reader thread that moves output from the master into a channel. The
//! owner polls that channel from its own thread and writes input back
//! synchronously.
//!
//! The session is alive from a successful [`Session::start`] until the reader
//! observes EOF, a hang-up or a read error, or until [`Session::shutdown`].
//! It never comes back to life after that.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use nix::sys::signal::Signal;
use tracing::{debug, error, info, warn};

use crate::pty::{Pty, PtyError, Readiness, WindowSize};

/// Shell used when `SHELL` is unset
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// `TERM` advertised to the child
pub const DEFAULT_TERM: &str = "ansi";

/// How long the reader blocks in one poll before re-checking the stop flag
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on bytes per read
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;

/// Bound on joining the reader during shutdown
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Share of the shutdown bound kept back for reaping a child that ignored
/// SIGHUP and got SIGKILL
const KILL_GRACE: Duration = Duration::from_millis(200);

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to start session: {0}")]
    Spawn(#[from] PtyError),

    #[error("Failed to write to session: {0}")]
    Write(#[source] PtyError),

    #[error("Session is closed")]
    Closed,

    #[error("Reader did not stop within {0:?}")]
    ShutdownTimeout(Duration),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// The user's shell: `SHELL` if set and non-empty, else [`DEFAULT_SHELL`]
pub fn default_shell() -> String {
    std::env::var("SHELL")
        .ok()
        .filter(|shell| !shell.is_empty())
        .unwrap_or_else(|| DEFAULT_SHELL.to_string())
}

/// How to start a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub shell: String,
    pub args: Vec<String>,
    pub size: WindowSize,
    pub term: String,
    pub poll_interval: Duration,
    pub read_chunk_size: usize,
    pub shutdown_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new(default_shell())
    }
}

impl SessionOptions {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            args: Vec::new(),
            size: WindowSize::default(),
            term: DEFAULT_TERM.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_size(mut self, cols: u16, rows: u16) -> Self {
        self.size = WindowSize::new(cols, rows);
        self
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

/// The reader thread plus its completion signal
struct Reader {
    thread: JoinHandle<()>,
    done_rx: mpsc::Receiver<()>,
}

impl Reader {
    /// Join if the thread finishes within `timeout`
    fn join(self, timeout: Duration) -> bool {
        match self.done_rx.recv_timeout(timeout) {
            // Disconnected: the thread is gone without signalling
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if self.thread.join().is_err() {
                    warn!("PTY reader panicked");
                }
                true
            },
            Err(RecvTimeoutError::Timeout) => false,
        }
    }
}

/// A shell running in a pseudoterminal
pub struct Session {
    /// `None` once shut down
    pty: Option<Arc<Pty>>,
    shell: String,
    /// Cleared by the reader when the child side goes away
    alive: Arc<AtomicBool>,
    /// Set by shutdown to stop the reader
    stop: Arc<AtomicBool>,
    output_rx: mpsc::Receiver<Vec<u8>>,
    /// Chunks taken off the channel by [`Session::has_ended`]
    pending: VecDeque<Vec<u8>>,
    reader: Option<Reader>,
    shutdown_timeout: Duration,
    exit_code: Option<i32>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("shell", &self.shell)
            .field("child_pid", &self.child_pid())
            .field("alive", &self.is_alive())
            .field("exit_code", &self.exit_code)
            .finish()
    }
}

impl Session {
    /// Spawn the shell and start reading its output
    pub fn start(options: SessionOptions) -> SessionResult<Self> {
        let pty = Arc::new(Pty::spawn(
            &options.shell,
            &options.args,
            options.size,
            &options.term,
        )?);
        info!(
            "started {} (pid {}) at {}x{}",
            options.shell,
            pty.child_pid(),
            options.size.cols,
            options.size.rows
        );

        let alive = Arc::new(AtomicBool::new(true));
        let stop = Arc::new(AtomicBool::new(false));
        let (output_tx, output_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();

        let thread = {
            let pty = Arc::clone(&pty);
            let alive = Arc::clone(&alive);
            let stop = Arc::clone(&stop);
            let poll_interval = options.poll_interval;
            let chunk_size = options.read_chunk_size.max(1);
            thread::Builder::new()
                .name("willow-pty-reader".to_string())
                .spawn(move || {
                    read_loop(&pty, &output_tx, &stop, poll_interval, chunk_size);
                    alive.store(false, Ordering::Release);
                    let _ = done_tx.send(());
                })
                .map_err(PtyError::from)?
        };

        Ok(Self {
            pty: Some(pty),
            shell: options.shell,
            alive,
            stop,
            output_rx,
            pending: VecDeque::new(),
            reader: Some(Reader { thread, done_rx }),
            shutdown_timeout: options.shutdown_timeout,
            exit_code: None,
        })
    }

    /// Write UTF-8 text to the shell
    pub fn write(&mut self, text: &str) -> SessionResult<()> {
        self.write_bytes(text.as_bytes())
    }

    /// Write raw bytes to the shell, blocking until all are accepted
    pub fn write_bytes(&mut self, data: &[u8]) -> SessionResult<()> {
        let pty = match &self.pty {
            Some(pty) if self.is_alive() => pty,
            _ => return Err(SessionError::Closed),
        };
        if pty.try_wait().map_err(SessionError::Write)?.is_some() {
            return Err(SessionError::Closed);
        }
        pty.write_all(data).map_err(SessionError::Write)
    }

    /// Take the next chunk of output without blocking
    pub fn poll_bytes(&mut self) -> Option<Vec<u8>> {
        self.pending
            .pop_front()
            .or_else(|| self.output_rx.try_recv().ok())
    }

    /// Take every chunk currently queued
    pub fn drain_all_bytes(&mut self) -> Vec<Vec<u8>> {
        let mut chunks: Vec<Vec<u8>> = self.pending.drain(..).collect();
        chunks.extend(self.output_rx.try_iter());
        chunks
    }

    /// Check if the reader is still running
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Check if the session is dead and all of its output has been taken
    pub fn has_ended(&mut self) -> bool {
        if self.is_alive() {
            return false;
        }
        match self.output_rx.try_recv() {
            Ok(chunk) => {
                self.pending.push_back(chunk);
                false
            },
            Err(_) => self.pending.is_empty(),
        }
    }

    /// The child's exit code once it has been reaped
    ///
    /// A child killed by a signal reports 128 + the signal number.
    pub fn exit_code(&mut self) -> Option<i32> {
        if self.exit_code.is_none() {
            if let Some(pty) = &self.pty {
                self.exit_code = pty.try_wait().ok().flatten();
            }
        }
        self.exit_code
    }

    pub fn child_pid(&self) -> Option<i32> {
        self.pty.as_ref().map(|pty| pty.child_pid().as_raw())
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Stop the reader, hang up the child and release the PTY
    ///
    /// Calling this again after it returned is a no-op.
    pub fn shutdown(&mut self, timeout: Duration) -> SessionResult<()> {
        let Some(pty) = self.pty.take() else {
            return Ok(());
        };
        let deadline = Instant::now() + timeout;

        self.stop.store(true, Ordering::Release);
        if let Err(e) = pty.hang_up() {
            warn!("failed to hang up {}: {}", self.shell, e);
        }

        let joined = self.reader.take().map_or(true, |reader| reader.join(timeout));
        self.alive.store(false, Ordering::Release);

        // Both waits end by the deadline
        let remaining = deadline.saturating_duration_since(Instant::now());
        let hang_up_window = remaining - KILL_GRACE.min(remaining / 2);
        match pty.wait_timeout(hang_up_window) {
            Ok(Some(code)) => self.exit_code = Some(code),
            Ok(None) => {
                warn!("pid {} ignored SIGHUP, killing", pty.child_pid());
                if let Err(e) = pty.signal(Signal::SIGKILL) {
                    warn!("failed to kill pid {}: {}", pty.child_pid(), e);
                }
                let left = deadline.saturating_duration_since(Instant::now());
                self.exit_code = pty.wait_timeout(left).ok().flatten();
            },
            Err(e) => warn!("failed to reap pid {}: {}", pty.child_pid(), e),
        }

        if !joined {
            error!("PTY reader for {} did not stop within {:?}", self.shell, timeout);
            return Err(SessionError::ShutdownTimeout(timeout));
        }

        info!("session {} ended (exit code {:?})", self.shell, self.exit_code);
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.pty.is_some() {
            if let Err(e) = self.shutdown(self.shutdown_timeout) {
                warn!("shutdown on drop failed: {}", e);
            }
        }
    }
}

/// Move output from the master into the channel until the child side goes
/// away or `stop` is set
fn read_loop(
    pty: &Pty,
    output_tx: &mpsc::Sender<Vec<u8>>,
    stop: &AtomicBool,
    poll_interval: Duration,
    chunk_size: usize,
) {
    let mut buf = vec![0u8; chunk_size];
    while !stop.load(Ordering::Acquire) {
        match pty.poll_read(poll_interval) {
            Ok(Readiness::Readable) => {},
            Ok(Readiness::Idle) => continue,
            Ok(Readiness::Closed) => {
                debug!("PTY hung up");
                return;
            },
            Err(e) => {
                debug!("PTY poll failed: {}", e);
                return;
            },
        }

        match pty.read(&mut buf) {
            Ok(Some(0)) => {
                debug!("PTY reached EOF");
                return;
            },
            Ok(Some(n)) => {
                if output_tx.send(buf[..n].to_vec()).is_err() {
                    return;
                }
            },
            Ok(None) => {},
            // EIO once the slave side is closed
            Err(e) => {
                debug!("PTY read ended: {}", e);
                return;
            },
        }
    }
}
