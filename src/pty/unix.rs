//! Unix PTY implementation
//!
//! Implements PTY creation and child process management using POSIX APIs.

use std::convert::Infallible;
use std::ffi::{CStr, CString};
use std::io::{Read, Write};
use std::os::fd::BorrowedFd;
use std::os::unix::ffi::OsStringExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::fcntl::{fcntl, open, FcntlArg, OFlag};
use nix::libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::poll::{poll, PollFd, PollFlags};
use nix::pty::{grantpt, posix_openpt, ptsname, unlockpt, PtyMaster};
use nix::sys::signal::{kill, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, execvpe, fork, read, setsid, write, ForkResult, Pid};

use super::{PtyError, PtyResult, Readiness, WindowSize};

/// How long a blocked write waits for the master to drain before retrying
const WRITE_RETRY: Duration = Duration::from_millis(100);

/// Interval between reap attempts in [`Pty::wait_timeout`]
const REAP_INTERVAL: Duration = Duration::from_millis(10);

/// Exit code reported for a child killed by a signal is 128 + signal
const SIGNAL_EXIT_BASE: i32 = 128;

/// A pseudoterminal with a spawned child process
///
/// Reads, writes and polls take `&self` so one handle can be shared between
/// the reader thread and its owner.
pub struct Pty {
    /// The PTY master file descriptor
    master: PtyMaster,
    /// The child process ID
    child_pid: Pid,
    /// Exit code once the child has been reaped
    exit_code: Mutex<Option<i32>>,
}

impl Pty {
    /// Spawn `shell` with `args` on the slave side of a new PTY
    ///
    /// The child gets `TERM` set to `term`. A shell that cannot be executed
    /// is reported here as [`PtyError::Exec`], not as an early exit later.
    pub fn spawn(shell: &str, args: &[String], size: WindowSize, term: &str) -> PtyResult<Self> {
        // Everything the child needs is allocated before forking
        let shell_cstr = cstring(shell)?;
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(shell_cstr.clone());
        for arg in args {
            argv.push(cstring(arg)?);
        }
        let envp = child_environment(term)?;

        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).map_err(PtyError::OpenMaster)?;
        grantpt(&master).map_err(PtyError::GrantPty)?;
        unlockpt(&master).map_err(PtyError::UnlockPty)?;

        // SAFETY: ptsname is not thread-safe, but we're calling it immediately
        // after unlockpt and before any other thread could interfere
        let slave_name = unsafe { ptsname(&master) }.map_err(PtyError::PtsName)?;

        set_window_size(master.as_raw_fd(), size)?;

        // Both ends are close-on-exec: a successful exec closes the child's
        // end and the parent reads EOF, a failure sends the errno first.
        let (mut report_rx, mut report_tx) = UnixStream::pair()?;

        // SAFETY: the child only calls async-signal-safe functions before exec
        match unsafe { fork() }.map_err(PtyError::Fork)? {
            ForkResult::Child => {
                drop(master);
                drop(report_rx);

                let error = match exec_child(&slave_name, &shell_cstr, &argv, &envp) {
                    Ok(never) => match never {},
                    Err(errno) => errno,
                };
                let _ = report_tx.write_all(&(error as i32).to_le_bytes());
                // SAFETY: _exit skips destructors and atexit handlers that
                // belong to the parent
                unsafe { libc::_exit(127) }
            },
            ForkResult::Parent { child } => {
                drop(report_tx);

                let mut report = Vec::new();
                report_rx.read_to_end(&mut report)?;
                if let Some(code) = report.get(..4) {
                    let mut bytes = [0u8; 4];
                    bytes.copy_from_slice(code);
                    let _ = waitpid(child, None);
                    return Err(PtyError::Exec {
                        shell: shell.to_string(),
                        source: Errno::from_i32(i32::from_le_bytes(bytes)),
                    });
                }

                let flags = fcntl(master.as_raw_fd(), FcntlArg::F_GETFL)
                    .map_err(PtyError::SetNonBlocking)?;
                let flags = OFlag::from_bits_truncate(flags);
                fcntl(
                    master.as_raw_fd(),
                    FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK),
                )
                .map_err(PtyError::SetNonBlocking)?;

                Ok(Pty {
                    master,
                    child_pid: child,
                    exit_code: Mutex::new(None),
                })
            },
        }
    }

    /// Get the raw file descriptor of the PTY master
    pub fn master_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    /// Get the child process ID
    pub fn child_pid(&self) -> Pid {
        self.child_pid
    }

    /// Read from the PTY master (non-blocking)
    ///
    /// Returns `Some(n)` with the number of bytes read (`Some(0)` at EOF), or
    /// `None` if no data is available right now.
    pub fn read(&self, buf: &mut [u8]) -> PtyResult<Option<usize>> {
        match read(self.master.as_raw_fd(), buf) {
            Ok(n) => Ok(Some(n)),
            // EAGAIN and EWOULDBLOCK are the same value on Linux
            Err(Errno::EAGAIN) | Err(Errno::EINTR) => Ok(None),
            Err(e) => Err(PtyError::Read(e)),
        }
    }

    /// Write all data to the PTY master, waiting while its buffer is full
    pub fn write_all(&self, mut data: &[u8]) -> PtyResult<()> {
        while !data.is_empty() {
            match write(self.master.as_raw_fd(), data) {
                Ok(n) => data = &data[n..],
                Err(Errno::EAGAIN) => {
                    if self.poll(PollFlags::POLLOUT, WRITE_RETRY)? == Readiness::Closed {
                        return Err(PtyError::Write(Errno::EIO));
                    }
                },
                Err(Errno::EINTR) => {},
                Err(e) => return Err(PtyError::Write(e)),
            }
        }
        Ok(())
    }

    /// Wait up to `timeout` for data to read
    pub fn poll_read(&self, timeout: Duration) -> PtyResult<Readiness> {
        self.poll(PollFlags::POLLIN, timeout)
    }

    fn poll(&self, events: PollFlags, timeout: Duration) -> PtyResult<Readiness> {
        // SAFETY: The master fd is valid for the lifetime of this Pty
        let borrowed_fd = unsafe { BorrowedFd::borrow_raw(self.master.as_raw_fd()) };
        let mut fds = [PollFd::new(&borrowed_fd, events)];
        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;

        match poll(&mut fds, timeout_ms) {
            Ok(0) | Err(Errno::EINTR) => return Ok(Readiness::Idle),
            Ok(_) => {},
            Err(e) => return Err(PtyError::Poll(e)),
        }

        let revents = fds[0].revents().unwrap_or(PollFlags::empty());
        // Pending data wins over a hang-up so nothing is lost
        if revents.intersects(events) {
            Ok(Readiness::Readable)
        } else if revents.intersects(PollFlags::POLLHUP | PollFlags::POLLERR | PollFlags::POLLNVAL) {
            Ok(Readiness::Closed)
        } else {
            Ok(Readiness::Idle)
        }
    }

    /// Reap the child if it has exited, returning its exit code
    ///
    /// A child killed by a signal reports 128 + the signal number.
    pub fn try_wait(&self) -> PtyResult<Option<i32>> {
        let mut exit_code = self.exit_code.lock().unwrap_or_else(PoisonError::into_inner);
        if exit_code.is_some() {
            return Ok(*exit_code);
        }

        match waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG)).map_err(PtyError::Wait)? {
            WaitStatus::Exited(_, code) => *exit_code = Some(code),
            WaitStatus::Signaled(_, signal, _) => *exit_code = Some(SIGNAL_EXIT_BASE + signal as i32),
            _ => {},
        }
        Ok(*exit_code)
    }

    /// Poll [`Pty::try_wait`] until the child exits or `timeout` passes
    pub fn wait_timeout(&self, timeout: Duration) -> PtyResult<Option<i32>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(code) = self.try_wait()? {
                return Ok(Some(code));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            std::thread::sleep(REAP_INTERVAL);
        }
    }

    /// Send a signal to the child; a child that is already gone is not an error
    pub fn signal(&self, signal: Signal) -> PtyResult<()> {
        if self.try_wait()?.is_some() {
            return Ok(());
        }
        match kill(self.child_pid, signal) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(PtyError::Signal(e)),
        }
    }

    /// Tell the child its terminal went away
    pub fn hang_up(&self) -> PtyResult<()> {
        self.signal(Signal::SIGHUP)
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        // Try to reap the child process
        let _ = self.try_wait();
    }
}

/// Runs in the forked child; only returns if something failed
fn exec_child(
    slave_name: &str,
    shell: &CStr,
    argv: &[CString],
    envp: &[CString],
) -> nix::Result<Infallible> {
    setsid()?;

    // Opening the slave after setsid makes it the controlling terminal
    let slave_fd = open(slave_name, OFlag::O_RDWR, Mode::empty())?;

    // SAFETY: TIOCSCTTY is a valid ioctl for setting controlling terminal;
    // failure is non-fatal on systems that already assigned it on open
    unsafe {
        libc::ioctl(slave_fd, libc::TIOCSCTTY as _, 0);
    }

    dup2(slave_fd, STDIN_FILENO)?;
    dup2(slave_fd, STDOUT_FILENO)?;
    dup2(slave_fd, STDERR_FILENO)?;
    if slave_fd > STDERR_FILENO {
        let _ = close(slave_fd);
    }

    execvpe(shell, argv, envp)
}

/// The parent's environment with `TERM` replaced
fn child_environment(term: &str) -> PtyResult<Vec<CString>> {
    let mut envp: Vec<CString> = std::env::vars_os()
        .filter(|(key, _)| key.as_os_str() != "TERM")
        .filter_map(|(key, value)| {
            let mut entry = key.into_vec();
            entry.push(b'=');
            entry.extend(value.into_vec());
            CString::new(entry).ok()
        })
        .collect();
    envp.push(cstring(&format!("TERM={term}"))?);
    Ok(envp)
}

fn cstring(value: &str) -> PtyResult<CString> {
    CString::new(value).map_err(|_| PtyError::InvalidArgument(value.to_string()))
}

/// Set the window size on a PTY file descriptor
fn set_window_size(fd: RawFd, size: WindowSize) -> PtyResult<()> {
    let winsize = libc::winsize {
        ws_row: size.rows,
        ws_col: size.cols,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCSWINSZ is a valid ioctl for setting window size
    let result = unsafe { libc::ioctl(fd, libc::TIOCSWINSZ, &winsize) };

    if result < 0 {
        Err(PtyError::SetWinsize(Errno::last()))
    } else {
        Ok(())
    }
}
