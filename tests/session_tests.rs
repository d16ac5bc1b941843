//! Integration tests for live sessions
//!
//! These tests verify end-to-end behavior with a real PTY and shell.

use std::time::{Duration, Instant};

use willow_terminal::input::{Key, Modifiers};
use willow_terminal::session::{SessionError, SessionOptions};
use willow_terminal::{Session, Terminal, TickStatus};

/// Tick until `done` holds for the screen text or `timeout` passes
fn pump_until(
    terminal: &mut Terminal,
    session: &mut Session,
    timeout: Duration,
    done: impl Fn(&[String]) -> bool,
) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        let status = terminal.tick(session).expect("tick failed");
        if done(&terminal.snapshot().lines) {
            return true;
        }
        if status == TickStatus::Ended {
            return false;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

/// Scheduling and reap polling overshoot allowed on top of a shutdown bound
const REAP_SLACK: Duration = Duration::from_millis(100);

fn contains(lines: &[String], needle: &str) -> bool {
    lines.iter().any(|line| line.contains(needle))
}

fn sh(script: &str) -> SessionOptions {
    SessionOptions::new("/bin/sh").with_args(["-c", script])
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_session_output_reaches_screen() {
    let mut session = Session::start(sh("echo willow-$((1+2))")).expect("Failed to start session");
    let mut terminal = Terminal::with_size(80, 24);

    assert!(pump_until(
        &mut terminal,
        &mut session,
        Duration::from_secs(5),
        |lines| contains(lines, "willow-3")
    ));
}

#[test]
fn test_session_ends_when_child_exits() {
    let mut session = Session::start(sh("printf done; exit 4")).expect("Failed to start session");
    let mut terminal = Terminal::with_size(80, 24);

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut status = TickStatus::Running;
    while Instant::now() < deadline && status == TickStatus::Running {
        status = terminal.tick(&mut session).unwrap();
        std::thread::sleep(Duration::from_millis(20));
    }

    assert_eq!(status, TickStatus::Ended);
    assert!(!session.is_alive());
    // Output produced right before exit is not lost
    assert_eq!(terminal.snapshot().lines[0], "done");

    let deadline = Instant::now() + Duration::from_secs(5);
    while session.exit_code().is_none() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(session.exit_code(), Some(4));

    assert!(matches!(session.write("late"), Err(SessionError::Closed)));
    session.shutdown(Duration::from_secs(1)).unwrap();
}

#[test]
fn test_missing_shell_is_spawn_error() {
    let result = Session::start(SessionOptions::new("/nonexistent/willow-shell"));
    assert!(matches!(result, Err(SessionError::Spawn(_))));
}

#[test]
fn test_shutdown_is_bounded() {
    let mut session = Session::start(
        SessionOptions::new("/bin/cat").with_poll_interval(Duration::from_millis(50)),
    )
    .expect("Failed to start session");
    assert!(session.is_alive());
    assert!(session.child_pid().is_some());

    let timeout = Duration::from_secs(1);
    let started = Instant::now();
    session.shutdown(timeout).expect("shutdown timed out");
    assert!(started.elapsed() < timeout + REAP_SLACK, "{:?}", started.elapsed());

    assert!(!session.is_alive());
    assert!(session.child_pid().is_none());
    assert!(matches!(session.write("x"), Err(SessionError::Closed)));

    // Second call is a no-op
    session.shutdown(Duration::from_secs(1)).unwrap();
}

#[test]
fn test_shutdown_kills_child_ignoring_hangup() {
    let mut session = Session::start(
        sh("trap '' HUP; echo armed; while :; do :; done")
            .with_poll_interval(Duration::from_millis(50)),
    )
    .expect("Failed to start session");
    let mut terminal = Terminal::with_size(80, 24);
    assert!(pump_until(
        &mut terminal,
        &mut session,
        Duration::from_secs(5),
        |lines| contains(lines, "armed")
    ));

    let timeout = Duration::from_millis(300);
    let started = Instant::now();
    session.shutdown(timeout).expect("shutdown timed out");
    assert!(started.elapsed() < timeout + REAP_SLACK, "{:?}", started.elapsed());

    // SIGKILL
    assert_eq!(session.exit_code(), Some(128 + 9));
    assert!(!session.is_alive());
}

#[test]
fn test_drop_shuts_down() {
    let session = Session::start(SessionOptions::new("/bin/cat")).expect("Failed to start session");

    let started = Instant::now();
    drop(session);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn test_sessions_are_independent() {
    let mut first = Session::start(SessionOptions::new("/bin/cat")).unwrap();
    let mut second = Session::start(SessionOptions::new("/bin/cat")).unwrap();

    first.shutdown(Duration::from_secs(1)).unwrap();

    // Stopping one session must not stop the other's reader
    assert!(!first.is_alive());
    assert!(second.is_alive());
    second.write("still here\n").unwrap();

    let mut terminal = Terminal::with_size(80, 24);
    assert!(pump_until(
        &mut terminal,
        &mut second,
        Duration::from_secs(5),
        |lines| contains(lines, "still here")
    ));
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn test_echo_round_trip() {
    let mut session = Session::start(SessionOptions::new("/bin/cat")).expect("Failed to start session");
    let mut terminal = Terminal::with_size(80, 24);

    session.write("ping\n").unwrap();

    // Line discipline echo, then cat's copy
    assert!(pump_until(
        &mut terminal,
        &mut session,
        Duration::from_secs(5),
        |lines| lines[0] == "ping" && lines[1] == "ping"
    ));
}

#[test]
fn test_send_input_keys() {
    let mut session = Session::start(SessionOptions::new("/bin/cat")).expect("Failed to start session");
    let mut terminal = Terminal::with_size(80, 24);

    for c in "hey".chars() {
        terminal
            .send_input(&mut session, Key::Char(c), Modifiers::NONE)
            .unwrap();
    }
    terminal
        .send_input(&mut session, Key::Enter, Modifiers::NONE)
        .unwrap();

    assert!(pump_until(
        &mut terminal,
        &mut session,
        Duration::from_secs(5),
        |lines| lines[1] == "hey"
    ));
}

#[test]
fn test_send_text_normalizes_newlines() {
    let mut session = Session::start(SessionOptions::new("/bin/cat")).expect("Failed to start session");
    let mut terminal = Terminal::with_size(80, 24);

    terminal.send_text(&mut session, "one\r\n").unwrap();

    assert!(pump_until(
        &mut terminal,
        &mut session,
        Duration::from_secs(5),
        |lines| lines[1] == "one"
    ));
}

#[test]
fn test_small_read_chunks_lose_nothing() {
    let mut session = Session::start(
        sh("i=0; while [ $i -lt 20 ]; do echo line$i; i=$((i+1)); done").with_read_chunk_size(3),
    )
    .expect("Failed to start session");
    let mut terminal = Terminal::with_size(40, 30);

    assert!(pump_until(
        &mut terminal,
        &mut session,
        Duration::from_secs(5),
        |lines| lines[19] == "line19"
    ));
    let lines = terminal.snapshot().lines;
    for (i, line) in lines.iter().take(20).enumerate() {
        assert_eq!(line, &format!("line{}", i));
    }
}

#[test]
fn test_status_report_reaches_child() {
    // The child asks for the cursor position and dumps the raw reply
    let mut session = Session::start(sh(
        "stty raw -echo; printf 'ab\\033[6n'; dd bs=1 count=6 2>/dev/null | od -c",
    ))
    .expect("Failed to start session");
    let mut terminal = Terminal::with_size(80, 24);

    let squeezed = |lines: &[String]| -> String {
        lines.concat().chars().filter(|c| !c.is_whitespace()).collect()
    };
    assert!(pump_until(
        &mut terminal,
        &mut session,
        Duration::from_secs(5),
        |lines| squeezed(lines).contains("033[1;3R")
    ));
}
