//! Willow Relay - live session driver
//!
//! Spawns a shell through a session, forwards stdin lines as typed input,
//! and prints the emulated screen whenever it changes. Useful for
//! exercising the full session/scanner/state machine pipeline without a
//! renderer.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use willow_terminal::{Config, Session, Terminal, TickStatus};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Screen refresh rate
const FRAMES_PER_SECOND: u64 = 30;

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Parse command line arguments
    let mut cols: Option<u16> = None;
    let mut rows: Option<u16> = None;
    let mut shell: Option<String> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--cols" => {
                i += 1;
                if i < args.len() {
                    cols = args[i].parse().ok();
                }
            },
            "-r" | "--rows" => {
                i += 1;
                if i < args.len() {
                    rows = args[i].parse().ok();
                }
            },
            "-s" | "--shell" => {
                i += 1;
                if i < args.len() {
                    shell = Some(args[i].clone());
                }
            },
            "--config" => {
                i += 1;
                if i < args.len() {
                    config_path = Some(PathBuf::from(&args[i]));
                }
            },
            "-h" | "--help" => {
                show_help = true;
            },
            _ => {},
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let mut config = match &config_path {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to load config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => Config::load_or_default(),
    };
    if let Some(cols) = cols {
        config.columns = cols;
    }
    if let Some(rows) = rows {
        config.rows = rows;
    }
    if shell.is_some() {
        config.shell = shell;
    }

    let mut session = match Session::start(config.session_options()) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        },
    };
    let mut terminal = Terminal::new(&config);

    // Forward stdin lines to the main loop; the session is only touched there
    let (input_tx, input_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(line).is_err() {
                break;
            }
        }
    });

    let frame = Duration::from_millis(1000 / FRAMES_PER_SECOND);
    let mut stdout = io::stdout();
    let mut input_closed = false;

    loop {
        let started = Instant::now();

        loop {
            match input_rx.try_recv() {
                Ok(line) => {
                    if let Err(e) = terminal.send_text(&mut session, &format!("{}\n", line)) {
                        tracing::warn!("Dropping input: {}", e);
                    }
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    input_closed = true;
                    break;
                },
            }
        }

        let status = match terminal.tick(&mut session) {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("Session error: {}", e);
                break;
            },
        };

        if !terminal.renders().is_empty() {
            terminal.drain_renders();
            if print_screen(&mut stdout, &terminal).is_err() {
                break;
            }
        }

        if status == TickStatus::Ended {
            tracing::info!("Shell exited");
            break;
        }
        if input_closed {
            tracing::info!("Input closed, shutting down");
            break;
        }

        if let Some(rest) = frame.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    if let Err(e) = session.shutdown(config.session.shutdown_timeout()) {
        tracing::error!("{}", e);
        return ExitCode::FAILURE;
    }

    match session.exit_code() {
        Some(0) | None => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(code.clamp(1, 255) as u8),
    }
}

fn print_screen(out: &mut impl Write, terminal: &Terminal) -> io::Result<()> {
    let snapshot = terminal.snapshot();
    writeln!(out, "--- cursor ({}, {}) ---", snapshot.cursor.row, snapshot.cursor.col)?;
    out.write_all(snapshot.to_text().as_bytes())?;
    out.flush()
}

fn print_help() {
    println!("Willow Relay - live session driver");
    println!();
    println!("Usage: willow-relay [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>      Set terminal width (default: from config, 80)");
    println!("  -r, --rows <N>      Set terminal height (default: from config, 24)");
    println!("  -s, --shell <PATH>  Shell to spawn (default: $SHELL or /bin/sh)");
    println!("      --config <PATH> Load configuration from PATH");
    println!("  -h, --help          Show this help message");
    println!();
    println!("Each line read from stdin is sent to the shell followed by a newline.");
    println!("The emulated screen is printed whenever it changes.");
}
