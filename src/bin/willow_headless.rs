//! Willow Headless Terminal Runner
//!
//! A headless terminal for testing and automation.
//! Reads input from stdin or a file and outputs the terminal state or the
//! render commands it produced.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use willow_terminal::{Config, Terminal};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Parse command line arguments
    let mut cols: Option<u16> = None;
    let mut rows: Option<u16> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut input_file: Option<String> = None;
    let mut output_format = OutputFormat::Text;
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
            "--config" => {
                i += 1;
                if i < args.len() {
                    config_path = Some(PathBuf::from(&args[i]));
                }
            },
            "-f" | "--file" => {
                i += 1;
                if i < args.len() {
                    input_file = Some(args[i].clone());
                }
            },
            "-j" | "--json" => {
                output_format = OutputFormat::Json;
            },
            "-t" | "--text" => {
                output_format = OutputFormat::Text;
            },
            "--commands" => {
                output_format = OutputFormat::Commands;
            },
            "-h" | "--help" => {
                show_help = true;
            },
            _ => {
                // Treat as input file if no flag
                if input_file.is_none() && !args[i].starts_with('-') {
                    input_file = Some(args[i].clone());
                }
            },
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
                eprintln!("Error loading config '{}': {}", path.display(), e);
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

    let mut terminal = Terminal::new(&config);

    // Read input
    let input_data = match &input_file {
        Some(path) => match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                return ExitCode::FAILURE;
            },
        },
        None => {
            // Read from stdin
            let mut data = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut data) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            data
        },
    };

    terminal.feed(&input_data);

    // Output result
    match output_format {
        OutputFormat::Text => {
            let snapshot = terminal.snapshot();
            println!("Terminal State ({}x{}):", snapshot.cols, snapshot.rows);
            println!("Cursor: ({}, {})", snapshot.cursor.row, snapshot.cursor.col);
            println!("---");
            for line in &snapshot.lines {
                println!("{}", line);
            }
            println!("---");
        },
        OutputFormat::Json => match terminal.snapshot().to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            },
        },
        OutputFormat::Commands => {
            for command in terminal.drain_renders() {
                match serde_json::to_string(&command) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing render command: {}", e);
                        return ExitCode::FAILURE;
                    },
                }
            }
        },
    }

    ExitCode::SUCCESS
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
    Commands,
}

fn print_help() {
    println!("Willow Headless Terminal Runner");
    println!();
    println!("Usage: willow-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>      Set terminal width (default: from config, 80)");
    println!("  -r, --rows <N>      Set terminal height (default: from config, 24)");
    println!("      --config <PATH> Load configuration from PATH");
    println!("  -f, --file <PATH>   Read input from file");
    println!("  -j, --json          Output snapshot as JSON");
    println!("  -t, --text          Output snapshot as text (default)");
    println!("      --commands      Output render commands as JSON lines");
    println!("  -h, --help          Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
}
