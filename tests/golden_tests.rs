//! Golden tests for terminal emulation
//!
//! These tests verify that the terminal produces correct output for known input sequences.
//! Each test feeds a byte sequence to the terminal and compares the resulting state
//! against an expected snapshot.

use willow_terminal::core::{Position, Rgb, Snapshot};
use willow_terminal::render::{RenderCommand, ScrollDirection};
use willow_terminal::Terminal;

/// Helper to run a golden test
fn run_golden_test(input: &[u8], cols: usize, rows: usize) -> (Terminal, Snapshot) {
    let mut terminal = Terminal::with_size(cols, rows);
    terminal.feed(input);
    let snapshot = terminal.snapshot();
    (terminal, snapshot)
}

/// Helper to run a golden test with chunked input (tests streaming)
fn run_golden_test_chunked(input: &[u8], cols: usize, rows: usize, chunk_size: usize) -> Terminal {
    let mut terminal = Terminal::with_size(cols, rows);
    for chunk in input.chunks(chunk_size) {
        terminal.feed(chunk);
    }
    terminal
}

// ============================================================================
// Basic printing tests
// ============================================================================

#[test]
fn test_simple_text() {
    let (_, snapshot) = run_golden_test(b"Hello, World!", 80, 24);

    assert_eq!(snapshot.cursor, Position::new(13, 0));
    assert_eq!(snapshot.lines[0], "Hello, World!");
}

#[test]
fn test_multiline_text() {
    // LF returns to column 0
    let (_, snapshot) = run_golden_test(b"Line 1\nLine 2\r\nLine 3", 80, 24);

    assert_eq!(snapshot.lines[0], "Line 1");
    assert_eq!(snapshot.lines[1], "Line 2");
    assert_eq!(snapshot.lines[2], "Line 3");
    assert_eq!(snapshot.cursor, Position::new(6, 2));
}

#[test]
fn test_carriage_return() {
    let (_, snapshot) = run_golden_test(b"AAAA\rBB", 80, 24);

    assert_eq!(snapshot.lines[0], "BBAA");
    assert_eq!(snapshot.cursor.col, 2);
}

#[test]
fn test_backspace() {
    let (_, snapshot) = run_golden_test(b"ABC\x08X", 80, 24);

    assert_eq!(snapshot.lines[0], "ABX");
    assert_eq!(snapshot.cursor.col, 3);
}

#[test]
fn test_bell_is_silent() {
    let (terminal, snapshot) = run_golden_test(b"A\x07B", 80, 24);

    assert_eq!(snapshot.lines[0], "AB");
    assert_eq!(terminal.renders().len(), 2);
}

#[test]
fn test_unicode_text() {
    let (_, snapshot) = run_golden_test("héllo 世界".as_bytes(), 80, 24);

    assert_eq!(snapshot.lines[0], "héllo 世界");
    assert_eq!(snapshot.cursor.col, 8);
}

// ============================================================================
// Wrapping and scrolling
// ============================================================================

#[test]
fn test_line_wrap() {
    let (_, snapshot) = run_golden_test(b"ABCDEFGHIJ", 5, 3);

    assert_eq!(snapshot.lines[0], "ABCDE");
    assert_eq!(snapshot.lines[1], "FGHIJ");
    // Wrapping waits for the next printable character
    assert_eq!(snapshot.cursor, Position::new(4, 1));

    let (_, snapshot) = run_golden_test(b"ABCDEFGHIJK", 5, 3);
    assert_eq!(snapshot.lines, vec!["ABCDE", "FGHIJ", "K"]);
    assert_eq!(snapshot.cursor, Position::new(1, 2));
}

#[test]
fn test_full_width_line_keeps_content() {
    let (_, snapshot) = run_golden_test(b"abc\r\nd", 3, 2);
    assert_eq!(snapshot.lines, vec!["abc", "d"]);

    // A full-width prompt line on the bottom row survives its CRLF
    let (_, snapshot) = run_golden_test(b"one\r\ntwo\r\nsix", 3, 2);
    assert_eq!(snapshot.lines, vec!["two", "six"]);
}

#[test]
fn test_scroll_on_overflow() {
    let (mut terminal, snapshot) = run_golden_test(b"one\ntwo\nthree\nfour", 10, 3);

    assert_eq!(snapshot.lines, vec!["two", "three", "four"]);
    let scrolls: Vec<_> = terminal
        .drain_renders()
        .into_iter()
        .filter(|c| matches!(c, RenderCommand::Scroll { .. }))
        .collect();
    assert_eq!(
        scrolls,
        vec![RenderCommand::Scroll {
            direction: ScrollDirection::Up,
            lines: 1,
            background: Rgb::BLACK,
        }]
    );
}

#[test]
fn test_explicit_scroll_keeps_cursor() {
    let (_, snapshot) = run_golden_test(b"a\nb\nc\x1b[2;2H\x1b[2S", 10, 3);

    assert_eq!(snapshot.lines, vec!["c", "", ""]);
    assert_eq!(snapshot.cursor, Position::new(1, 1));
}

// ============================================================================
// Cursor positioning
// ============================================================================

#[test]
fn test_cursor_home() {
    let (_, snapshot) = run_golden_test(b"text\x1b[H", 80, 24);
    assert_eq!(snapshot.cursor, Position::ORIGIN);
}

#[test]
fn test_cursor_position() {
    let (_, snapshot) = run_golden_test(b"\x1b[5;10HX", 80, 24);

    assert_eq!(snapshot.lines[4], "         X");
    assert_eq!(snapshot.cursor, Position::new(10, 4));
}

#[test]
fn test_cursor_position_hvp() {
    let (_, snapshot) = run_golden_test(b"\x1b[3;4f", 80, 24);
    assert_eq!(snapshot.cursor, Position::new(3, 2));
}

#[test]
fn test_cursor_horizontal_absolute() {
    let (_, snapshot) = run_golden_test(b"\x1b[3;1H\x1b[15G", 80, 24);
    assert_eq!(snapshot.cursor, Position::new(14, 2));
}

#[test]
fn test_overwrite_after_move() {
    let (mut terminal, snapshot) = run_golden_test(b"hi\x1b[2Dx", 80, 24);

    assert_eq!(snapshot.lines[0], "xi");
    let commands = terminal.drain_renders();
    assert_eq!(commands.len(), 4);
    assert_eq!(
        commands[2],
        RenderCommand::MoveCursor {
            position: Position::ORIGIN
        }
    );
}

// ============================================================================
// Erase
// ============================================================================

#[test]
fn test_clear_screen() {
    let (_, snapshot) = run_golden_test(b"junk\nmore junk\x1b[2J\x1b[Hclean", 80, 24);

    assert_eq!(snapshot.lines[0], "clean");
    assert_eq!(snapshot.lines[1], "");
}

#[test]
fn test_erase_to_end_of_line() {
    let (_, snapshot) = run_golden_test(b"Hello World\x1b[1;6H\x1b[K", 80, 24);
    assert_eq!(snapshot.lines[0], "Hello");
}

#[test]
fn test_shell_prompt_redraw() {
    // Typical line editor redraw: return, clear line, reprint
    let (_, snapshot) = run_golden_test(b"$ ls -la\r\x1b[K$ pwd", 80, 24);
    assert_eq!(snapshot.lines[0], "$ pwd");
}

// ============================================================================
// Attributes
// ============================================================================

#[test]
fn test_sgr_applies_to_cells() {
    let (terminal, _) = run_golden_test(b"\x1b[1;4;32mG\x1b[0mN", 80, 24);

    let screen = terminal.screen();
    let green = screen.cell(Position::new(0, 0)).unwrap();
    let plain = screen.cell(Position::new(1, 0)).unwrap();

    assert!(green.attributes.bold);
    assert!(green.attributes.underline);
    assert_ne!(green.foreground, Rgb::WHITE);
    assert!(plain.attributes.is_plain());
    assert_eq!(plain.foreground, Rgb::WHITE);
}

#[test]
fn test_truecolor_background() {
    let (terminal, snapshot) = run_golden_test(b"\x1b[48;2;10;20;30mB", 80, 24);

    assert_eq!(snapshot.pen.background, Rgb::new(10, 20, 30));
    let cell = terminal.screen().cell(Position::ORIGIN).unwrap();
    assert_eq!(cell.background, Rgb::new(10, 20, 30));
}

#[test]
fn test_title_sequence_leaves_no_trace() {
    let (_, snapshot) = run_golden_test(b"\x1b]0;my title\x07$ ", 80, 24);
    assert_eq!(snapshot.lines[0], "$");
    assert_eq!(snapshot.cursor.col, 2);
}

#[test]
fn test_private_modes_ignored() {
    let (_, snapshot) = run_golden_test(b"\x1b[?1049h\x1b[?25lok\x1b[?25h", 80, 24);
    assert_eq!(snapshot.lines[0], "ok");
}

// ============================================================================
// Streaming
// ============================================================================

#[test]
fn test_chunked_matches_whole() {
    let input = b"\x1b[1;31mred\x1b[0m\n\x1b[5;10Hmid\x1b]0;t\x07\x1b[2K\xe4\xb8\x96\x1b[3;3f!";
    let (whole, _) = run_golden_test(input, 20, 6);

    for chunk_size in 1..8 {
        let chunked = run_golden_test_chunked(input, 20, 6, chunk_size);
        assert_eq!(whole.snapshot(), chunked.snapshot(), "chunk size {}", chunk_size);
    }
}

#[test]
fn test_split_parameter() {
    let mut split = Terminal::with_size(80, 24);
    split.feed(b"\x1b[1");
    split.feed(b"2;5H");

    let (_, whole) = run_golden_test(b"\x1b[12;5H", 80, 24);
    assert_eq!(split.snapshot().cursor, whole.cursor);
    assert_eq!(whole.cursor, Position::new(4, 11));
}
