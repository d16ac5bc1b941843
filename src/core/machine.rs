//! Terminal state machine
//!
//! Applies scanner instructions to the cursor, pen and screen grid, and
//! appends the render commands each application produces. Application is
//! deterministic and infallible: out-of-range values are clamped, unknown
//! modes are no-ops.

use crate::render::{RenderCommand, RenderQueue, ScrollDirection};
use crate::scanner::{Attribute, Axis, EraseMode, Instruction, StatusQuery};

use super::cell::{Cell, Pen};
use super::color::{ColorPalette, Rgb};
use super::cursor::{Position, Size};
use super::screen::Screen;

/// Tab stops every 8 columns
const TAB_WIDTH: usize = 8;

/// Cursor, viewport and pen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalState {
    pub cursor: Position,
    pub size: Size,
    pub pen: Pen,
}

/// Applies instructions to terminal state
#[derive(Debug)]
pub struct StateMachine {
    state: TerminalState,
    screen: Screen,
    palette: ColorPalette,
    /// Set after drawing in the last column; the next printable character
    /// wraps first
    pending_wrap: bool,
    /// Replies to status queries, oldest first
    responses: Vec<String>,
}

impl StateMachine {
    /// Create a machine with the cursor at the origin and the palette's
    /// default pen
    pub fn new(size: Size, palette: ColorPalette) -> Self {
        let pen = Pen::from_palette(&palette);
        Self {
            state: TerminalState {
                cursor: Position::ORIGIN,
                size,
                pen,
            },
            screen: Screen::new(size, &pen),
            palette,
            pending_wrap: false,
            responses: Vec::new(),
        }
    }

    pub fn state(&self) -> &TerminalState {
        &self.state
    }

    pub fn cursor(&self) -> Position {
        self.state.cursor
    }

    pub fn size(&self) -> Size {
        self.state.size
    }

    pub fn pen(&self) -> &Pen {
        &self.state.pen
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    /// Whether the next printable character starts a new row
    pub fn pending_wrap(&self) -> bool {
        self.pending_wrap
    }

    /// Take queued status replies
    pub fn take_responses(&mut self) -> Vec<String> {
        std::mem::take(&mut self.responses)
    }

    /// Apply one instruction, appending its render commands to `sink`
    pub fn apply(&mut self, instruction: Instruction, sink: &mut RenderQueue) {
        match instruction {
            Instruction::InsertCharacter('\n') => self.newline(sink),
            Instruction::InsertCharacter('\t') => self.tab(sink),
            Instruction::InsertCharacter(ch) if ch.is_control() => {},
            Instruction::InsertCharacter(ch) => self.insert(ch, sink),
            Instruction::MoveCursor { x, y } => self.move_cursor(x, y, sink),
            Instruction::CursorPosition { row, col } => {
                self.pending_wrap = false;
                self.state.cursor = self.state.size.clamp(col as i64, row as i64);
                self.emit_cursor(sink);
            },
            Instruction::EraseInLine(mode) => self.erase_in_line(mode, sink),
            Instruction::EraseInDisplay(mode) => self.erase_in_display(mode, sink),
            Instruction::ScrollUp(n) => self.scroll(ScrollDirection::Up, n as usize, sink),
            Instruction::ScrollDown(n) => self.scroll(ScrollDirection::Down, n as usize, sink),
            Instruction::SetForeground(color) => {
                self.state.pen.foreground = color;
                self.emit_colors(sink);
            },
            Instruction::SetBackground(color) => {
                self.state.pen.background = color;
                self.emit_colors(sink);
            },
            Instruction::SetAttribute(attribute) => self.set_attribute(attribute, sink),
            Instruction::DeviceStatusReport(query) => self.report_status(query),
            Instruction::Ignore => {},
        }
    }

    /// Apply a batch of instructions in order
    pub fn apply_all<I>(&mut self, instructions: I, sink: &mut RenderQueue)
    where
        I: IntoIterator<Item = Instruction>,
    {
        for instruction in instructions {
            self.apply(instruction, sink);
        }
    }

    fn insert(&mut self, ch: char, sink: &mut RenderQueue) {
        if self.pending_wrap {
            self.pending_wrap = false;
            self.state.cursor.col = 0;
            self.next_row(sink);
        }

        let pen = self.state.pen;
        let position = self.state.cursor;
        self.screen.put(position, Cell::with_pen(ch, &pen));
        sink.push(RenderCommand::DrawCharacter {
            ch,
            position,
            foreground: pen.foreground,
            background: pen.background,
            attributes: pen.attributes,
        });

        let col = position.col + 1;
        if col < self.state.size.cols {
            self.state.cursor.col = col;
        } else {
            self.pending_wrap = true;
        }
    }

    fn newline(&mut self, sink: &mut RenderQueue) {
        self.pending_wrap = false;
        self.state.cursor.col = 0;
        self.next_row(sink);
        self.emit_cursor(sink);
    }

    /// Advance one row, scrolling the grid when already on the last row
    fn next_row(&mut self, sink: &mut RenderQueue) {
        if self.state.cursor.row + 1 < self.state.size.rows {
            self.state.cursor.row += 1;
        } else {
            self.scroll(ScrollDirection::Up, 1, sink);
        }
    }

    fn tab(&mut self, sink: &mut RenderQueue) {
        self.pending_wrap = false;
        let next = (self.state.cursor.col / TAB_WIDTH + 1) * TAB_WIDTH;
        self.state.cursor.col = next.min(self.state.size.cols - 1);
        self.emit_cursor(sink);
    }

    fn move_cursor(&mut self, x: Axis, y: Axis, sink: &mut RenderQueue) {
        self.pending_wrap = false;
        let cursor = self.state.cursor;
        let cols = self.state.size.cols as i64;

        let mut col = resolve(x, cursor.col);
        let mut row = resolve(y, cursor.row);

        // Forward motion past the right edge continues on the next row
        if matches!(x, Axis::Relative(_)) && col >= cols {
            row += col / cols;
            col %= cols;
        }

        self.state.cursor = self.state.size.clamp(col, row);
        self.emit_cursor(sink);
    }

    fn erase_in_line(&mut self, mode: EraseMode, sink: &mut RenderQueue) {
        let cursor = self.state.cursor;
        let end = self.state.size.cols - 1;
        let (from, to) = match mode {
            EraseMode::ToEnd => (cursor, Position::new(end, cursor.row)),
            EraseMode::ToStart => (Position::new(0, cursor.row), cursor),
            EraseMode::All => (Position::new(0, cursor.row), Position::new(end, cursor.row)),
            EraseMode::Scrollback => return,
        };
        self.erase(from, to, sink);
    }

    fn erase_in_display(&mut self, mode: EraseMode, sink: &mut RenderQueue) {
        let cursor = self.state.cursor;
        let last = self.state.size.last();
        let (from, to) = match mode {
            EraseMode::ToEnd => (cursor, last),
            EraseMode::ToStart => (Position::ORIGIN, cursor),
            EraseMode::All => (Position::ORIGIN, last),
            // No scrollback is kept
            EraseMode::Scrollback => return,
        };
        self.erase(from, to, sink);
    }

    fn erase(&mut self, from: Position, to: Position, sink: &mut RenderQueue) {
        let background = self.state.pen.background;
        self.screen.erase(from, to, background);
        sink.push(RenderCommand::Erase {
            from,
            to,
            background,
        });
    }

    fn scroll(&mut self, direction: ScrollDirection, lines: usize, sink: &mut RenderQueue) {
        let lines = lines.min(self.state.size.rows);
        if lines == 0 {
            return;
        }
        let background = self.state.pen.background;
        match direction {
            ScrollDirection::Up => self.screen.scroll_up(lines, background),
            ScrollDirection::Down => self.screen.scroll_down(lines, background),
        }
        sink.push(RenderCommand::Scroll {
            direction,
            lines,
            background,
        });
    }

    fn set_attribute(&mut self, attribute: Attribute, sink: &mut RenderQueue) {
        if attribute == Attribute::Normal {
            self.state.pen = Pen::from_palette(&self.palette);
            self.emit_colors(sink);
        } else {
            let attrs = &mut self.state.pen.attributes;
            match attribute {
                Attribute::Bold => attrs.bold = true,
                Attribute::Italic => attrs.italic = true,
                Attribute::Underline => attrs.underline = true,
                Attribute::NoBold => attrs.bold = false,
                Attribute::NoItalic => attrs.italic = false,
                Attribute::NoUnderline => attrs.underline = false,
                Attribute::Normal => {},
            }
        }
        sink.push(RenderCommand::SetAttributes {
            attributes: self.state.pen.attributes,
        });
    }

    fn report_status(&mut self, query: StatusQuery) {
        let response = match query {
            StatusQuery::OperatingStatus => "\x1b[0n".to_string(),
            StatusQuery::CursorPosition => format!(
                "\x1b[{};{}R",
                self.state.cursor.row + 1,
                self.state.cursor.col + 1
            ),
        };
        self.responses.push(response);
    }

    fn emit_cursor(&self, sink: &mut RenderQueue) {
        sink.push(RenderCommand::MoveCursor {
            position: self.state.cursor,
        });
    }

    fn emit_colors(&self, sink: &mut RenderQueue) {
        sink.push(RenderCommand::SetColors {
            foreground: self.state.pen.foreground,
            background: self.state.pen.background,
        });
    }

    /// Current foreground, mostly for tests and renderers that skip colors
    pub fn foreground(&self) -> Rgb {
        self.state.pen.foreground
    }

    pub fn background(&self) -> Rgb {
        self.state.pen.background
    }
}

fn resolve(axis: Axis, current: usize) -> i64 {
    match axis {
        Axis::Relative(delta) => current as i64 + delta as i64,
        Axis::Absolute(value) => value as i64,
    }
}
