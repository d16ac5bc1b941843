//! Screen grid
//!
//! Holds the visible cell content. Only the state machine mutates it; erase
//! and scroll operations here are the cell-level half of the corresponding
//! instructions.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Pen};
use super::color::Rgb;
use super::cursor::{Position, Size};

/// The visible cell grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    size: Size,
    /// Rows of cells, top to bottom
    lines: Vec<Vec<Cell>>,
    /// Foreground given to blank cells
    blank_foreground: Rgb,
}

impl Screen {
    /// Create a blank screen painted with the pen's colors
    pub fn new(size: Size, pen: &Pen) -> Self {
        let blank = Cell::blank(pen.foreground, pen.background);
        Self {
            size,
            lines: vec![vec![blank; size.cols]; size.rows],
            blank_foreground: pen.foreground,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn cols(&self) -> usize {
        self.size.cols
    }

    pub fn rows(&self) -> usize {
        self.size.rows
    }

    /// Get a cell at the given position
    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.lines.get(pos.row).and_then(|line| line.get(pos.col))
    }

    /// Store a cell; out-of-range positions are ignored
    pub fn put(&mut self, pos: Position, cell: Cell) {
        if let Some(slot) = self.lines.get_mut(pos.row).and_then(|l| l.get_mut(pos.col)) {
            *slot = cell;
        }
    }

    /// Blank every cell from `from` to `to` inclusive, in reading order
    pub fn erase(&mut self, from: Position, to: Position, background: Rgb) {
        let cols = self.size.cols;
        let start = from.row * cols + from.col;
        let end = to.row * cols + to.col;
        if start > end {
            return;
        }
        let blank = Cell::blank(self.blank_foreground, background);
        for index in start..=end.min(cols * self.size.rows - 1) {
            self.lines[index / cols][index % cols] = blank;
        }
    }

    /// Scroll content up by `n` lines; new lines appear at the bottom
    pub fn scroll_up(&mut self, n: usize, background: Rgb) {
        let n = n.min(self.size.rows);
        if n == 0 {
            return;
        }
        self.lines.drain(..n);
        let blank = self.blank_line(background);
        self.lines.extend(std::iter::repeat(blank).take(n));
    }

    /// Scroll content down by `n` lines; new lines appear at the top
    pub fn scroll_down(&mut self, n: usize, background: Rgb) {
        let n = n.min(self.size.rows);
        if n == 0 {
            return;
        }
        self.lines.truncate(self.size.rows - n);
        let blank = self.blank_line(background);
        self.lines.splice(0..0, std::iter::repeat(blank).take(n));
    }

    fn blank_line(&self, background: Rgb) -> Vec<Cell> {
        vec![Cell::blank(self.blank_foreground, background); self.size.cols]
    }

    /// Text of one row with trailing blanks trimmed
    pub fn row_text(&self, row: usize) -> String {
        self.lines
            .get(row)
            .map(|line| {
                let text: String = line.iter().map(Cell::display_char).collect();
                text.trim_end().to_string()
            })
            .unwrap_or_default()
    }

    /// Text of every row with trailing blanks trimmed
    pub fn text(&self) -> Vec<String> {
        (0..self.size.rows).map(|row| self.row_text(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_with_rows(rows: &[&str]) -> Screen {
        let pen = Pen::default();
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(1);
        let mut screen = Screen::new(Size::new(width, rows.len()), &pen);
        for (row, text) in rows.iter().enumerate() {
            for (col, ch) in text.chars().enumerate() {
                screen.put(Position::new(col, row), Cell::with_pen(ch, &pen));
            }
        }
        screen
    }

    #[test]
    fn test_erase_reading_order_range() {
        let mut screen = screen_with_rows(&["abcd", "efgh", "ijkl"]);
        screen.erase(Position::new(2, 0), Position::new(1, 1), Rgb::BLACK);
        assert_eq!(screen.text(), vec!["ab", "  gh", "ijkl"]);
    }

    #[test]
    fn test_erase_uses_background() {
        let mut screen = screen_with_rows(&["abcd"]);
        let blue = Rgb::new(0, 0, 255);
        screen.erase(Position::new(0, 0), Position::new(3, 0), blue);
        assert_eq!(screen.cell(Position::new(3, 0)).unwrap().background, blue);
        assert!(screen.cell(Position::new(0, 0)).unwrap().is_empty());
    }

    #[test]
    fn test_erase_inverted_range_is_noop() {
        let mut screen = screen_with_rows(&["abcd"]);
        screen.erase(Position::new(3, 0), Position::new(1, 0), Rgb::BLACK);
        assert_eq!(screen.row_text(0), "abcd");
    }

    #[test]
    fn test_scroll_up() {
        let mut screen = screen_with_rows(&["one", "two", "six"]);
        screen.scroll_up(1, Rgb::BLACK);
        assert_eq!(screen.text(), vec!["two", "six", ""]);
        assert_eq!(screen.rows(), 3);
    }

    #[test]
    fn test_scroll_down() {
        let mut screen = screen_with_rows(&["one", "two", "six"]);
        screen.scroll_down(2, Rgb::BLACK);
        assert_eq!(screen.text(), vec!["", "", "one"]);
    }

    #[test]
    fn test_scroll_more_than_rows_clears() {
        let mut screen = screen_with_rows(&["one", "two"]);
        screen.scroll_up(10, Rgb::BLACK);
        assert_eq!(screen.text(), vec!["", ""]);
        screen.scroll_down(10, Rgb::BLACK);
        assert_eq!(screen.rows(), 2);
    }
}
