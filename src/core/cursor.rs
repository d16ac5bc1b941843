//! Cursor position and viewport size

use serde::{Deserialize, Serialize};

/// A zero-based cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Column (0-indexed)
    pub col: usize,
    /// Row (0-indexed)
    pub row: usize,
}

impl Position {
    pub const ORIGIN: Position = Position { col: 0, row: 0 };

    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// Viewport size in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub cols: usize,
    pub rows: usize,
}

impl Size {
    /// Create a size, forcing both dimensions to at least one cell
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
        }
    }

    /// Bottom-right cell
    pub fn last(&self) -> Position {
        Position::new(self.cols - 1, self.rows - 1)
    }

    /// Clamp a signed coordinate pair into the viewport
    pub fn clamp(&self, col: i64, row: i64) -> Position {
        Position::new(
            col.clamp(0, self.cols as i64 - 1) as usize,
            row.clamp(0, self.rows as i64 - 1) as usize,
        )
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_never_empty() {
        let size = Size::new(0, 0);
        assert_eq!(size.cols, 1);
        assert_eq!(size.rows, 1);
        assert_eq!(size.last(), Position::ORIGIN);
    }

    #[test]
    fn test_clamp() {
        let size = Size::new(80, 24);
        assert_eq!(size.clamp(-5, -1), Position::new(0, 0));
        assert_eq!(size.clamp(100, 30), Position::new(79, 23));
        assert_eq!(size.clamp(10, 5), Position::new(10, 5));
    }
}
