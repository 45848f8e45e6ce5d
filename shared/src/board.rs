//! Board model: the grid of cells, pairwise wall mutation, move
//! validation and box-completion detection.
//!
//! The server owns the only mutable [`Board`]; clients receive it whole
//! inside snapshots and render straight from the cell layout fields.

use crate::{PlayerColor, PlayerId, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One grid square bounded by up to four walls.
///
/// Pixel layout (`x`, `y`, `width`, `height`) is computed once at board
/// creation so clients can draw a cell without re-deriving geometry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub top_wall: bool,
    pub bottom_wall: bool,
    pub left_wall: bool,
    pub right_wall: bool,
    pub is_completed: bool,
    pub completed_by: Option<PlayerId>,
    pub fill: Option<PlayerColor>,
}

impl Cell {
    fn new(row: usize, col: usize, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            row,
            col,
            x,
            y,
            width,
            height,
            top_wall: false,
            bottom_wall: false,
            left_wall: false,
            right_wall: false,
            is_completed: false,
            completed_by: None,
            fill: None,
        }
    }

    pub fn wall(&self, side: Side) -> bool {
        match side {
            Side::Top => self.top_wall,
            Side::Bottom => self.bottom_wall,
            Side::Left => self.left_wall,
            Side::Right => self.right_wall,
        }
    }

    fn set_wall(&mut self, side: Side) {
        match side {
            Side::Top => self.top_wall = true,
            Side::Bottom => self.bottom_wall = true,
            Side::Left => self.left_wall = true,
            Side::Right => self.right_wall = true,
        }
    }

    /// True when all four walls are set, regardless of completion
    /// bookkeeping.
    pub fn is_enclosed(&self) -> bool {
        self.top_wall && self.bottom_wall && self.left_wall && self.right_wall
    }
}

/// Board construction failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    InvalidDimensions { rows: usize, cols: usize },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::InvalidDimensions { rows, cols } => {
                write!(f, "invalid board dimensions {}x{}", rows, cols)
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// Why a proposed move was refused before any mutation happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveRejection {
    OutOfBounds { row: usize, col: usize },
    WallTaken { row: usize, col: usize, side: Side },
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveRejection::OutOfBounds { row, col } => {
                write!(f, "cell ({}, {}) is outside the board", row, col)
            }
            MoveRejection::WallTaken { row, col, side } => {
                write!(f, "{:?} wall of cell ({}, {}) is already drawn", side, row, col)
            }
        }
    }
}

impl std::error::Error for MoveRejection {}

/// Fixed-size grid of [`Cell`]s for the lifetime of one game.
///
/// Interior edges are stored on both adjacent cells and only ever
/// mutated pairwise through [`Board::set_wall`], so the two copies can
/// never disagree.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Board {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Vec<Cell>>,
}

impl Board {
    /// Lays the cells out on a regular grid starting at (`origin_x`,
    /// `origin_y`). Pure construction, no side effects.
    pub fn new(
        rows: usize,
        cols: usize,
        origin_x: f32,
        origin_y: f32,
        cell_width: f32,
        cell_height: f32,
    ) -> Result<Self, BoardError> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::InvalidDimensions { rows, cols });
        }

        let mut cells = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut line = Vec::with_capacity(cols);
            for col in 0..cols {
                line.push(Cell::new(
                    row,
                    col,
                    origin_x + col as f32 * cell_width,
                    origin_y + row as f32 * cell_height,
                    cell_width,
                    cell_height,
                ));
            }
            cells.push(line);
        }

        Ok(Self { rows, cols, cells })
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|line| line.get(col))
    }

    /// Grid coordinates of the cell adjacent to (`row`, `col`) on the
    /// given side, if it exists.
    pub fn neighbor(&self, row: usize, col: usize, side: Side) -> Option<(usize, usize)> {
        match side {
            Side::Top if row > 0 => Some((row - 1, col)),
            Side::Bottom if row + 1 < self.rows => Some((row + 1, col)),
            Side::Left if col > 0 => Some((row, col - 1)),
            Side::Right if col + 1 < self.cols => Some((row, col + 1)),
            _ => None,
        }
    }

    /// Checks a proposed move without mutating anything.
    pub fn validate_move(&self, row: usize, col: usize, side: Side) -> Result<(), MoveRejection> {
        let cell = self
            .cell(row, col)
            .ok_or(MoveRejection::OutOfBounds { row, col })?;
        if cell.wall(side) {
            return Err(MoveRejection::WallTaken { row, col, side });
        }
        Ok(())
    }

    /// Sets a wall on the target cell and mirrors it onto the adjacent
    /// cell sharing the edge, keeping interior edges consistent on both
    /// sides.
    ///
    /// Returns the coordinates of the cells whose wall set changed. An
    /// already-present wall yields an empty vec; callers treat that as
    /// an idempotent no-op.
    pub fn set_wall(&mut self, row: usize, col: usize, side: Side) -> Vec<(usize, usize)> {
        let Some(cell) = self.cell(row, col) else {
            return Vec::new();
        };
        if cell.wall(side) {
            return Vec::new();
        }

        self.cells[row][col].set_wall(side);
        let mut affected = vec![(row, col)];

        if let Some((n_row, n_col)) = self.neighbor(row, col, side) {
            self.cells[n_row][n_col].set_wall(side.opposite());
            affected.push((n_row, n_col));
        }

        affected
    }

    /// Marks every cell around the touched position that just became
    /// enclosed, attributing it to the mover.
    ///
    /// Scans the cell itself plus its four grid neighbors, because a
    /// single shared edge can close two cells at once. Already-completed
    /// cells are never re-claimed, so a cell is attributed at most once
    /// per game.
    pub fn claim_completions(
        &mut self,
        row: usize,
        col: usize,
        by: PlayerId,
        color: PlayerColor,
    ) -> Vec<(usize, usize)> {
        let mut candidates = vec![(row, col)];
        for side in Side::ALL {
            if let Some(pos) = self.neighbor(row, col, side) {
                candidates.push(pos);
            }
        }

        let mut completed = Vec::new();
        for (c_row, c_col) in candidates {
            let cell = &mut self.cells[c_row][c_col];
            if cell.is_enclosed() && !cell.is_completed {
                cell.is_completed = true;
                cell.completed_by = Some(by);
                cell.fill = Some(color);
                completed.push((c_row, c_col));
            }
        }
        completed
    }

    /// Terminal condition: every cell on the board is completed.
    pub fn all_completed(&self) -> bool {
        self.cells
            .iter()
            .all(|line| line.iter().all(|cell| cell.is_completed))
    }

    /// Invariant check used by tests: completion flags agree with wall
    /// state and interior edges match pairwise.
    pub fn invariants_hold(&self) -> bool {
        for line in &self.cells {
            for cell in line {
                if cell.is_completed && !cell.is_enclosed() {
                    return false;
                }
                if cell.is_completed != cell.completed_by.is_some() {
                    return false;
                }
                if cell.is_completed != cell.fill.is_some() {
                    return false;
                }
                for side in Side::ALL {
                    if let Some((n_row, n_col)) = self.neighbor(cell.row, cell.col, side) {
                        if cell.wall(side) != self.cells[n_row][n_col].wall(side.opposite()) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }
}

/// A lattice point on the dot grid; a `rows`x`cols` board has
/// `(rows + 1)` x `(cols + 1)` dots.
pub type Dot = (usize, usize);

/// Maps two clicked dots to the single structural edge between them.
///
/// Returns `None` for anything that is not exactly one grid edge:
/// diagonal pairs, non-adjacent dots, identical dots, or dots outside
/// the lattice. Both argument orders resolve to the same edge, and an
/// edge shared by two cells always resolves to the same canonical
/// (cell, side) pair so the server sees one description per edge.
pub fn resolve_edge(rows: usize, cols: usize, a: Dot, b: Dot) -> Option<(usize, usize, Side)> {
    let (a_row, a_col) = a;
    let (b_row, b_col) = b;
    if a_row > rows || b_row > rows || a_col > cols || b_col > cols {
        return None;
    }

    // Horizontal edge: same dot row, adjacent dot columns.
    if a_row == b_row && a_col.abs_diff(b_col) == 1 {
        let col = a_col.min(b_col);
        return if a_row < rows {
            Some((a_row, col, Side::Top))
        } else {
            Some((a_row - 1, col, Side::Bottom))
        };
    }

    // Vertical edge: same dot column, adjacent dot rows.
    if a_col == b_col && a_row.abs_diff(b_row) == 1 {
        let row = a_row.min(b_row);
        return if a_col < cols {
            Some((row, a_col, Side::Left))
        } else {
            Some((row, a_col - 1, Side::Right))
        };
    }

    None
}
