use std::sync::Arc;

use log::warn;

use super::actor::Actor;
use super::win_oracle::{WinOracle, DIRECTIONS};
use crate::error::BoardError;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
pub const CONNECT_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    PlayerOne,
    PlayerTwo,
}

impl Cell {
    /// The actor whose disc occupies this cell, if any
    pub fn actor(self) -> Option<Actor> {
        match self {
            Cell::Empty => None,
            Cell::PlayerOne => Some(Actor::PlayerOne),
            Cell::PlayerTwo => Some(Actor::PlayerTwo),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Actor),
    Draw,
}

/// Mutable Connect Four board with reversible disc placement.
///
/// Row 0 is the top, row `rows - 1` the bottom. Cells live in one buffer indexed
/// by `row * cols + col`. Every `add_disc` made while searching must be paired
/// with a `remove_disc` of the same cell before the search returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: usize,
    cols: usize,
    connect: usize,
    cells: Vec<Cell>,
    available_spaces: usize,
    current_turn: Actor,
    round: u32,
    // Flat indices of placed discs, most recent last.
    history: Vec<usize>,
    oracle: Arc<WinOracle>,
    move_order: Arc<[usize]>,
}

impl Board {
    /// Create an empty standard 6x7 connect-four board
    pub fn new() -> Self {
        Self::build(ROWS, COLS, CONNECT_COUNT)
    }

    /// Create an empty board of arbitrary geometry where `connect` in a row wins.
    pub fn with_size(rows: usize, cols: usize, connect: usize) -> Result<Self, BoardError> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::EmptyGrid { rows, cols });
        }
        if connect < 2 || connect > rows.max(cols) {
            return Err(BoardError::UnreachableConnect {
                connect,
                rows,
                cols,
            });
        }
        Ok(Self::build(rows, cols, connect))
    }

    fn build(rows: usize, cols: usize, connect: usize) -> Self {
        Board {
            rows,
            cols,
            connect,
            cells: vec![Cell::Empty; rows * cols],
            available_spaces: rows * cols,
            current_turn: Actor::PlayerOne,
            round: 1,
            history: Vec::with_capacity(rows * cols),
            oracle: Arc::new(WinOracle::new(rows, cols, connect)),
            move_order: center_out_order(cols).into(),
        }
    }

    /// Clear every disc and start a new game with player one to move
    pub fn reset(&mut self) {
        self.cells.fill(Cell::Empty);
        self.available_spaces = self.rows * self.cols;
        self.current_turn = Actor::PlayerOne;
        self.round = 1;
        self.history.clear();
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn connect(&self) -> usize {
        self.connect
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn oracle(&self) -> &WinOracle {
        &self.oracle
    }

    pub fn available_spaces(&self) -> usize {
        self.available_spaces
    }

    pub fn current_turn(&self) -> Actor {
        self.current_turn
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Override the round counter. Only round 1 restricts the opening columns.
    pub fn set_round(&mut self, round: u32) {
        self.round = round;
    }

    /// Position of the most recently placed disc that is still on the board
    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.history
            .last()
            .map(|&idx| (idx / self.cols, idx % self.cols))
    }

    /// Get the cell at a specific position
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    /// Column mirrored around the vertical axis
    pub fn mirror_col(&self, col: usize) -> usize {
        self.cols - 1 - col
    }

    /// Lowest empty row of `col`, or `None` if the column is full or out of range.
    pub fn next_row(&self, col: usize) -> Option<usize> {
        if col >= self.cols {
            return None;
        }
        let mut next = None;
        for row in 0..self.rows {
            if self.get(row, col) == Cell::Empty {
                next = Some(row);
            }
        }
        next
    }

    pub fn is_column_full(&self, col: usize) -> bool {
        col >= self.cols || self.get(0, col) != Cell::Empty
    }

    pub fn is_full(&self) -> bool {
        self.available_spaces == 0
    }

    /// Opening columns that are barred in round 1: both edges and the exact
    /// center on odd-width boards.
    pub fn is_dominant_move(&self, col: usize) -> bool {
        self.round == 1
            && (col == 0 || (self.cols % 2 == 1 && col == self.cols / 2) || col == self.cols - 1)
    }

    /// Drop a disc for `actor` into `col`, returning the row it landed in.
    ///
    /// An out-of-range or full column is logged and ignored.
    pub fn add_disc(&mut self, col: usize, actor: Actor) -> Option<usize> {
        let Some(row) = self.next_row(col) else {
            warn!("invalid move on column {col} for {}, skipping", actor.name());
            return None;
        };
        let idx = row * self.cols + col;
        self.cells[idx] = actor.to_cell();
        self.available_spaces -= 1;
        self.history.push(idx);
        Some(row)
    }

    /// Turn-driven placement used by live play: drops the current actor's disc,
    /// advances the round after player two, and passes the turn. The turn passes
    /// even when the column is rejected.
    pub fn play(&mut self, col: usize) -> Option<usize> {
        let mover = self.current_turn;
        let row = self.add_disc(col, mover);
        if mover == Actor::PlayerTwo {
            self.round += 1;
        }
        self.current_turn = mover.other();
        row
    }

    /// Undo a placement at (`row`, `col`).
    pub fn remove_disc(&mut self, row: usize, col: usize) {
        if row >= self.rows || col >= self.cols {
            warn!("attempted to remove disc outside the board at ({row}, {col})");
            return;
        }
        let idx = row * self.cols + col;
        debug_assert_ne!(self.cells[idx], Cell::Empty, "removing from an empty cell");
        if self.cells[idx] != Cell::Empty {
            self.cells[idx] = Cell::Empty;
            self.available_spaces += 1;
        }
        if let Some(pos) = self.history.iter().rposition(|&i| i == idx) {
            self.history.remove(pos);
        }
    }

    /// The actor whose last move completed a line, if any.
    pub fn has_winner(&self) -> Option<Actor> {
        let &idx = self.history.last()?;
        let mark = self.cells[idx];
        let actor = mark.actor()?;
        let (row, col) = (idx / self.cols, idx % self.cols);
        DIRECTIONS
            .iter()
            .any(|&(dr, dc)| {
                1 + self.run_length(row, col, dr, dc, mark)
                    + self.run_length(row, col, -dr, -dc, mark)
                    >= self.connect
            })
            .then_some(actor)
    }

    // Consecutive `mark` cells stepping from (row, col), not counting the start.
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, mark: Cell) -> usize {
        let mut count = 0;
        let mut r = row as isize + dr;
        let mut c = col as isize + dc;
        while r >= 0
            && r < self.rows as isize
            && c >= 0
            && c < self.cols as isize
            && self.cells[r as usize * self.cols + c as usize] == mark
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }

    /// True if the last move won the game or the board is full.
    pub fn is_goal_state(&self) -> bool {
        self.has_winner().is_some() || self.is_full()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        if let Some(winner) = self.has_winner() {
            Some(GameOutcome::Winner(winner))
        } else if self.is_full() {
            Some(GameOutcome::Draw)
        } else {
            None
        }
    }

    /// Would a disc of `actor` dropped into `col` complete a line right now?
    pub fn can_win(&self, actor: Actor, col: usize) -> bool {
        self.next_row(col)
            .is_some_and(|row| self.oracle.can_win(&self.cells, actor, row, col))
    }

    /// True if `actor` holds a complete line anywhere on the board.
    pub fn has_line(&self, actor: Actor) -> bool {
        self.oracle.has_line(&self.cells, actor)
    }

    /// Legal columns in board order.
    pub fn valid_actions(&self) -> Vec<usize> {
        self.valid_actions_in(0..self.cols)
    }

    /// Legal columns ordered center-out.
    pub fn ordered_actions(&self) -> Vec<usize> {
        self.valid_actions_in(self.move_order.iter().copied())
    }

    /// Legal columns in a caller-chosen order.
    pub fn valid_actions_in(&self, order: impl IntoIterator<Item = usize>) -> Vec<usize> {
        order
            .into_iter()
            .filter(|&col| !self.is_column_full(col) && !self.is_dominant_move(col))
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Middle column first, then alternating outward, left before right.
pub fn center_out_order(cols: usize) -> Vec<usize> {
    let center = cols / 2;
    let mut order = Vec::with_capacity(cols);
    order.push(center);
    for offset in 1..=cols {
        if offset <= center {
            order.push(center - offset);
        }
        if center + offset < cols {
            order.push(center + offset);
        }
    }
    order
}
