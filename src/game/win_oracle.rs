use super::actor::Actor;
use super::board::Cell;

/// Step directions of a line: vertical, horizontal, and both diagonals.
pub(crate) const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Precomputed winning lines for one board geometry.
///
/// A line is `connect` consecutive cells in one of the four directions, stored as
/// flat indices (`row * cols + col`). For every cell the oracle also keeps the
/// companion cells of each line through it, so "would a disc here complete a
/// line" is a lookup instead of a board mutation followed by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinOracle {
    rows: usize,
    cols: usize,
    connect: usize,
    lines: Vec<Vec<usize>>,
    through: Vec<Vec<usize>>,
    // Per cell: the other `connect - 1` cells of each line through it, concatenated.
    companions: Vec<Vec<usize>>,
}

impl WinOracle {
    /// Build the table for a `rows` x `cols` board where `connect` in a row wins.
    pub fn new(rows: usize, cols: usize, connect: usize) -> Self {
        let mut lines = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                for (dr, dc) in DIRECTIONS {
                    let reach = connect as isize - 1;
                    let end_r = row as isize + dr * reach;
                    let end_c = col as isize + dc * reach;
                    if end_r < 0 || end_r >= rows as isize || end_c < 0 || end_c >= cols as isize {
                        continue;
                    }
                    let line: Vec<usize> = (0..connect as isize)
                        .map(|k| {
                            let r = (row as isize + dr * k) as usize;
                            let c = (col as isize + dc * k) as usize;
                            r * cols + c
                        })
                        .collect();
                    lines.push(line);
                }
            }
        }

        let mut through = vec![Vec::new(); rows * cols];
        for (id, line) in lines.iter().enumerate() {
            for &cell in line {
                through[cell].push(id);
            }
        }

        let companions = through
            .iter()
            .enumerate()
            .map(|(cell, ids)| {
                ids.iter()
                    .flat_map(|&id| lines[id].iter().copied().filter(move |&c| c != cell))
                    .collect()
            })
            .collect();

        WinOracle {
            rows,
            cols,
            connect,
            lines,
            through,
            companions,
        }
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

    /// Every winning window on the board.
    pub fn lines(&self) -> &[Vec<usize>] {
        &self.lines
    }

    /// The windows passing through the cell at flat index `idx`.
    pub fn lines_through(&self, idx: usize) -> impl Iterator<Item = &[usize]> + '_ {
        self.through[idx].iter().map(move |&id| self.lines[id].as_slice())
    }

    /// Companion groups of `connect - 1` cells that complete a line with `idx`.
    pub fn companions(&self, idx: usize) -> std::slice::ChunksExact<'_, usize> {
        self.companions[idx].chunks_exact(self.connect - 1)
    }

    /// True if a disc of `actor` at (`row`, `col`) would complete a line, given the
    /// current `cells`. The target cell itself is not inspected.
    pub fn can_win(&self, cells: &[Cell], actor: Actor, row: usize, col: usize) -> bool {
        if row >= self.rows || col >= self.cols {
            return false;
        }
        let mark = actor.to_cell();
        self.companions(row * self.cols + col)
            .any(|group| group.iter().all(|&c| cells[c] == mark))
    }

    /// True if `actor` already holds a complete line anywhere on the board.
    pub fn has_line(&self, cells: &[Cell], actor: Actor) -> bool {
        let mark = actor.to_cell();
        self.lines
            .iter()
            .any(|line| line.iter().all(|&c| cells[c] == mark))
    }

    /// Number of lines through `idx` that hold no disc of `actor`'s opponent,
    /// i.e. lines `actor` could still complete through that cell.
    pub fn open_lines(&self, cells: &[Cell], actor: Actor, idx: usize) -> usize {
        let blocker = actor.other().to_cell();
        self.lines_through(idx)
            .filter(|line| line.iter().all(|&c| cells[c] != blocker))
            .count()
    }
}
