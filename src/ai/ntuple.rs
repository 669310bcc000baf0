use std::cell::RefCell;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::{info, warn};

use crate::error::WeightsError;
use crate::game::{Actor, Board, Cell};

/// Longest tuple the index space allows.
pub const MAX_TUPLE_LEN: usize = 8;

/// Weights per tuple: 4^8 occupancy patterns.
pub const WEIGHTS_PER_TUPLE: usize = 65536;

/// A learned position evaluator.
pub trait ValueFunction {
    /// Estimated value in (-1, 1) of `board` for `perspective`, the side to move.
    fn value(&self, board: &Board, perspective: Actor) -> f64;
}

/// Linear value function over hashed n-tuple features, squashed with `tanh`.
///
/// Each tuple is a fixed sequence of up to eight cells. A cell contributes a
/// base-4 digit: 0 empty, 1 own disc, 2 opponent disc, 3 empty landing cell of
/// its column. Tuple `t` indexes weight `t * 65536 + Σ digit_j * 4^j`, read once
/// on the board and once on its left-right mirror.
#[derive(Debug, Clone, PartialEq)]
pub struct NTupleNetwork {
    rows: usize,
    cols: usize,
    tuples: Vec<Vec<(usize, usize)>>,
    weights: Vec<f64>,
}

impl NTupleNetwork {
    /// Build a zero-initialized network over explicit tuples of (row, col) cells.
    pub fn new(rows: usize, cols: usize, tuples: Vec<Vec<(usize, usize)>>) -> Self {
        for tuple in &tuples {
            assert!(
                !tuple.is_empty() && tuple.len() <= MAX_TUPLE_LEN,
                "tuple length {} outside 1..={MAX_TUPLE_LEN}",
                tuple.len()
            );
            assert!(
                tuple.iter().all(|&(r, c)| r < rows && c < cols),
                "tuple {tuple:?} leaves the {rows}x{cols} board"
            );
        }
        let weights = vec![0.0; tuples.len() * WEIGHTS_PER_TUPLE];
        NTupleNetwork {
            rows,
            cols,
            tuples,
            weights,
        }
    }

    /// The default tuple set for a board: every 2x4 and 4x2 block plus every
    /// two-wide falling diagonal band of length four, with mirror images of an
    /// already listed tuple left out since mirrored features are read anyway.
    pub fn standard(rows: usize, cols: usize) -> Self {
        let mut shapes: Vec<Vec<(usize, usize)>> = Vec::new();
        for (height, width) in [(2, 4), (4, 2)] {
            if rows < height || cols < width {
                continue;
            }
            for top in 0..=rows - height {
                for left in 0..=cols - width {
                    shapes.push(
                        (0..height)
                            .flat_map(|r| (0..width).map(move |c| (top + r, left + c)))
                            .collect(),
                    );
                }
            }
        }
        if rows >= 4 && cols >= 5 {
            for top in 0..=rows - 4 {
                for left in 0..=cols - 5 {
                    shapes.push(
                        (0..4)
                            .flat_map(|i| [(top + i, left + i), (top + i, left + i + 1)])
                            .collect(),
                    );
                }
            }
        }

        let mut seen: Vec<Vec<(usize, usize)>> = Vec::new();
        let mut tuples = Vec::new();
        for shape in shapes {
            let mut key = shape.clone();
            key.sort_unstable();
            let mut mirrored: Vec<_> = shape.iter().map(|&(r, c)| (r, cols - 1 - c)).collect();
            mirrored.sort_unstable();
            if seen.contains(&mirrored) {
                continue;
            }
            seen.push(key);
            tuples.push(shape);
        }
        Self::new(rows, cols, tuples)
    }

    pub fn num_tuples(&self) -> usize {
        self.tuples.len()
    }

    pub fn tuples(&self) -> &[Vec<(usize, usize)>] {
        &self.tuples
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    /// Active weight indices for `board` seen by `perspective`: for every tuple,
    /// the direct reading followed by the mirrored reading.
    pub fn features(&self, board: &Board, perspective: Actor) -> Vec<usize> {
        debug_assert_eq!((board.rows(), board.cols()), (self.rows, self.cols));
        let own = perspective.to_cell();
        let landing: Vec<Option<usize>> = (0..self.cols).map(|c| board.next_row(c)).collect();
        let digit = |row: usize, col: usize| -> usize {
            match board.get(row, col) {
                Cell::Empty if landing[col] == Some(row) => 3,
                Cell::Empty => 0,
                cell if cell == own => 1,
                _ => 2,
            }
        };

        let mut indices = Vec::with_capacity(self.tuples.len() * 2);
        for (t, tuple) in self.tuples.iter().enumerate() {
            let mut direct = t * WEIGHTS_PER_TUPLE;
            let mut mirrored = t * WEIGHTS_PER_TUPLE;
            let mut place = 1;
            for &(row, col) in tuple {
                direct += digit(row, col) * place;
                mirrored += digit(row, board.mirror_col(col)) * place;
                place *= 4;
            }
            indices.push(direct);
            indices.push(mirrored);
        }
        indices
    }

    /// `tanh` of the summed weights of `features`.
    pub fn value_of(&self, features: &[usize]) -> f64 {
        features.iter().map(|&i| self.weights[i]).sum::<f64>().tanh()
    }

    /// Nudge every fired weight toward `target`.
    ///
    /// Each occurrence of an index in `features` receives
    /// `alpha * (target - value) * (1 - value^2)`. Returns the TD error.
    pub fn td_update(&mut self, features: &[usize], value: f64, target: f64, alpha: f64) -> f64 {
        let error = target - value;
        let change = alpha * error * (1.0 - value * value);
        for &i in features {
            self.weights[i] += change;
        }
        error
    }

    /// Read weights from a newline-delimited text file, one value per line.
    ///
    /// A file that cannot be opened or read is an error. A short or malformed
    /// file is a warning: entries after the last good value are reset to 0.
    /// Returns the number of values read.
    pub fn load(&mut self, path: &Path) -> Result<usize, WeightsError> {
        let file = File::open(path).map_err(|e| WeightsError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut loaded = 0;
        for line in BufReader::new(file).lines() {
            if loaded == self.weights.len() {
                warn!(
                    "{} holds more than {} weights, ignoring the rest",
                    path.display(),
                    self.weights.len()
                );
                break;
            }
            let line = line.map_err(|e| WeightsError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
            match line.trim().parse::<f64>() {
                Ok(value) => {
                    self.weights[loaded] = value;
                    loaded += 1;
                }
                Err(_) => {
                    warn!(
                        "malformed weight {:?} on line {} of {}",
                        line,
                        loaded + 1,
                        path.display()
                    );
                    break;
                }
            }
        }

        if loaded < self.weights.len() {
            warn!(
                "{} supplied {} of {} weights, defaulting the rest to 0",
                path.display(),
                loaded,
                self.weights.len()
            );
            self.weights[loaded..].fill(0.0);
        }
        info!("loaded {} weights from {}", loaded, path.display());
        Ok(loaded)
    }

    /// Write every weight in index order, one per line.
    pub fn save(&self, path: &Path) -> Result<(), WeightsError> {
        let file = File::create(path).map_err(|e| WeightsError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        let write_err = |e| WeightsError::Write {
            path: path.to_path_buf(),
            source: e,
        };

        let mut out = BufWriter::new(file);
        for w in &self.weights {
            writeln!(out, "{w}").map_err(write_err)?;
        }
        out.flush().map_err(write_err)?;
        info!("saved {} weights to {}", self.weights.len(), path.display());
        Ok(())
    }
}

impl ValueFunction for NTupleNetwork {
    fn value(&self, board: &Board, perspective: Actor) -> f64 {
        self.value_of(&self.features(board, perspective))
    }
}

impl ValueFunction for RefCell<NTupleNetwork> {
    fn value(&self, board: &Board, perspective: Actor) -> f64 {
        self.borrow().value(board, perspective)
    }
}
