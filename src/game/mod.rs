//! Core Connect Four game logic: the reversible board, the sides that play on
//! it, and the precomputed win-line table shared by the search and the learner.

mod actor;
mod board;
mod win_oracle;

pub use actor::Actor;
pub use board::{center_out_order, Board, Cell, GameOutcome, COLS, CONNECT_COUNT, ROWS};
pub use win_oracle::WinOracle;
