use crate::game::{Board, GameOutcome};

/// Universal interface for everything that picks moves: search engines,
/// learners, and the random baseline.
pub trait Agent {
    /// Choose a column for the side to move on `board`.
    ///
    /// Agents may place and remove discs while thinking but must hand the board
    /// back exactly as they received it. `None` means there is no legal column.
    fn select_move(&mut self, board: &mut Board) -> Option<usize>;

    /// Return the agent's display name.
    fn name(&self) -> &str;

    /// Notify the agent that a game it played in has ended.
    fn finish_game(&mut self, _outcome: GameOutcome) {}
}
