use log::debug;

use super::agent::Agent;
use crate::game::{Actor, Board};

/// Base score of a decided game. Remaining depth is added so quicker wins and
/// slower losses rank higher.
pub const WIN_SCORE: i32 = 1_000_000;

/// Bonus for a window one disc short of a line, the rest empty.
pub const NEAR_LINE_BONUS: i32 = 1000;

/// Bonus for a window two discs short of a line, the rest empty.
pub const HALF_LINE_BONUS: i32 = 10;

/// Trait for scoring a non-terminal position from one side's perspective.
pub trait Heuristic {
    /// Higher is better for `actor`.
    fn evaluate(&self, board: &Board, actor: Actor) -> i32;
}

/// Default heuristic that scans all winning windows and scores open threats.
pub struct WindowHeuristic;

impl WindowHeuristic {
    /// Sum of window bonuses available to `actor`. A single opposing disc voids
    /// the window.
    pub fn side_score(board: &Board, actor: Actor) -> i32 {
        let own_cell = actor.to_cell();
        let opp_cell = actor.other().to_cell();
        let cells = board.cells();
        let connect = board.connect();

        board
            .oracle()
            .lines()
            .iter()
            .map(|line| {
                let mut own = 0;
                let mut empty = 0;
                for &idx in line {
                    match cells[idx] {
                        c if c == own_cell => own += 1,
                        c if c == opp_cell => return 0,
                        _ => empty += 1,
                    }
                }
                Self::score_window(own, empty, connect)
            })
            .sum()
    }

    fn score_window(own: usize, empty: usize, connect: usize) -> i32 {
        if own + 1 == connect && empty == 1 {
            NEAR_LINE_BONUS
        } else if own + 2 == connect && empty == 2 {
            HALF_LINE_BONUS
        } else {
            0
        }
    }
}

impl Heuristic for WindowHeuristic {
    fn evaluate(&self, board: &Board, actor: Actor) -> i32 {
        Self::side_score(board, actor) - Self::side_score(board, actor.other())
    }
}

/// Search settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Plies searched from the root. Odd depths end on the searching side's move.
    pub depth: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig { depth: 7 }
    }
}

/// Outcome of one root search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub value: i32,
    pub best_move: Option<usize>,
    pub nodes: u64,
}

/// Depth-bounded minimax agent with alpha-beta pruning.
///
/// The searching side maximizes, its opponent minimizes, and every score is
/// oriented so that higher favors the searching side. Hypothetical moves are
/// played on the caller's board with `add_disc`/`remove_disc`, so the board is
/// back in its original state when a search returns.
pub struct MinimaxAgent {
    depth: usize,
    heuristic: Box<dyn Heuristic>,
    nodes: u64,
}

impl MinimaxAgent {
    pub fn new(depth: usize) -> Self {
        MinimaxAgent {
            depth,
            heuristic: Box::new(WindowHeuristic),
            nodes: 0,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.depth)
    }

    pub fn with_heuristic(depth: usize, heuristic: Box<dyn Heuristic>) -> Self {
        MinimaxAgent {
            depth,
            heuristic,
            nodes: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Best column for the side to move, or `None` if no column is legal.
    pub fn get_move(&mut self, board: &mut Board) -> Option<usize> {
        let actor = board.current_turn();
        self.search(board, actor).best_move
    }

    /// Run a full search for `actor` at the configured depth.
    pub fn search(&mut self, board: &mut Board, actor: Actor) -> SearchResult {
        self.nodes = 0;
        let depth = self.depth.max(1);
        let (value, best_move) = self.max_value(board, actor, i32::MIN, i32::MAX, depth);
        debug!(
            "minimax depth {} for {}: move {:?} value {} ({} nodes)",
            depth,
            actor.name(),
            best_move,
            value,
            self.nodes
        );
        SearchResult {
            value,
            best_move,
            nodes: self.nodes,
        }
    }

    /// Static evaluation from `actor`'s point of view with `depth` plies left.
    pub fn utility(&self, board: &Board, actor: Actor, depth: usize) -> i32 {
        let bonus = depth as i32;
        if board.has_line(actor) {
            WIN_SCORE + bonus
        } else if board.has_line(actor.other()) {
            -(WIN_SCORE + bonus)
        } else if board.is_full() {
            0
        } else {
            self.heuristic.evaluate(board, actor)
        }
    }

    fn max_value(
        &mut self,
        board: &mut Board,
        actor: Actor,
        mut alpha: i32,
        beta: i32,
        depth: usize,
    ) -> (i32, Option<usize>) {
        self.nodes += 1;
        if depth == 0 || board.is_goal_state() {
            return (self.utility(board, actor, depth), None);
        }
        let actions = board.ordered_actions();
        if actions.is_empty() {
            return (self.utility(board, actor, depth), None);
        }

        let mut best = (i32::MIN, None);
        for col in actions {
            let Some(row) = board.add_disc(col, actor) else {
                continue;
            };
            let (value, _) = self.min_value(board, actor, alpha, beta, depth - 1);
            board.remove_disc(row, col);

            if best.1.is_none() || value > best.0 {
                best = (value, Some(col));
            }
            alpha = alpha.max(value);
            if alpha >= beta {
                break;
            }
        }
        best
    }

    fn min_value(
        &mut self,
        board: &mut Board,
        actor: Actor,
        alpha: i32,
        mut beta: i32,
        depth: usize,
    ) -> (i32, Option<usize>) {
        self.nodes += 1;
        if depth == 0 || board.is_goal_state() {
            return (self.utility(board, actor, depth), None);
        }
        let actions = board.ordered_actions();
        if actions.is_empty() {
            return (self.utility(board, actor, depth), None);
        }

        let opponent = actor.other();
        let mut best = (i32::MAX, None);
        for col in actions {
            let Some(row) = board.add_disc(col, opponent) else {
                continue;
            };
            let (value, _) = self.max_value(board, actor, alpha, beta, depth - 1);
            board.remove_disc(row, col);

            if best.1.is_none() || value < best.0 {
                best = (value, Some(col));
            }
            beta = beta.min(value);
            if alpha >= beta {
                break;
            }
        }
        best
    }
}

impl Agent for MinimaxAgent {
    fn select_move(&mut self, board: &mut Board) -> Option<usize> {
        self.get_move(board)
    }

    fn name(&self) -> &str {
        "Minimax"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::RandomAgent;
    use crate::game::GameOutcome;

    fn past_opening(board: &mut Board) {
        board.set_round(2);
    }

    /// Plain minimax over the same move order and utility, no pruning.
    fn exhaustive(
        agent: &MinimaxAgent,
        board: &mut Board,
        actor: Actor,
        depth: usize,
        maximizing: bool,
    ) -> (i32, Option<usize>) {
        if depth == 0 || board.is_goal_state() {
            return (agent.utility(board, actor, depth), None);
        }
        let actions = board.ordered_actions();
        if actions.is_empty() {
            return (agent.utility(board, actor, depth), None);
        }
        let mover = if maximizing { actor } else { actor.other() };
        let mut best: (i32, Option<usize>) = (if maximizing { i32::MIN } else { i32::MAX }, None);
        for col in actions {
            let row = board.add_disc(col, mover).unwrap();
            let (value, _) = exhaustive(agent, board, actor, depth - 1, !maximizing);
            board.remove_disc(row, col);
            let better = if maximizing { value > best.0 } else { value < best.0 };
            if best.1.is_none() || better {
                best = (value, Some(col));
            }
        }
        best
    }

    // --- Heuristic tests ---

    #[test]
    fn heuristic_empty_board_is_zero() {
        let board = Board::new();
        let h = WindowHeuristic;
        assert_eq!(h.evaluate(&board, Actor::PlayerOne), 0);
        assert_eq!(h.evaluate(&board, Actor::PlayerTwo), 0);
    }

    #[test]
    fn heuristic_is_antisymmetric() {
        let mut board = Board::new();
        board.add_disc(2, Actor::PlayerOne);
        board.add_disc(3, Actor::PlayerOne);
        board.add_disc(3, Actor::PlayerTwo);
        let h = WindowHeuristic;
        assert_eq!(
            h.evaluate(&board, Actor::PlayerOne),
            -h.evaluate(&board, Actor::PlayerTwo)
        );
    }

    #[test]
    fn heuristic_three_in_a_row_scores_high() {
        let h = WindowHeuristic;
        let mut board = Board::new();
        for col in 0..3 {
            board.add_disc(col, Actor::PlayerOne);
        }
        let score = h.evaluate(&board, Actor::PlayerOne);
        assert!(score >= NEAR_LINE_BONUS, "3-in-a-row should score high, got {score}");
    }

    #[test]
    fn heuristic_opposing_disc_voids_window() {
        let mut board = Board::with_size(1, 4, 4).unwrap();
        board.add_disc(0, Actor::PlayerOne);
        board.add_disc(1, Actor::PlayerOne);
        assert_eq!(WindowHeuristic::side_score(&board, Actor::PlayerOne), HALF_LINE_BONUS);
        board.add_disc(3, Actor::PlayerTwo);
        assert_eq!(WindowHeuristic::side_score(&board, Actor::PlayerOne), 0);
    }

    #[test]
    fn utility_prefers_faster_wins() {
        let mut board = Board::new();
        for col in 0..4 {
            board.add_disc(col, Actor::PlayerOne);
        }
        let agent = MinimaxAgent::new(5);
        assert_eq!(agent.utility(&board, Actor::PlayerOne, 3), WIN_SCORE + 3);
        assert_eq!(agent.utility(&board, Actor::PlayerTwo, 3), -(WIN_SCORE + 3));
        assert!(
            agent.utility(&board, Actor::PlayerOne, 3) > agent.utility(&board, Actor::PlayerOne, 1)
        );
    }

    #[test]
    fn utility_full_board_is_zero() {
        let mut board = Board::with_size(2, 3, 3).unwrap();
        for (col, actor) in [
            (0, Actor::PlayerOne),
            (1, Actor::PlayerTwo),
            (2, Actor::PlayerOne),
            (0, Actor::PlayerTwo),
            (1, Actor::PlayerOne),
            (2, Actor::PlayerTwo),
        ] {
            board.add_disc(col, actor);
        }
        let agent = MinimaxAgent::new(3);
        assert_eq!(agent.utility(&board, Actor::PlayerOne, 2), 0);
    }

    // --- Algorithm tests ---

    #[test]
    fn selects_legal_action() {
        let mut agent = MinimaxAgent::new(3);
        let mut board = Board::new();
        let legal = board.valid_actions();
        let action = agent.select_move(&mut board).unwrap();
        assert!(legal.contains(&action), "Action {action} is not legal");
    }

    #[test]
    fn search_leaves_board_untouched() {
        let mut board = Board::new();
        for col in [1, 2, 4, 4, 3] {
            board.play(col);
        }
        let before = board.clone();
        let mut agent = MinimaxAgent::new(5);
        agent.select_move(&mut board);
        assert_eq!(board, before);
    }

    #[test]
    fn takes_winning_move() {
        let mut board = Board::new();
        for col in 0..3 {
            board.play(col); // Player one, bottom row
            board.play(col); // Player two, second row
        }
        let mut agent = MinimaxAgent::new(4);
        assert_eq!(agent.select_move(&mut board), Some(3), "Should take winning move at col 3");
    }

    #[test]
    fn forced_win_found_at_depth_one() {
        let mut board = Board::new();
        for col in [0, 0, 1, 1, 2, 6] {
            board.play(col);
        }
        assert_eq!(board.current_turn(), Actor::PlayerOne);
        let mut agent = MinimaxAgent::new(1);
        let result = agent.search(&mut board, Actor::PlayerOne);
        assert_eq!(result.best_move, Some(3));
        assert_eq!(result.value, WIN_SCORE);
    }

    #[test]
    fn blocks_opponent_win() {
        let mut board = Board::new();
        for col in [6, 0, 6, 1, 5, 2] {
            board.play(col);
        }
        // Player two holds bottom row 0..=2; player one must block at 3.
        let mut agent = MinimaxAgent::new(4);
        assert_eq!(
            agent.select_move(&mut board),
            Some(3),
            "Should block opponent's winning move at col 3"
        );
    }

    #[test]
    fn prefers_win_over_block() {
        let mut board = Board::new();
        for col in 0..3 {
            board.play(col);
            board.play(col);
        }
        // Both sides threaten col 3; the side to move should take the win.
        let mut agent = MinimaxAgent::new(4);
        let result = agent.search(&mut board, Actor::PlayerOne);
        assert_eq!(result.best_move, Some(3));
        assert!(result.value > WIN_SCORE);
    }

    #[test]
    fn alpha_beta_matches_exhaustive_minimax_small_board() {
        let openings: [&[usize]; 4] = [&[], &[1], &[1, 2, 2], &[0, 1, 2, 3, 1]];
        for opening in openings {
            let mut board = Board::with_size(4, 4, 3).unwrap();
            past_opening(&mut board);
            for &col in opening {
                board.play(col).unwrap();
            }
            let actor = board.current_turn();
            for depth in 1..=6 {
                let mut agent = MinimaxAgent::new(depth);
                let pruned = agent.search(&mut board, actor);
                let (value, best_move) = exhaustive(&agent, &mut board, actor, depth, true);
                assert_eq!(
                    pruned.value, value,
                    "value mismatch at depth {depth} after {opening:?}"
                );
                assert_eq!(
                    pruned.best_move, best_move,
                    "move mismatch at depth {depth} after {opening:?}"
                );
            }
        }
    }

    #[test]
    fn alpha_beta_matches_exhaustive_minimax_standard_board() {
        let mut board = Board::new();
        for col in [2, 3, 4, 3, 2] {
            board.play(col);
        }
        let actor = board.current_turn();
        for depth in 1..=3 {
            let mut agent = MinimaxAgent::new(depth);
            let pruned = agent.search(&mut board, actor);
            let (value, best_move) = exhaustive(&agent, &mut board, actor, depth, true);
            assert_eq!((pruned.value, pruned.best_move), (value, best_move));
        }
    }

    #[test]
    fn pruning_visits_fewer_nodes() {
        let mut board = Board::new();
        past_opening(&mut board);
        let mut shallow = MinimaxAgent::new(4);
        let result = shallow.search(&mut board, Actor::PlayerOne);
        // 1 + 7 + 49 + 343 + 2401 nodes without pruning
        assert!(result.nodes < 2801, "expected pruning, visited {}", result.nodes);
    }

    #[test]
    fn full_board_yields_no_move() {
        let mut board = Board::with_size(2, 3, 3).unwrap();
        for (col, actor) in [
            (0, Actor::PlayerOne),
            (1, Actor::PlayerTwo),
            (2, Actor::PlayerOne),
            (0, Actor::PlayerTwo),
            (1, Actor::PlayerOne),
            (2, Actor::PlayerTwo),
        ] {
            board.add_disc(col, actor);
        }
        let mut agent = MinimaxAgent::new(3);
        assert_eq!(agent.get_move(&mut board), None);
        assert_eq!(board.available_spaces(), 0);
    }

    // --- Integration tests ---

    #[test]
    fn full_game_vs_self_completes() {
        let mut agent1 = MinimaxAgent::new(3);
        let mut agent2 = MinimaxAgent::new(3);
        let mut board = Board::new();
        let mut turn = 0;

        while !board.is_goal_state() && turn < 42 {
            let action = if turn % 2 == 0 {
                agent1.select_move(&mut board)
            } else {
                agent2.select_move(&mut board)
            };
            board.play(action.unwrap()).unwrap();
            turn += 1;
        }

        assert!(board.outcome().is_some(), "Game should complete");
    }

    #[test]
    fn beats_random_agent() {
        let games_per_color = 10;
        let mut minimax_wins = 0;
        let total = games_per_color * 2;

        for game in 0..total {
            let minimax_first = game % 2 == 0;
            let mut minimax = MinimaxAgent::new(3);
            let mut random = RandomAgent::with_seed(game as u64);
            let mut board = Board::new();
            let minimax_side = if minimax_first { Actor::PlayerOne } else { Actor::PlayerTwo };

            while !board.is_goal_state() {
                let action = if board.current_turn() == minimax_side {
                    minimax.select_move(&mut board)
                } else {
                    random.select_move(&mut board)
                };
                board.play(action.unwrap()).unwrap();
            }

            if board.outcome() == Some(GameOutcome::Winner(minimax_side)) {
                minimax_wins += 1;
            }
        }

        let win_rate = minimax_wins as f64 / total as f64;
        assert!(
            win_rate > 0.80,
            "Minimax should beat random >80% of the time, got {:.0}% ({minimax_wins}/{total})",
            win_rate * 100.0
        );
    }

    #[test]
    fn name_is_minimax() {
        let agent = MinimaxAgent::from_config(&SearchConfig::default());
        assert_eq!(agent.name(), "Minimax");
        assert_eq!(agent.depth(), 7);
    }
}
