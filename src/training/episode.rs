use log::debug;

use crate::ai::Agent;
use crate::game::{Actor, Board, GameOutcome};
use crate::training::metrics::EpisodeResult;

/// Moves and result of one finished game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub outcome: GameOutcome,
    pub moves: Vec<usize>,
}

impl GameRecord {
    pub fn winner(&self) -> Option<Actor> {
        match self.outcome {
            GameOutcome::Winner(actor) => Some(actor),
            GameOutcome::Draw => None,
        }
    }

    pub fn result(&self) -> EpisodeResult {
        EpisodeResult {
            winner: self.winner(),
            game_length: self.moves.len(),
        }
    }
}

/// Drive `board` to a terminal state, asking `pick` for each move.
///
/// A side with no legal column ends the game as a draw. Rejected columns pass
/// the turn like live play does; the turn cap keeps a misbehaving agent from
/// looping forever.
fn run_game(
    board: &mut Board,
    mut pick: impl FnMut(Actor, &mut Board) -> Option<usize>,
) -> GameRecord {
    let turn_limit = 2 * board.rows() * board.cols();
    let mut moves = Vec::new();
    let mut turns = 0;

    while board.outcome().is_none() && turns < turn_limit {
        turns += 1;
        let mover = board.current_turn();
        let Some(col) = pick(mover, board) else {
            debug!("{} has no legal column, stopping", mover.name());
            break;
        };
        if board.play(col).is_some() {
            moves.push(col);
        }
    }

    GameRecord {
        outcome: board.outcome().unwrap_or(GameOutcome::Draw),
        moves,
    }
}

/// Play `first` (player one) against `second` (player two) from the current
/// state of `board`, then tell both agents how it ended.
pub fn play_game(board: &mut Board, first: &mut dyn Agent, second: &mut dyn Agent) -> GameRecord {
    let record = run_game(board, |mover, b| match mover {
        Actor::PlayerOne => first.select_move(b),
        Actor::PlayerTwo => second.select_move(b),
    });
    first.finish_game(record.outcome);
    second.finish_game(record.outcome);
    record
}

/// Play one self-play game. Agent plays both sides and is notified once.
pub fn play_self_play_game(board: &mut Board, agent: &mut dyn Agent) -> GameRecord {
    let record = run_game(board, |_, b| agent.select_move(b));
    agent.finish_game(record.outcome);
    record
}

/// Play a single evaluation game on a fresh copy of `template`.
/// Returns Some(true) if agent won, Some(false) if agent lost, None if draw.
pub fn play_eval_game(
    template: &Board,
    agent: &mut dyn Agent,
    opponent: &mut dyn Agent,
    agent_moves_first: bool,
) -> Option<bool> {
    let mut board = template.clone();
    board.reset();
    let (record, agent_side) = if agent_moves_first {
        (play_game(&mut board, agent, opponent), Actor::PlayerOne)
    } else {
        (play_game(&mut board, opponent, agent), Actor::PlayerTwo)
    };
    record.winner().map(|winner| winner == agent_side)
}
