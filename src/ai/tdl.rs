use std::cell::RefCell;
use std::cmp::Reverse;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::agent::Agent;
use super::ntuple::{NTupleNetwork, ValueFunction};
use crate::error::WeightsError;
use crate::game::{Actor, Board, GameOutcome};

/// Learning-rate and exploration schedule for [`TdlAgent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TdlConfig {
    pub alpha_init: f64,
    pub alpha_floor: f64,
    pub epsilon_init: f64,
    pub epsilon_floor: f64,
    /// Exponential decay rate per completed training game.
    pub decay_rate: f64,
    /// Seed for exploration; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for TdlConfig {
    fn default() -> Self {
        Self {
            alpha_init: 0.01,
            alpha_floor: 0.001,
            epsilon_init: 0.3,
            epsilon_floor: 0.1,
            decay_rate: 5e-6,
            seed: None,
        }
    }
}

/// Schedule state persisted next to the weight file so training can resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdlTrainingState {
    pub games_played: u64,
    pub alpha: f64,
    pub epsilon: f64,
}

/// One-ply agent that picks the move whose resulting position the value
/// function likes best, and learns by TD(0) toward that value while training.
pub struct TdlAgent {
    config: TdlConfig,
    network: Rc<RefCell<NTupleNetwork>>,
    opponent: Option<Rc<dyn ValueFunction>>,
    training: bool,
    alpha: f64,
    epsilon: f64,
    games_played: u64,
    last_best_value: f64,
    rng: StdRng,
}

impl TdlAgent {
    pub fn new(config: TdlConfig, network: NTupleNetwork) -> Self {
        Self::with_shared_network(config, Rc::new(RefCell::new(network)))
    }

    pub fn with_shared_network(config: TdlConfig, network: Rc<RefCell<NTupleNetwork>>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        TdlAgent {
            alpha: config.alpha_init,
            epsilon: config.epsilon_init,
            config,
            network,
            opponent: None,
            training: false,
            games_played: 0,
            last_best_value: 0.0,
            rng,
        }
    }

    /// Handle to this agent's weights, for sharing with another agent.
    pub fn network(&self) -> Rc<RefCell<NTupleNetwork>> {
        Rc::clone(&self.network)
    }

    /// Evaluate positions after our move with `opponent` instead of our own weights.
    pub fn set_opponent(&mut self, opponent: Rc<dyn ValueFunction>) {
        self.opponent = Some(opponent);
    }

    pub fn clear_opponent(&mut self) {
        self.opponent = None;
    }

    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn games_played(&self) -> u64 {
        self.games_played
    }

    /// Value of the move chosen by the last greedy selection.
    pub fn last_best_value(&self) -> f64 {
        self.last_best_value
    }

    /// Legal columns, most threatening first.
    ///
    /// Starts from center-out order and stably sorts by how many lines the
    /// opponent could still complete through each column's landing cell.
    pub fn generate_moves(&self, board: &Board, me: Actor) -> Vec<usize> {
        let mut moves = board.ordered_actions();
        moves.sort_by_key(|&col| Reverse(threat_count(board, me.other(), col)));
        moves
    }

    /// Value for `me` of dropping a disc into `col`. The board is restored.
    pub fn evaluate_move(&self, board: &mut Board, me: Actor, col: usize) -> f64 {
        if board.can_win(me, col) {
            return 1.0;
        }
        let Some(row) = board.add_disc(col, me) else {
            return -1.0;
        };
        let value = if board.is_full() {
            0.0
        } else {
            -self.opponent_value(board, me.other())
        };
        board.remove_disc(row, col);
        value
    }

    fn opponent_value(&self, board: &Board, perspective: Actor) -> f64 {
        match &self.opponent {
            Some(vf) => vf.value(board, perspective),
            None => self.network.borrow().value(board, perspective),
        }
    }

    /// Choose a column for the side to move, or `None` if no legal column exists.
    ///
    /// While training, explores with probability epsilon and otherwise updates
    /// the weights of the current position toward the best move's value.
    pub fn get_best_move(&mut self, board: &mut Board) -> Option<usize> {
        let me = board.current_turn();
        let moves = self.generate_moves(board, me);
        if moves.is_empty() {
            return None;
        }

        if self.training && self.rng.random::<f64>() < self.epsilon {
            let pick = moves[self.rng.random_range(0..moves.len())];
            debug!("exploring column {pick}");
            return Some(pick);
        }

        let mut best: Option<(usize, f64)> = None;
        for &col in &moves {
            let value = self.evaluate_move(board, me, col);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((col, value)),
            }
        }
        let (col, value) = best?;
        self.last_best_value = value;

        if self.training {
            let mut network = self.network.borrow_mut();
            let features = network.features(board, me);
            let current = network.value_of(&features);
            let error = network.td_update(&features, current, value, self.alpha);
            debug!("td update toward {value:.4} from {current:.4}, error {error:.4}");
        }
        Some(col)
    }

    /// Count a completed training game and decay alpha and epsilon.
    pub fn complete_game(&mut self) {
        self.games_played += 1;
        self.refresh_schedule();
    }

    fn refresh_schedule(&mut self) {
        let decay = (-self.config.decay_rate * self.games_played as f64).exp();
        let c = &self.config;
        self.alpha = c.alpha_floor + (c.alpha_init - c.alpha_floor) * decay;
        self.epsilon = c.epsilon_floor + (c.epsilon_init - c.epsilon_floor) * decay;
    }

    pub fn training_state(&self) -> TdlTrainingState {
        TdlTrainingState {
            games_played: self.games_played,
            alpha: self.alpha,
            epsilon: self.epsilon,
        }
    }

    pub fn restore_training_state(&mut self, state: &TdlTrainingState) {
        self.games_played = state.games_played;
        self.alpha = state.alpha;
        self.epsilon = state.epsilon;
    }

    pub fn save_weights(&self, path: &Path) -> Result<(), WeightsError> {
        self.network.borrow().save(path)
    }

    pub fn load_weights(&mut self, path: &Path) -> Result<usize, WeightsError> {
        self.network.borrow_mut().load(path)
    }

    pub fn save_state(&self, path: &Path) -> Result<(), WeightsError> {
        let json = serde_json::to_string_pretty(&self.training_state())?;
        fs::write(path, json).map_err(|e| WeightsError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn load_state(&mut self, path: &Path) -> Result<(), WeightsError> {
        let json = fs::read_to_string(path).map_err(|e| WeightsError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        let state: TdlTrainingState =
            serde_json::from_str(&json).map_err(|e| WeightsError::StateParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        info!(
            "resuming after {} games (alpha {:.5}, epsilon {:.4})",
            state.games_played, state.alpha, state.epsilon
        );
        self.restore_training_state(&state);
        Ok(())
    }
}

/// Lines `attacker` could still complete through the landing cell of `col`.
pub fn threat_count(board: &Board, attacker: Actor, col: usize) -> usize {
    board
        .next_row(col)
        .map(|row| {
            board
                .oracle()
                .open_lines(board.cells(), attacker, row * board.cols() + col)
        })
        .unwrap_or(0)
}

impl Agent for TdlAgent {
    fn select_move(&mut self, board: &mut Board) -> Option<usize> {
        self.get_best_move(board)
    }

    fn name(&self) -> &str {
        "TDL"
    }

    fn finish_game(&mut self, _outcome: GameOutcome) {
        if self.training {
            self.complete_game();
        }
    }
}
