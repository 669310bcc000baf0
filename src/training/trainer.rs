use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::ai::{Agent, MinimaxAgent, RandomAgent, SearchConfig, TdlAgent};
use crate::error::{TrainingError, WeightsError};
use crate::game::{Actor, Board};
use crate::training::episode::{play_eval_game, play_self_play_game};
use crate::training::metrics::{EvalSummary, MetricsLog, TrainingMetrics};

/// Opponent faced during evaluation blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalOpponent {
    Random,
    /// A `MinimaxAgent` built from the search settings.
    Minimax,
}

/// Trainer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_games: u64,
    pub log_interval: u64,
    pub eval_interval: u64,
    pub eval_games: usize,
    pub eval_opponent: EvalOpponent,
    pub checkpoint_interval: u64,
    pub weights_path: PathBuf,
    pub state_path: PathBuf,
    pub metrics_path: PathBuf,
    /// Seed for the random evaluation opponent.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_games: 100_000,
            log_interval: 1000,
            eval_interval: 20_000,
            eval_games: 100,
            eval_opponent: EvalOpponent::Random,
            checkpoint_interval: 20_000,
            weights_path: PathBuf::from("weights.txt"),
            state_path: PathBuf::from("training_state.json"),
            metrics_path: PathBuf::from("metrics.csv"),
            seed: None,
        }
    }
}

fn due(games: u64, interval: u64) -> bool {
    interval > 0 && games % interval == 0
}

/// Self-play trainer for TDL agents.
pub struct Trainer {
    config: TrainerConfig,
    search: SearchConfig,
    template: Board,
    metrics_log: MetricsLog,
}

impl Trainer {
    /// Games are played on fresh copies of `template`'s geometry. `search`
    /// configures the minimax evaluation opponent.
    pub fn new(config: TrainerConfig, search: SearchConfig, template: Board) -> Self {
        let metrics_log = MetricsLog::new(config.metrics_path.clone());
        Trainer {
            config,
            search,
            template,
            metrics_log,
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Run `num_games` self-play games, evaluating and checkpointing on schedule.
    /// The weights and training state are saved once more at the end.
    pub fn train(&self, agent: &mut TdlAgent) -> Result<TrainingMetrics, TrainingError> {
        let mut metrics = TrainingMetrics::new();
        let start = agent.games_played();
        let end = start + self.config.num_games;
        info!(
            "starting TDL self-play for {} games ({}..{})",
            self.config.num_games,
            start + 1,
            end
        );

        let was_training = agent.is_training();
        agent.set_training(true);

        for _ in 0..self.config.num_games {
            let mut board = self.fresh_board();
            let record = play_self_play_game(&mut board, agent);
            metrics.record_episode(record.result());
            let games = agent.games_played();

            if due(games, self.config.log_interval) {
                let window = self.config.log_interval as usize;
                info!(
                    "game {}/{} | alpha {:.5} | eps {:.4} | p1 {:.1}% | p2 {:.1}% | draw {:.1}% | avg_len {:.1}",
                    games,
                    end,
                    agent.alpha(),
                    agent.epsilon(),
                    metrics.win_rate(Actor::PlayerOne, window) * 100.0,
                    metrics.win_rate(Actor::PlayerTwo, window) * 100.0,
                    metrics.draw_rate(window) * 100.0,
                    metrics.average_game_length(window),
                );
            }

            if due(games, self.config.eval_interval) {
                let summary = self.evaluate(agent);
                self.metrics_log.append(games, summary.score())?;
            }

            if due(games, self.config.checkpoint_interval) {
                self.checkpoint(agent)?;
            }
        }

        agent.set_training(was_training);
        self.checkpoint(agent)?;
        info!("training complete after {} games", agent.games_played());
        Ok(metrics)
    }

    /// Play `eval_games` greedy games against the configured opponent,
    /// alternating who moves first. Weights are not touched.
    pub fn evaluate(&self, agent: &mut TdlAgent) -> EvalSummary {
        let was_training = agent.is_training();
        agent.set_training(false);

        let mut opponent: Box<dyn Agent> = match self.config.eval_opponent {
            EvalOpponent::Random => match self.config.seed {
                Some(seed) => Box::new(RandomAgent::with_seed(seed)),
                None => Box::new(RandomAgent::new()),
            },
            EvalOpponent::Minimax => Box::new(MinimaxAgent::from_config(&self.search)),
        };

        let mut summary = EvalSummary::default();
        for game_idx in 0..self.config.eval_games {
            let agent_first = game_idx % 2 == 0;
            summary.record(play_eval_game(
                &self.template,
                agent,
                opponent.as_mut(),
                agent_first,
            ));
        }

        agent.set_training(was_training);
        info!(
            ">> eval vs {} after {} games: {} W / {} D / {} L, score {:.3}",
            opponent.name(),
            agent.games_played(),
            summary.wins,
            summary.draws,
            summary.losses,
            summary.score()
        );
        summary
    }

    /// Save weights and training state to the configured paths.
    pub fn checkpoint(&self, agent: &TdlAgent) -> Result<(), TrainingError> {
        ensure_parent(&self.config.weights_path)?;
        ensure_parent(&self.config.state_path)?;
        agent.save_weights(&self.config.weights_path)?;
        agent.save_state(&self.config.state_path)?;
        info!(
            ">> checkpoint at {} games: {}",
            agent.games_played(),
            self.config.weights_path.display()
        );
        Ok(())
    }

    /// Restore weights and training state written by an earlier run.
    pub fn resume(&self, agent: &mut TdlAgent) -> Result<(), TrainingError> {
        agent.load_weights(&self.config.weights_path)?;
        agent.load_state(&self.config.state_path)?;
        Ok(())
    }

    fn fresh_board(&self) -> Board {
        let mut board = self.template.clone();
        board.reset();
        board
    }
}

fn ensure_parent(path: &Path) -> Result<(), WeightsError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|e| WeightsError::Write {
                path: dir.to_path_buf(),
                source: e,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{NTupleNetwork, TdlConfig};

    fn test_agent() -> TdlAgent {
        let network = NTupleNetwork::new(
            6,
            7,
            vec![
                vec![(5, 0), (5, 1), (5, 2), (5, 3)],
                vec![(4, 1), (4, 2), (4, 3), (4, 4)],
                vec![(2, 3), (3, 3), (4, 3), (5, 3)],
            ],
        );
        TdlAgent::new(
            TdlConfig {
                seed: Some(42),
                ..TdlConfig::default()
            },
            network,
        )
    }

    fn test_config(dir: &Path) -> TrainerConfig {
        TrainerConfig {
            num_games: 6,
            log_interval: 2,
            eval_interval: 3,
            eval_games: 4,
            eval_opponent: EvalOpponent::Random,
            checkpoint_interval: 3,
            weights_path: dir.join("ckpt/weights.txt"),
            state_path: dir.join("ckpt/state.json"),
            metrics_path: dir.join("metrics.csv"),
            seed: Some(9),
        }
    }

    #[test]
    fn test_train_writes_metrics_and_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = Trainer::new(test_config(dir.path()), SearchConfig::default(), Board::new());
        let mut agent = test_agent();

        let metrics = trainer.train(&mut agent).unwrap();
        assert_eq!(metrics.total_episodes(), 6);
        assert_eq!(agent.games_played(), 6);
        assert!(!agent.is_training());
        assert!(agent.alpha() < TdlConfig::default().alpha_init);

        let log = fs::read_to_string(dir.path().join("metrics.csv")).unwrap();
        let lines: Vec<_> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        for (line, games) in lines.iter().zip(["3", "6"]) {
            let (g, score) = line.split_once(',').unwrap();
            assert_eq!(g, games);
            let score: f64 = score.parse().unwrap();
            assert!((0.0..=1.0).contains(&score));
        }

        let weights = fs::read_to_string(dir.path().join("ckpt/weights.txt")).unwrap();
        assert_eq!(weights.lines().count(), 3 * 65536);
        assert!(dir.path().join("ckpt/state.json").exists());
    }

    #[test]
    fn test_resume_restores_schedule_and_weights() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = Trainer::new(test_config(dir.path()), SearchConfig::default(), Board::new());
        let mut agent = test_agent();
        trainer.train(&mut agent).unwrap();

        let mut resumed = test_agent();
        trainer.resume(&mut resumed).unwrap();
        assert_eq!(resumed.training_state(), agent.training_state());
        assert_eq!(
            resumed.network().borrow().weights(),
            agent.network().borrow().weights()
        );
    }

    #[test]
    fn test_resume_without_checkpoint_fails() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = Trainer::new(test_config(dir.path()), SearchConfig::default(), Board::new());
        let mut agent = test_agent();
        assert!(matches!(
            trainer.resume(&mut agent),
            Err(TrainingError::Weights(WeightsError::Open { .. }))
        ));
    }

    #[test]
    fn test_evaluate_plays_all_games_without_learning() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainerConfig {
            eval_games: 6,
            eval_opponent: EvalOpponent::Minimax,
            ..test_config(dir.path())
        };
        let trainer = Trainer::new(config, SearchConfig { depth: 2 }, Board::new());
        let mut agent = test_agent();
        agent.set_training(true);

        let summary = trainer.evaluate(&mut agent);
        assert_eq!(summary.games(), 6);
        assert!(agent.is_training());
        assert_eq!(agent.games_played(), 0);
        assert!(agent.network().borrow().weights().iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_eval_opponent_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            opponent: EvalOpponent,
        }
        let w: Wrapper = toml::from_str("opponent = \"minimax\"").unwrap();
        assert_eq!(w.opponent, EvalOpponent::Minimax);
        let w: Wrapper = toml::from_str("opponent = \"random\"").unwrap();
        assert_eq!(w.opponent, EvalOpponent::Random);
    }

    #[test]
    fn test_due() {
        assert!(due(20_000, 20_000));
        assert!(!due(19_999, 20_000));
        assert!(!due(5, 0));
    }
}
