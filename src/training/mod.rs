pub mod episode;
pub mod metrics;
pub mod trainer;

pub use episode::{play_eval_game, play_game, play_self_play_game, GameRecord};
pub use metrics::{EpisodeResult, EvalSummary, MetricsLog, TrainingMetrics};
pub use trainer::{EvalOpponent, Trainer, TrainerConfig};
