use std::path::Path;

use log::warn;

use crate::ai::{SearchConfig, TdlConfig};
use crate::error::{BoardError, ConfigError};
use crate::game::{Board, COLS, CONNECT_COUNT, ROWS};
use crate::training::trainer::TrainerConfig;

/// Board geometry.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub rows: usize,
    pub cols: usize,
    pub connect: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            rows: ROWS,
            cols: COLS,
            connect: CONNECT_COUNT,
        }
    }
}

impl BoardConfig {
    pub fn build(&self) -> Result<Board, BoardError> {
        Board::with_size(self.rows, self.cols, self.connect)
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub search: SearchConfig,
    pub tdl: TdlConfig,
    pub training: TrainerConfig,
}

fn invalid(msg: &str) -> Result<(), ConfigError> {
    Err(ConfigError::Validation(msg.into()))
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = self.board.build() {
            return Err(ConfigError::Validation(format!("board: {e}")));
        }
        if self.search.depth == 0 {
            return invalid("search.depth must be >= 1");
        }

        let tdl = &self.tdl;
        if tdl.alpha_init <= 0.0 {
            return invalid("tdl.alpha_init must be > 0");
        }
        if tdl.alpha_floor < 0.0 || tdl.alpha_floor > tdl.alpha_init {
            return invalid("tdl.alpha_floor must be in [0, tdl.alpha_init]");
        }
        if !(0.0..=1.0).contains(&tdl.epsilon_init) {
            return invalid("tdl.epsilon_init must be in [0, 1]");
        }
        if tdl.epsilon_floor < 0.0 || tdl.epsilon_floor > tdl.epsilon_init {
            return invalid("tdl.epsilon_floor must be in [0, tdl.epsilon_init]");
        }
        if tdl.decay_rate < 0.0 {
            return invalid("tdl.decay_rate must be >= 0");
        }

        let training = &self.training;
        if training.num_games == 0 {
            return invalid("training.num_games must be > 0");
        }
        if training.eval_interval > 0 && training.eval_games == 0 {
            return invalid("training.eval_games must be > 0 when evaluation is enabled");
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
