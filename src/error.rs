use std::path::PathBuf;

/// Errors that can occur when constructing a board.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("board must have at least one row and one column (got {rows}x{cols})")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("connect length {connect} cannot fit on a {rows}x{cols} board")]
    UnreachableConnect {
        connect: usize,
        rows: usize,
        cols: usize,
    },
}

/// Errors that can occur while loading or saving learned weights.
#[derive(Debug, thiserror::Error)]
pub enum WeightsError {
    #[error("could not open weights file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read weights from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write weights to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse training state from {path}: {source}")]
    StateParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("weights error: {0}")]
    Weights(#[from] WeightsError),

    #[error("failed to append metrics to {path}: {source}")]
    Metrics {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
