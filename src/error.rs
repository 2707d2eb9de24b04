use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while validating command-line values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid difficulty {0:?}: expected a non-negative integer")]
    InvalidDifficulty(String),

    #[error("difficulty {0} is unreachable: a digest has only {1} characters")]
    DifficultyTooHigh(u32, usize),

    #[error("invalid worker count {0:?}: expected a positive integer")]
    InvalidWorkers(String),
}

/// Errors raised by the mining engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MiningError {
    #[error("mining race ended without a winner after {attempts} attempts")]
    NoWinner { attempts: u64 },
}

/// Top-level error for a simulator run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("cannot read input {path:?}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Mining(#[from] MiningError),

    #[error("failed to render report: {0}")]
    Report(#[from] serde_json::Error),
}
