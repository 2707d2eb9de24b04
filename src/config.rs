use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

use crate::blockchain::{DEFAULT_DIFFICULTY, DIGEST_HEX_LEN, Miner};
use crate::error::ConfigError;

/// Input file used when none is given.
pub const DEFAULT_INPUT: &str = "gorgias.txt";

/// Proof-of-Work chain simulator
#[derive(Debug, Parser)]
#[command(name = "pow_chain")]
#[command(about = "Mine one block per input line and report mining times")]
pub struct Cli {
    /// Text file; every line becomes the payload of one block
    #[arg(env = "POW_INPUT", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Leading zero hex characters a block digest must have
    #[arg(
        env = "POW_DIFFICULTY",
        default_value_t = DEFAULT_DIFFICULTY,
        value_parser = parse_difficulty
    )]
    pub difficulty: u32,

    /// Any value here turns on the full report
    #[arg(value_name = "FULL_OUTPUT", hide = true)]
    pub full_output: Option<String>,

    /// Print progress lines and the full statistics table
    #[arg(
        short,
        long,
        env = "POW_VERBOSE",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub verbose: bool,

    /// Print statistics and the chain as JSON
    #[arg(
        long,
        env = "POW_JSON",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub json: bool,

    /// Mining threads (default: one per available hardware thread)
    #[arg(short, long, env = "POW_WORKERS", value_parser = parse_workers)]
    pub workers: Option<usize>,
}

/// How the final report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// `<total_ms> <average_ms>` on one line.
    #[default]
    Terse,
    /// Progress lines plus the full statistics table.
    Verbose,
    /// Statistics and the chain as JSON.
    Json,
}

/// Options for one simulator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub difficulty: u32,
    /// `None` means one worker per available hardware thread.
    pub workers: Option<usize>,
    pub output: OutputMode,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let output = if cli.json {
            OutputMode::Json
        } else if cli.verbose || cli.full_output.is_some() {
            OutputMode::Verbose
        } else {
            OutputMode::Terse
        };
        Self {
            input: cli.input,
            difficulty: cli.difficulty,
            workers: cli.workers,
            output,
        }
    }
}

impl Config {
    /// Resolve options from the command line, falling back to `POW_*`
    /// environment variables (`.env` is expected to be loaded already).
    /// Exits with a usage message on invalid arguments.
    pub fn load() -> Self {
        Cli::parse().into()
    }

    pub fn miner(&self) -> Miner {
        match self.workers {
            Some(n) => Miner::new(n),
            None => Miner::with_available_parallelism(),
        }
    }

    pub fn verbose(&self) -> bool {
        self.output == OutputMode::Verbose
    }
}

fn parse_difficulty(raw: &str) -> Result<u32, ConfigError> {
    let difficulty: u32 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidDifficulty(raw.to_string()))?;
    if difficulty as usize > DIGEST_HEX_LEN {
        return Err(ConfigError::DifficultyTooHigh(difficulty, DIGEST_HEX_LEN));
    }
    Ok(difficulty)
}

fn parse_workers(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidWorkers(raw.to_string())),
    }
}
