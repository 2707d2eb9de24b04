mod blockchain;
mod config;
mod error;
mod input;
mod report;

use std::process::ExitCode;

use dotenvy::dotenv;
use log::{info, warn};

use blockchain::build_chain;
use config::Config;
use error::AppError;
use report::RunStats;

fn main() -> ExitCode {
    let _ = dotenv();
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[Error]: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let cfg = Config::load();
    let records = input::read_records(&cfg.input)?;
    let miner = cfg.miner();
    let verbose = cfg.verbose();

    let run = build_chain(records, cfg.difficulty, miner, |progress| {
        if verbose {
            println!("{}", progress.message());
        }
    })?;
    let chain = &run.chain;
    if verbose {
        println!();
    }

    if chain.is_valid_chain() {
        info!(
            "chain complete: {} blocks, difficulty {}, {} retries, tip={}",
            chain.len(),
            chain.difficulty(),
            chain.retries(),
            chain.last_block().map_or("-", |b| b.digest.as_str())
        );
    } else {
        warn!("chain failed final validation");
    }

    let stats = RunStats::from_run(
        run.total,
        &run.block_times,
        chain.attempts(),
        miner.workers(),
        cfg.difficulty,
    );
    println!("{}", report::render(cfg.output, &stats, chain.blocks())?);
    Ok(())
}
