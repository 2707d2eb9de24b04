use std::time::{Duration, Instant};

use log::info;

use super::{Blockchain, Miner};
use crate::error::MiningError;

/// Milestones of a chain build, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    CreatingGenesis,
    /// Emitted once per genesis candidate, right before it is validated.
    ValidatingGenesis,
    Initialized,
    AddingBlocks,
    AllAdded,
}

impl Progress {
    pub fn message(self) -> &'static str {
        match self {
            Self::CreatingGenesis => "Creating genesis block",
            Self::ValidatingGenesis => "Validating genesis block",
            Self::Initialized => "Blockchain initialized",
            Self::AddingBlocks => "Adding data blocks...",
            Self::AllAdded => "All blocks added!",
        }
    }
}

/// Outcome of turning a record sequence into a chain.
#[derive(Debug)]
pub struct BuildRun {
    pub chain: Blockchain,
    /// Wall-clock mining time of every block after genesis, in order.
    pub block_times: Vec<Duration>,
    /// Wall-clock time for the whole run, genesis included.
    pub total: Duration,
}

/// Build a chain from `records`, one block per record, strictly in order.
///
/// The first record seeds genesis (an empty payload when there are no
/// records at all); genesis counts towards `total` but not `block_times`.
/// `on_progress` is told about each milestone as it happens.
pub fn build_chain<I, P>(
    records: I,
    difficulty: u32,
    miner: Miner,
    mut on_progress: P,
) -> Result<BuildRun, MiningError>
where
    I: IntoIterator<Item = String>,
    P: FnMut(Progress),
{
    let started = Instant::now();
    let mut records = records.into_iter();
    let mut chain = Blockchain::new(difficulty, miner);

    info!(
        "creating genesis block (difficulty={}, workers={})",
        difficulty,
        miner.workers()
    );
    on_progress(Progress::CreatingGenesis);
    let genesis = chain.mine_block_with(records.next().unwrap_or_default(), |candidate| {
        let mined = miner.mine(candidate, difficulty);
        on_progress(Progress::ValidatingGenesis);
        mined
    })?;
    info!("genesis sealed: nonce={} digest={}", genesis.nonce, genesis.digest);
    on_progress(Progress::Initialized);
    on_progress(Progress::AddingBlocks);

    let mut block_times = Vec::new();
    for data in records {
        let height = chain.len();
        let block_started = Instant::now();
        let block = chain.mine_block(data)?;
        let elapsed = block_started.elapsed();
        info!(
            "block #{} sealed in {:.1} ms: nonce={} digest={}",
            height,
            elapsed.as_secs_f64() * 1000.0,
            block.nonce,
            block.digest
        );
        block_times.push(elapsed);
    }
    on_progress(Progress::AllAdded);

    Ok(BuildRun {
        chain,
        block_times,
        total: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::{Progress, build_chain};
    use crate::blockchain::Miner;
    use crate::blockchain::block::SENTINEL_DIGEST;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_one_block_per_record() {
        let records = lines(&["alpha", "beta", "gamma"]);
        let run = build_chain(records, 1, Miner::new(2), |_| {}).unwrap();
        let blocks = run.chain.blocks();
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks.iter().map(|b| b.data.as_str()).collect::<Vec<_>>(),
            ["alpha", "beta", "gamma"]
        );
        assert_eq!(run.block_times.len(), 2);
        assert!(run.block_times.iter().all(|t| *t <= run.total));
        assert!(run.chain.is_valid_chain());
    }

    #[test]
    fn reports_milestones_in_order() {
        let mut seen = Vec::new();
        build_chain(lines(&["alpha", "beta"]), 1, Miner::new(2), |p| seen.push(p)).unwrap();
        assert_eq!(
            seen,
            [
                Progress::CreatingGenesis,
                Progress::ValidatingGenesis,
                Progress::Initialized,
                Progress::AddingBlocks,
                Progress::AllAdded,
            ]
        );
        assert_eq!(Progress::AddingBlocks.message(), "Adding data blocks...");
    }

    #[test]
    fn empty_input_mines_only_an_empty_genesis() {
        let run = build_chain(Vec::<String>::new(), 1, Miner::new(2), |_| {}).unwrap();
        assert_eq!(run.chain.len(), 1);
        let genesis = &run.chain.blocks()[0];
        assert_eq!(genesis.data, "");
        assert_eq!(genesis.previous_digest, SENTINEL_DIGEST);
        assert!(run.block_times.is_empty());
        assert!(run.chain.is_valid_chain());
    }

    #[test]
    fn single_record_is_genesis_only() {
        let run = build_chain(lines(&["only"]), 0, Miner::new(1), |_| {}).unwrap();
        assert_eq!(run.chain.len(), 1);
        assert_eq!(run.chain.blocks()[0].nonce, 0);
        assert!(run.block_times.is_empty());
    }
}
