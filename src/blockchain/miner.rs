use std::num::NonZeroUsize;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_channel::{Sender, bounded};
use log::{debug, trace};

use super::block::{Block, compute_digest, meets_difficulty};
use crate::error::MiningError;

/// Parallel Proof-of-Work engine: a fixed pool of workers races over one
/// shared nonce counter and the first qualifying digest seals the block.
#[derive(Debug, Clone, Copy)]
pub struct Miner {
    workers: NonZeroUsize,
}

/// A sealed block together with the number of nonces claimed to find it.
#[derive(Debug, Clone)]
pub struct MinedBlock {
    pub block: Block,
    pub attempts: u64,
}

#[derive(Debug)]
struct Solution {
    nonce: u64,
    digest: String,
}

/// State of a single mining attempt. Lives only for one `Miner::mine` call.
#[derive(Debug, Default)]
struct Race {
    next_nonce: AtomicU64,
    winner: OnceLock<Solution>,
}

impl Race {
    /// Claim the next nonce. `None` once the nonce space is exhausted.
    fn claim(&self) -> Option<u64> {
        self.next_nonce
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .ok()
    }

    fn run(&self, worker_id: usize, block: &Block, difficulty: u32, done: Sender<()>) {
        while self.winner.get().is_none() {
            let Some(nonce) = self.claim() else {
                break;
            };
            let digest =
                compute_digest(&block.previous_digest, block.timestamp, nonce, &block.data);
            if !meets_difficulty(&digest, difficulty) {
                continue;
            }
            // Only the first `set` lands; later finders fall through and
            // observe the winner on the next loop check.
            if self.winner.set(Solution { nonce, digest }).is_ok() {
                trace!("worker {worker_id} committed nonce {nonce}");
                let _ = done.try_send(());
                break;
            }
        }
    }
}

impl Miner {
    /// Miner with an explicit worker count (0 is treated as 1).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: NonZeroUsize::new(workers).unwrap_or(NonZeroUsize::MIN),
        }
    }

    /// One worker per hardware thread reported by the platform, or a single
    /// worker when the platform cannot tell.
    pub fn with_available_parallelism() -> Self {
        Self {
            workers: thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Search for a nonce whose digest starts with `difficulty` zero
    /// characters and return the candidate sealed with it.
    ///
    /// Blocks until a worker commits a solution, then joins every worker.
    /// There is no timeout: an unreachable difficulty never returns.
    pub fn mine(&self, candidate: Block, difficulty: u32) -> Result<MinedBlock, MiningError> {
        // Nonce 0 was already hashed by the constructor.
        if meets_difficulty(&candidate.digest, difficulty) {
            let digest = candidate.digest.clone();
            return Ok(MinedBlock {
                block: candidate.seal(0, digest),
                attempts: 1,
            });
        }

        let race = Race::default();
        let (done_tx, done_rx) = bounded::<()>(1);
        debug!(
            "MINER - racing {} workers at difficulty {}",
            self.workers, difficulty
        );

        thread::scope(|scope| {
            for worker_id in 0..self.workers.get() {
                let race = &race;
                let block = &candidate;
                let done = done_tx.clone();
                scope.spawn(move || race.run(worker_id, block, difficulty, done));
            }
            drop(done_tx);

            // Wakes on the winner's signal, or when every worker has hung up.
            let _ = done_rx.recv();
        });

        let attempts = race.next_nonce.load(Ordering::Relaxed);
        let Solution { nonce, digest } = race
            .winner
            .into_inner()
            .ok_or(MiningError::NoWinner { attempts })?;

        debug!("MINER - sealed nonce {nonce} after {attempts} attempts (digest={digest})");
        Ok(MinedBlock {
            block: candidate.seal(nonce, digest),
            attempts,
        })
    }
}
