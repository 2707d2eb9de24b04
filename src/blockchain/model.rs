use log::{debug, warn};

use super::block::SENTINEL_DIGEST;
use super::miner::MinedBlock;
use super::{Block, Miner};
use crate::error::MiningError;

/// Append-only in-memory chain of sealed, validated blocks.
#[derive(Debug)]
pub struct Blockchain {
    chain: Vec<Block>,
    difficulty: u32,
    miner: Miner,
    attempts: u64,
    retries: u64,
}

impl Blockchain {
    /// Start an empty chain; the first mined block becomes genesis.
    pub fn new(difficulty: u32, miner: Miner) -> Self {
        Self {
            chain: Vec::new(),
            difficulty,
            miner,
            attempts: 0,
            retries: 0,
        }
    }

    /// Digest the next block must link to.
    pub fn tip_digest(&self) -> &str {
        self.chain
            .last()
            .map_or(SENTINEL_DIGEST, |b| b.digest.as_str())
    }

    /// Mine a block carrying `data` on top of the current tip, validate it
    /// and append it.
    ///
    /// A block that fails validation is discarded and a fresh candidate with
    /// a new timestamp is mined in its place, without bound.
    pub fn mine_block(&mut self, data: String) -> Result<&Block, MiningError> {
        let (miner, difficulty) = (self.miner, self.difficulty);
        self.mine_block_with(data, |candidate| miner.mine(candidate, difficulty))
    }

    /// `mine_block` with the mining step supplied by the caller. `mine` is
    /// called once per candidate; validation runs right after it returns.
    pub(crate) fn mine_block_with<F>(
        &mut self,
        data: String,
        mut mine: F,
    ) -> Result<&Block, MiningError>
    where
        F: FnMut(Block) -> Result<MinedBlock, MiningError>,
    {
        let prev_digest = self.tip_digest().to_string();

        let block = loop {
            let candidate = Block::new(data.clone(), prev_digest.clone());
            let mined = mine(candidate)?;
            self.attempts += mined.attempts;

            let block = mined.block;
            if block.is_valid(&prev_digest) && block.meets_difficulty(self.difficulty) {
                break block;
            }
            self.retries += 1;
            warn!(
                "block #{} failed validation (nonce={}, digest={}); re-mining",
                self.chain.len(),
                block.nonce,
                block.digest
            );
        };

        debug!(
            "appending block #{} (nonce={}, digest={})",
            self.chain.len(),
            block.nonce,
            block.digest
        );
        self.chain.push(block);
        Ok(&self.chain[self.chain.len() - 1])
    }

    /// Validate the entire chain: linkage, digests and PoW.
    pub fn is_valid_chain(&self) -> bool {
        let mut preceding = SENTINEL_DIGEST;
        for block in &self.chain {
            if !block.is_valid(preceding) || !block.meets_difficulty(self.difficulty) {
                return false;
            }
            preceding = block.digest.as_str();
        }
        true
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.chain.last()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Total nonces claimed across every block mined so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Candidates discarded after failing validation.
    pub fn retries(&self) -> u64 {
        self.retries
    }
}

#[cfg(test)]
mod tests {
    use super::Blockchain;
    use crate::blockchain::Miner;
    use crate::blockchain::block::{Block, SENTINEL_DIGEST};
    use crate::blockchain::miner::MinedBlock;

    #[test]
    fn empty_chain_links_to_sentinel() {
        let bc = Blockchain::new(1, Miner::new(2));
        assert_eq!(bc.len(), 0);
        assert!(bc.last_block().is_none());
        assert_eq!(bc.tip_digest(), SENTINEL_DIGEST);
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn alpha_beta_chain_at_difficulty_one() {
        let mut bc = Blockchain::new(1, Miner::new(4));
        let genesis = bc.mine_block("alpha".into()).unwrap().clone();
        let second = bc.mine_block("beta".into()).unwrap().clone();

        assert_eq!(bc.len(), 2);
        assert_eq!(genesis.previous_digest, SENTINEL_DIGEST);
        assert!(genesis.digest.starts_with('0'));
        assert_eq!(second.previous_digest, genesis.digest);
        assert!(second.digest.starts_with('0'));
        assert!(genesis.is_valid(SENTINEL_DIGEST));
        assert!(second.is_valid(&genesis.digest));
        assert!(bc.is_valid_chain());
        assert_eq!(bc.retries(), 0);
        assert!(bc.attempts() >= 2);
    }

    #[test]
    fn every_block_links_to_its_predecessor() {
        let mut bc = Blockchain::new(2, Miner::new(3));
        for i in 0..5 {
            bc.mine_block(format!("line {i}")).unwrap();
        }
        let blocks = bc.blocks();
        assert_eq!(blocks[0].previous_digest, SENTINEL_DIGEST);
        for pair in blocks.windows(2) {
            assert_eq!(pair[1].previous_digest, pair[0].digest);
            assert!(pair[1].is_valid(&pair[0].digest));
        }
        assert!(blocks.iter().all(|b| b.sealed && b.digest.starts_with("00")));
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn tampering_breaks_chain_validity() {
        let mut bc = Blockchain::new(1, Miner::new(2));
        bc.mine_block("alpha".into()).unwrap();
        bc.mine_block("beta".into()).unwrap();
        assert!(bc.is_valid_chain());

        bc.chain[0].data = "omega".into();
        assert!(!bc.is_valid_chain());
    }

    #[test]
    fn relinking_breaks_chain_validity() {
        let mut bc = Blockchain::new(1, Miner::new(2));
        bc.mine_block("alpha".into()).unwrap();
        bc.mine_block("beta".into()).unwrap();

        bc.chain.swap(0, 1);
        assert!(!bc.is_valid_chain());
    }

    #[test]
    fn failed_validation_discards_candidate_and_remines() {
        let miner = Miner::new(2);
        let mut bc = Blockchain::new(1, miner);
        bc.mine_block("alpha".into()).unwrap();
        let tip = bc.tip_digest().to_string();

        let mut candidates: Vec<Block> = Vec::new();
        let appended = bc
            .mine_block_with("beta".into(), |candidate| {
                candidates.push(candidate.clone());
                let mut mined = miner.mine(candidate, 1)?;
                if candidates.len() == 1 {
                    // Corrupt the first result so it no longer matches its digest.
                    mined.block.data.push_str(" (tampered)");
                }
                Ok(mined)
            })
            .unwrap()
            .clone();

        assert_eq!(candidates.len(), 2);
        for c in &candidates {
            assert_eq!(c.nonce, 0);
            assert!(!c.sealed);
            assert_eq!(c.previous_digest, tip);
            assert_eq!(c.data, "beta");
        }
        assert!(candidates[1].timestamp >= candidates[0].timestamp);

        assert_eq!(bc.retries(), 1);
        assert_eq!(bc.len(), 2);
        assert_eq!(appended.data, "beta");
        assert_eq!(appended.timestamp, candidates[1].timestamp);
        assert!(appended.is_valid(&tip));
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn mined_block_below_difficulty_is_remined() {
        let mut bc = Blockchain::new(1, Miner::new(1));
        let mut calls = 0;
        bc.mine_block_with("alpha".into(), |candidate| {
            calls += 1;
            if calls == 1 {
                // Self-consistent but sealed at difficulty 0 only.
                let digest = candidate.compute_digest();
                return Ok(MinedBlock {
                    block: candidate.seal(0, digest),
                    attempts: 1,
                });
            }
            Miner::new(1).mine(candidate, 1)
        })
        .unwrap();

        // Retry only triggers when the nonce-0 digest happens to miss "0".
        assert_eq!(bc.retries(), calls - 1);
        assert!(bc.blocks()[0].digest.starts_with('0'));
        assert!(bc.is_valid_chain());
    }
}
