use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Previous-digest placeholder used by the genesis block.
pub const SENTINEL_DIGEST: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// A single record in the chain, sealed by Proof-of-Work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub data: String,
    pub previous_digest: String,
    pub timestamp: i64, // ms since epoch (UTC)
    pub nonce: u64,
    pub digest: String,
    pub sealed: bool,
}

/// SHA-256 over `previous_digest ++ timestamp ++ nonce ++ data`, hex encoded.
///
/// Numbers are rendered in decimal and the four parts are concatenated with
/// no separator. The constructor, the mining workers and the validator all
/// go through this function.
pub fn compute_digest(previous_digest: &str, timestamp: i64, nonce: u64, data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous_digest.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(nonce.to_string().as_bytes());
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// True when the first `difficulty` characters of `digest` are all `'0'`.
pub fn meets_difficulty(digest: &str, difficulty: u32) -> bool {
    let k = difficulty as usize;
    k <= digest.len() && digest.bytes().take(k).all(|c| c == b'0')
}

impl Block {
    /// Create an unsealed candidate stamped with the current time.
    /// Hand it to a `Miner` to perform PoW.
    pub fn new(data: String, previous_digest: String) -> Self {
        Self::new_with_timestamp(data, previous_digest, Utc::now().timestamp_millis())
    }

    pub fn new_with_timestamp(data: String, previous_digest: String, timestamp: i64) -> Self {
        let digest = compute_digest(&previous_digest, timestamp, 0, &data);
        Self {
            data,
            previous_digest,
            timestamp,
            nonce: 0,
            digest,
            sealed: false,
        }
    }

    /// Digest of this block's stored fields.
    pub fn compute_digest(&self) -> String {
        compute_digest(&self.previous_digest, self.timestamp, self.nonce, &self.data)
    }

    /// Freeze the winning `(nonce, digest)` pair into the block.
    pub(crate) fn seal(self, nonce: u64, digest: String) -> Self {
        Self {
            nonce,
            digest,
            sealed: true,
            ..self
        }
    }

    /// Validate linkage to `preceding_digest` (the predecessor's digest, or
    /// `SENTINEL_DIGEST` for genesis) and that the cached digest matches the
    /// block's content. Difficulty is checked separately.
    pub fn is_valid(&self, preceding_digest: &str) -> bool {
        self.previous_digest == preceding_digest && self.digest == self.compute_digest()
    }

    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        meets_difficulty(&self.digest, difficulty)
    }
}
