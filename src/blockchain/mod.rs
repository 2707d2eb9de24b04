pub mod block;
pub mod builder;
pub mod miner;
pub mod model;

pub use block::{Block, DIGEST_HEX_LEN};
pub use builder::build_chain;
pub use miner::Miner;
pub use model::Blockchain;

/// Default Proof-of-Work difficulty (number of leading zero hex characters).
pub const DEFAULT_DIFFICULTY: u32 = 2;
