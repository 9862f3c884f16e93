//! Append-only, hash-linked chain of blocks held in memory.

use std::sync::{Mutex, MutexGuard, PoisonError};

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::hasher::Digest;
use crate::model::{genesis_hash, Block};

/// prev_hash carried by the genesis block.
pub const GENESIS_PREV_HASH: &str = "0";

/// Current time in whole seconds since the Unix epoch.
pub fn now_unix() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Hash-linked chain of blocks, genesis first, behind its own lock.
#[derive(Debug)]
pub struct Ledger {
    digest: Digest,
    blocks: Mutex<Vec<Block>>,
}

impl Ledger {
    /// Start a chain seeded with a genesis block stamped now.
    pub fn new(digest: Digest) -> Self {
        Self::with_genesis_at(digest, now_unix())
    }

    /// Start a chain whose genesis block carries `timestamp`.
    pub fn with_genesis_at(digest: Digest, timestamp: i64) -> Self {
        let genesis = Block {
            transactions: Vec::new(),
            prev_hash: GENESIS_PREV_HASH.to_string(),
            hash: genesis_hash(timestamp, digest),
            timestamp,
        };
        info!(%digest, hash = %genesis.hash, "ledger initialised with genesis block");
        Self {
            digest,
            blocks: Mutex::new(vec![genesis]),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Block>> {
        self.blocks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Digest blocks on this chain are sealed with.
    pub fn digest(&self) -> Digest {
        self.digest
    }

    /// Add a sealed block at the tail. Linkage is the caller's job and is
    /// not re-checked here. Returns the new chain length.
    /// `TransactionRouter` appends through [`Ledger::chain_block`] instead.
    pub fn append_block(&self, block: Block) -> usize {
        let mut blocks = self.lock();
        blocks.push(block);
        blocks.len()
    }

    /// Link `block` to the current tip, seal it and append it, all under one
    /// lock hold so concurrent writers cannot fork the chain.
    pub fn chain_block(&self, mut block: Block) -> (usize, Block) {
        let mut blocks = self.lock();
        if let Some(tip) = blocks.last() {
            if block.prev_hash != tip.hash {
                debug!(stale = %block.prev_hash, tip = %tip.hash, "tip moved; relinking block");
                block.prev_hash = tip.hash.clone();
            }
        }
        let sealed = block.seal(self.digest);
        blocks.push(sealed.clone());
        (blocks.len(), sealed)
    }

    /// Hash of the most recently appended block.
    pub fn tip_hash(&self) -> String {
        self.lock()
            .last()
            .map(|b| b.hash.clone())
            .unwrap_or_default()
    }

    /// Clone of the most recently appended block.
    pub fn tip(&self) -> Option<Block> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Never true: a ledger always holds its genesis block.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of the whole chain, genesis first.
    pub fn blocks(&self) -> Vec<Block> {
        self.lock().clone()
    }
}
