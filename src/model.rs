//! Data model for access-control transactions and the blocks that record them.

use serde::{Deserialize, Serialize};

use crate::hasher::Digest;

/// Kind of access-control event a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Register,
    Grant,
    Revoke,
    Request,
}

impl TransactionKind {
    /// Numeric code mixed into the block digest.
    pub fn code(&self) -> u8 {
        match self {
            TransactionKind::Register => 0,
            TransactionKind::Grant => 1,
            TransactionKind::Revoke => 2,
            TransactionKind::Request => 3,
        }
    }
}

/// One attempted operation. Fields that do not apply to `kind` stay empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub owner: String,
    pub data_hash: String,
    pub metadata: String,
    pub recipient: String,
    pub requester: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl Transaction {
    fn empty(kind: TransactionKind, timestamp: i64) -> Self {
        Self {
            kind,
            owner: String::new(),
            data_hash: String::new(),
            metadata: String::new(),
            recipient: String::new(),
            requester: String::new(),
            timestamp,
        }
    }

    pub fn register(
        owner: impl Into<String>,
        data_hash: impl Into<String>,
        metadata: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            owner: owner.into(),
            data_hash: data_hash.into(),
            metadata: metadata.into(),
            ..Self::empty(TransactionKind::Register, timestamp)
        }
    }

    pub fn grant(
        owner: impl Into<String>,
        data_hash: impl Into<String>,
        recipient: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            owner: owner.into(),
            data_hash: data_hash.into(),
            recipient: recipient.into(),
            ..Self::empty(TransactionKind::Grant, timestamp)
        }
    }

    pub fn revoke(
        owner: impl Into<String>,
        data_hash: impl Into<String>,
        recipient: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            owner: owner.into(),
            data_hash: data_hash.into(),
            recipient: recipient.into(),
            ..Self::empty(TransactionKind::Revoke, timestamp)
        }
    }

    pub fn request(
        requester: impl Into<String>,
        data_hash: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            requester: requester.into(),
            data_hash: data_hash.into(),
            ..Self::empty(TransactionKind::Request, timestamp)
        }
    }
}

/// Container of transactions linked to its predecessor by hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub transactions: Vec<Transaction>,
    /// Hash of the previous block ("0" for genesis).
    pub prev_hash: String,
    /// Digest over prev_hash, timestamp and every transaction field.
    pub hash: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl Block {
    /// Open an unsealed block on top of `prev_hash`.
    pub fn new(prev_hash: impl Into<String>, timestamp: i64) -> Self {
        Self {
            transactions: Vec::new(),
            prev_hash: prev_hash.into(),
            hash: String::new(),
            timestamp,
        }
    }

    /// Compute the hash over the finalized contents and store it.
    pub fn seal(mut self, digest: Digest) -> Self {
        self.hash = compute_block_hash(&self, digest);
        self
    }
}

/// Compute a block hash from its contents.
/// Order: prev_hash, timestamp, then per transaction: type code, owner,
/// data_hash, metadata, recipient, requester, timestamp.
pub fn compute_block_hash(b: &Block, digest: Digest) -> String {
    let mut buf = String::new();
    buf.push_str(&b.prev_hash);
    buf.push_str(&b.timestamp.to_string());
    for t in &b.transactions {
        buf.push_str(&t.kind.code().to_string());
        buf.push_str(&t.owner);
        buf.push_str(&t.data_hash);
        buf.push_str(&t.metadata);
        buf.push_str(&t.recipient);
        buf.push_str(&t.requester);
        buf.push_str(&t.timestamp.to_string());
    }
    digest.digest(buf.as_bytes())
}

/// Hash of the genesis block: the seed string followed by its timestamp.
pub fn genesis_hash(timestamp: i64, digest: Digest) -> String {
    digest.digest(format!("genesis{timestamp}").as_bytes())
}
