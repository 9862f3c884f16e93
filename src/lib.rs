//! Access-control ledger node.
//!
//! Ownership registrations, grants, revocations and access requests are
//! applied to an in-memory [`AccessControlTable`] and every attempt is
//! recorded as a block in a hash-linked, append-only [`Ledger`].

pub mod access;
pub mod config;
pub mod dispatch;
pub mod hasher;
pub mod ledger;
pub mod model;
pub mod routes;

use std::sync::Arc;

pub use access::{AccessControlTable, AccessError};
pub use config::{ConfigError, NodeConfig};
pub use dispatch::{Operation, TransactionRouter};
pub use hasher::Digest;
pub use ledger::Ledger;
pub use model::{Block, Transaction, TransactionKind};

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: TransactionRouter,
}

impl AppState {
    pub fn new(ledger: Arc<Ledger>, acl: Arc<AccessControlTable>) -> Self {
        Self {
            router: TransactionRouter::new(ledger, acl),
        }
    }
}
