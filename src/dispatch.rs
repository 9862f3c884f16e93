//! Turns a decoded `(path, params)` pair into an access-control call and a
//! recorded block.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::access::AccessControlTable;
use crate::ledger::{now_unix, Ledger};
use crate::model::{Block, Transaction, TransactionKind};

/// Response for any path that is not one of the four operations.
pub const UNKNOWN_ENDPOINT: &str = "Unknown POST endpoint";

/// One of the four endpoints that record a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Grant,
    Revoke,
    Request,
}

impl Operation {
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/register" => Some(Operation::Register),
            "/grant" => Some(Operation::Grant),
            "/revoke" => Some(Operation::Revoke),
            "/request" => Some(Operation::Request),
            _ => None,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Operation::Register => TransactionKind::Register,
            Operation::Grant => TransactionKind::Grant,
            Operation::Revoke => TransactionKind::Revoke,
            Operation::Request => TransactionKind::Request,
        }
    }

    /// Fixed status line reported for this operation's outcome.
    pub fn status(&self, ok: bool) -> &'static str {
        match (self, ok) {
            (Operation::Register, true) => "Registration successful",
            (Operation::Register, false) => "Registration failed",
            (Operation::Grant, true) => "Access granted",
            (Operation::Grant, false) => "Grant failed",
            (Operation::Revoke, true) => "Access revoked",
            (Operation::Revoke, false) => "Revoke failed",
            (Operation::Request, true) => "Access granted to requester",
            (Operation::Request, false) => "Access denied",
        }
    }
}

/// Dispatches operations against the shared table and records every attempt,
/// successful or not, as a one-transaction block.
#[derive(Debug, Clone)]
pub struct TransactionRouter {
    ledger: Arc<Ledger>,
    acl: Arc<AccessControlTable>,
}

impl TransactionRouter {
    pub fn new(ledger: Arc<Ledger>, acl: Arc<AccessControlTable>) -> Self {
        Self { ledger, acl }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn acl(&self) -> &AccessControlTable {
        &self.acl
    }

    /// Handle one decoded request. Missing parameters read as empty strings.
    pub fn handle(&self, path: &str, params: &HashMap<String, String>) -> String {
        match Operation::from_path(path) {
            Some(op) => self.execute(op, params).to_string(),
            None => {
                debug!(path, "unknown endpoint; nothing recorded");
                UNKNOWN_ENDPOINT.to_string()
            }
        }
    }

    fn execute(&self, op: Operation, params: &HashMap<String, String>) -> &'static str {
        let param = |key: &str| params.get(key).map(String::as_str).unwrap_or_default();
        let now = now_unix();
        let mut block = Block::new(self.ledger.tip_hash(), now);

        let (tx, ok) = match op {
            Operation::Register => {
                let tx = Transaction::register(
                    param("owner"),
                    param("dataHash"),
                    param("metadata"),
                    now,
                );
                let ok = self.acl.register_data(&tx.owner, &tx.data_hash, &tx.metadata);
                (tx, ok)
            }
            Operation::Grant => {
                let tx = Transaction::grant(
                    param("owner"),
                    param("dataHash"),
                    param("recipient"),
                    now,
                );
                let ok = self.acl.grant_access(&tx.owner, &tx.data_hash, &tx.recipient);
                (tx, ok)
            }
            Operation::Revoke => {
                let tx = Transaction::revoke(
                    param("owner"),
                    param("dataHash"),
                    param("recipient"),
                    now,
                );
                let ok = self.acl.revoke_access(&tx.owner, &tx.data_hash, &tx.recipient);
                (tx, ok)
            }
            Operation::Request => {
                let tx = Transaction::request(param("requester"), param("dataHash"), now);
                let ok = self.acl.request_access(&tx.requester, &tx.data_hash);
                (tx, ok)
            }
        };

        block.transactions.push(tx);
        let (height, sealed) = self.ledger.chain_block(block);
        info!(
            operation = ?op.kind(),
            ok,
            height,
            hash = %sealed.hash,
            "recorded transaction"
        );
        op.status(ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Digest;

    fn router() -> TransactionRouter {
        TransactionRouter::new(
            Arc::new(Ledger::with_genesis_at(Digest::Djb2, 1_000)),
            Arc::new(AccessControlTable::new()),
        )
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let r = router();
        let grant = params(&[("owner", "alice"), ("dataHash", "h1"), ("recipient", "bob")]);
        let request = params(&[("requester", "bob"), ("dataHash", "h1")]);

        assert_eq!(
            r.handle(
                "/register",
                &params(&[("owner", "alice"), ("dataHash", "h1"), ("metadata", "m")])
            ),
            "Registration successful"
        );
        assert_eq!(r.handle("/grant", &grant), "Access granted");
        assert_eq!(r.handle("/request", &request), "Access granted to requester");
        assert_eq!(r.handle("/revoke", &grant), "Access revoked");
        assert_eq!(r.handle("/request", &request), "Access denied");

        let chain = r.ledger().blocks();
        assert_eq!(chain.len(), 6);
        assert_eq!(chain[0].prev_hash, "0");
        for pair in chain.windows(2) {
            assert_eq!(pair[1].prev_hash, pair[0].hash);
        }
    }

    #[test]
    fn test_failures_are_recorded_too() {
        let r = router();
        let p = params(&[("owner", "alice"), ("dataHash", "h1"), ("recipient", "bob")]);
        assert_eq!(r.handle("/grant", &p), "Grant failed");
        assert_eq!(r.handle("/revoke", &p), "Revoke failed");
        assert_eq!(r.handle("/request", &params(&[])), "Access denied");
        assert_eq!(r.ledger().len(), 4);

        let tip = r.ledger().tip().unwrap();
        assert_eq!(tip.transactions.len(), 1);
        assert_eq!(tip.transactions[0].kind, TransactionKind::Request);
    }

    #[test]
    fn test_unknown_path_leaves_chain_untouched() {
        let r = router();
        let before = r.ledger().tip_hash();
        assert_eq!(r.handle("/delete", &params(&[("owner", "alice")])), UNKNOWN_ENDPOINT);
        assert_eq!(r.handle("register", &params(&[])), UNKNOWN_ENDPOINT);
        assert_eq!(r.ledger().len(), 1);
        assert_eq!(r.ledger().tip_hash(), before);
    }

    #[test]
    fn test_missing_params_are_empty() {
        let r = router();
        assert_eq!(r.handle("/register", &params(&[])), "Registration successful");

        let tx = &r.ledger().tip().unwrap().transactions[0];
        assert_eq!(tx.kind, TransactionKind::Register);
        assert!(tx.owner.is_empty() && tx.data_hash.is_empty() && tx.metadata.is_empty());
        assert_eq!(r.acl().owned_by(""), vec![""]);
    }

    #[test]
    fn test_transaction_fields_follow_operation() {
        let r = router();
        let p = params(&[
            ("owner", "alice"),
            ("dataHash", "h1"),
            ("metadata", "m"),
            ("recipient", "bob"),
            ("requester", "carol"),
        ]);
        r.handle("/register", &p);
        r.handle("/request", &p);

        let chain = r.ledger().blocks();
        let register = &chain[1].transactions[0];
        assert_eq!((register.owner.as_str(), register.metadata.as_str()), ("alice", "m"));
        assert!(register.recipient.is_empty() && register.requester.is_empty());

        let request = &chain[2].transactions[0];
        assert_eq!(request.requester, "carol");
        assert!(request.owner.is_empty() && request.metadata.is_empty());
        assert_eq!(request.timestamp, chain[2].timestamp);
    }

    #[test]
    fn test_grant_uses_owner_of_record() {
        let r = router();
        r.handle("/register", &params(&[("owner", "carol"), ("dataHash", "h1")]));
        r.handle("/register", &params(&[("owner", "alice"), ("dataHash", "h2")]));
        let p = params(&[("owner", "alice"), ("dataHash", "h1"), ("recipient", "bob")]);
        assert_eq!(r.handle("/grant", &p), "Grant failed");
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(Operation::from_path("/revoke"), Some(Operation::Revoke));
        assert_eq!(Operation::from_path("/REVOKE"), None);
        assert_eq!(Operation::Revoke.kind(), TransactionKind::Revoke);
        assert_eq!(Operation::Register.status(false), "Registration failed");
    }
}
