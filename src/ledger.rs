//! Ledger lookup contract
//!
//! The analysis engine reaches the node through this trait so the engine can
//! run against an in-memory double in tests and against the JSON-RPC adapter
//! in production.

/// Outcome of a single ledger lookup.
///
/// `NotFound` means the node has no record of the transaction in any source
/// it currently knows (neither a confirmed block nor the mempool).
/// `Transient` covers every other lookup failure: index still syncing, block
/// data unavailable, malformed identifier, transport error. The carried
/// message is the adapter's own description and is only used for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Transient(String),
}

impl<T> Lookup<T> {
    pub fn is_transient(&self) -> bool {
        matches!(self, Lookup::Transient(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Lookup::NotFound)
    }

    /// Adapter-supplied failure message, if this lookup failed transiently.
    pub fn transient_message(&self) -> Option<&str> {
        match self {
            Lookup::Transient(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Per-transaction metadata lookups.
///
/// Fees are in satoshis and signed; a negative fee is data, not an error
/// code.
pub trait LedgerQuery {
    fn lookup_fee(&self, txid: &str) -> Lookup<i64>;
    fn lookup_size(&self, txid: &str) -> Lookup<u64>;
    fn lookup_parents(&self, txid: &str) -> Lookup<Vec<String>>;
}
