//! Analysis engine
//!
//! Classifies each transaction hash of a job into one of three buckets by
//! querying the ledger for its fee, size, and parents: resolved (all three
//! found), unknown (the node has no such transaction), or exceptional (some
//! lookup failed transiently).

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::ledger::{LedgerQuery, Lookup};
use crate::progress::progress_line;

/// Metadata for one resolved transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRecord {
    /// Fee in satoshis. Signed; anomalous transactions can price below zero.
    pub fee: i64,
    /// Serialized size in bytes.
    pub size: u64,
    /// Funding transaction ids, in input order.
    pub parents: Vec<String>,
}

/// Per-job classification of every processed hash into exactly one bucket.
///
/// Ordered containers keep the written artifacts byte-stable across runs.
#[derive(Debug, Default)]
pub struct ResultSet {
    pub resolved: BTreeMap<String, TxRecord>,
    pub unknown: BTreeSet<String>,
    pub exceptional: Vec<String>,
}

impl ResultSet {
    /// Number of hashes classified so far, across all three buckets.
    pub fn len(&self) -> usize {
        self.resolved.len() + self.unknown.len() + self.exceptional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classify `hashes` in input order, overwriting a single progress line on
/// stdout after every hash. Stops early once `shutdown` is raised; hashes
/// not yet processed land in no bucket. No lookup is ever retried.
pub fn analyze(hashes: &[String], ledger: &dyn LedgerQuery, shutdown: &AtomicBool) -> ResultSet {
    let mut results = ResultSet::default();
    let start = Instant::now();

    for (i, hash) in hashes.iter().enumerate() {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        let fee = ledger.lookup_fee(hash);
        let size = ledger.lookup_size(hash);
        let parents = ledger.lookup_parents(hash);

        for msg in [
            fee.transient_message(),
            size.transient_message(),
            parents.transient_message(),
        ]
        .into_iter()
        .flatten()
        {
            eprintln!("> WARN - lookup failed for <{}>: {}", hash, msg);
        }

        // Tie-break precedence: any transient beats any not-found.
        if fee.is_transient() || size.is_transient() || parents.is_transient() {
            results.exceptional.push(hash.clone());
        } else if fee.is_not_found() || size.is_not_found() || parents.is_not_found() {
            results.unknown.insert(hash.clone());
        } else if let (Lookup::Found(fee), Lookup::Found(size), Lookup::Found(parents)) =
            (fee, size, parents)
        {
            results
                .resolved
                .insert(hash.clone(), TxRecord { fee, size, parents });
        }

        print!("\r{}", progress_line(i + 1, hashes.len(), start.elapsed()));
        let _ = std::io::stdout().flush();
    }

    println!();
    println!("UKN: {}", results.unknown.len());
    println!("EXC: {}", results.exceptional.len());

    results
}
