//! blvm-txscan - batch transaction analysis for the Bitcoin Commons BLVM
//! ecosystem
//!
//! Reads a manifest of job files, each naming transactions to analyze (one
//! hash per line), queries a Bitcoin Core node for every transaction's fee,
//! size, and parents, and writes per-job result files next to the inputs.

pub mod analysis;
/// Bitcoin Core JSON-RPC ledger adapter
pub mod core_rpc_client;
pub mod driver;
pub mod intake;
/// Ledger lookup contract shared by the engine and its adapters
pub mod ledger;
pub mod progress;
/// Process-wide shutdown flag and its signal handlers
pub mod shutdown;
pub mod writer;
