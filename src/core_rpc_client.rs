//! Bitcoin Core RPC client
//!
//! Blocking JSON-RPC wrapper used as the ledger adapter for transaction
//! analysis. Size and parents come from `getrawtransaction` in verbose
//! mode; the fee additionally resolves every input's funding transaction
//! and prices the difference between inputs and outputs.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::ledger::{LedgerQuery, Lookup};

/// Error code the node answers for a transaction it has no record of,
/// neither in a block nor in the mempool.
const RPC_INVALID_ADDRESS_OR_KEY: i64 = -5;

/// RPC client configuration
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// RPC URL (e.g., "http://127.0.0.1:8332")
    pub url: String,
    /// RPC username
    pub user: String,
    /// RPC password
    pub pass: String,
    /// Request timeout
    pub timeout: Duration,
}

/// Bitcoin Core RPC client
pub struct CoreRpcClient {
    client: Client,
    config: RpcConfig,
}

/// Subset of the verbose `getrawtransaction` response this tool reads.
#[derive(Debug, Deserialize)]
struct VerboseTx {
    size: u64,
    vin: Vec<TxInput>,
    vout: Vec<TxOutput>,
}

/// One input; a coinbase input carries no funding txid.
#[derive(Debug, Deserialize)]
struct TxInput {
    txid: Option<String>,
    vout: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TxOutput {
    /// Output value in BTC
    value: f64,
}

/// Failure modes of one RPC exchange, before classification.
enum RpcFailure {
    NotFound,
    Transient(String),
}

impl RpcFailure {
    fn into_lookup<T>(self) -> Lookup<T> {
        match self {
            RpcFailure::NotFound => Lookup::NotFound,
            RpcFailure::Transient(msg) => Lookup::Transient(msg),
        }
    }
}

fn sats_from_btc(value: f64) -> i64 {
    (value * 100_000_000.0).round() as i64
}

impl CoreRpcClient {
    /// Create a new RPC client
    pub fn new(config: RpcConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Make an RPC call. The node reports RPC-level errors with a JSON body
    /// on non-2xx statuses, so the body is parsed before the status.
    fn call(&self, method: &str, params: Value) -> Result<Value, RpcFailure> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self
            .client
            .post(&self.config.url)
            .basic_auth(&self.config.user, Some(&self.config.pass))
            .json(&body)
            .send()
            .map_err(|e| RpcFailure::Transient(format!("RPC request failed: {}", e)))?;

        let json: Value = response
            .json()
            .map_err(|e| RpcFailure::Transient(format!("Failed to parse RPC response: {}", e)))?;

        if let Some(error) = json.get("error") {
            if !error.is_null() {
                if error.get("code").and_then(Value::as_i64) == Some(RPC_INVALID_ADDRESS_OR_KEY) {
                    return Err(RpcFailure::NotFound);
                }
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown RPC error");
                return Err(RpcFailure::Transient(format!("RPC error: {}", message)));
            }
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| RpcFailure::Transient("RPC response missing result".to_string()))
    }

    /// Fetch a transaction in verbose form. Malformed ids never reach the
    /// node.
    fn get_verbose_tx(&self, txid: &str) -> Result<VerboseTx, RpcFailure> {
        if txid.len() != 64 || hex::decode(txid).is_err() {
            return Err(RpcFailure::Transient(format!("malformed txid <{}>", txid)));
        }
        let result = self.call("getrawtransaction", json!([txid, true]))?;
        serde_json::from_value(result).map_err(|e| {
            RpcFailure::Transient(format!("Unexpected getrawtransaction response: {}", e))
        })
    }
}

impl LedgerQuery for CoreRpcClient {
    fn lookup_fee(&self, txid: &str) -> Lookup<i64> {
        let tx = match self.get_verbose_tx(txid) {
            Ok(tx) => tx,
            Err(failure) => return failure.into_lookup(),
        };

        let mut input_value: i64 = 0;
        for input in &tx.vin {
            let (prev_txid, prev_index) = match (&input.txid, input.vout) {
                (Some(prev_txid), Some(prev_index)) => (prev_txid, prev_index),
                // A coinbase input has no funding output to price
                _ => {
                    return Lookup::Transient(format!(
                        "<{}> has a coinbase input, no fee to compute",
                        txid
                    ))
                }
            };

            // An unresolvable funding transaction fails the whole fee
            // lookup under the same not-found/transient mapping
            let prev_tx = match self.get_verbose_tx(prev_txid) {
                Ok(tx) => tx,
                Err(failure) => return failure.into_lookup(),
            };

            match prev_tx.vout.get(prev_index as usize) {
                Some(funding) => input_value += sats_from_btc(funding.value),
                None => {
                    return Lookup::Transient(format!(
                        "funding output {}:{} not present",
                        prev_txid, prev_index
                    ))
                }
            }
        }

        let output_value: i64 = tx.vout.iter().map(|out| sats_from_btc(out.value)).sum();

        Lookup::Found(input_value - output_value)
    }

    fn lookup_size(&self, txid: &str) -> Lookup<u64> {
        match self.get_verbose_tx(txid) {
            Ok(tx) => Lookup::Found(tx.size),
            Err(failure) => failure.into_lookup(),
        }
    }

    fn lookup_parents(&self, txid: &str) -> Lookup<Vec<String>> {
        match self.get_verbose_tx(txid) {
            Ok(tx) => Lookup::Found(tx.vin.into_iter().filter_map(|input| input.txid).collect()),
            Err(failure) => failure.into_lookup(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> CoreRpcClient {
        CoreRpcClient::new(RpcConfig {
            url: "http://127.0.0.1:1".to_string(),
            user: String::new(),
            pass: String::new(),
            timeout: Duration::from_millis(50),
        })
        .unwrap()
    }

    #[test]
    fn test_sats_from_btc_rounds_exactly() {
        assert_eq!(sats_from_btc(0.00000500), 500);
        assert_eq!(sats_from_btc(0.0), 0);
        assert_eq!(sats_from_btc(20999999.9769), 2_099_999_997_690_000);
    }

    #[test]
    fn test_verbose_tx_decodes_coinbase_inputs() {
        let tx: VerboseTx = serde_json::from_value(json!({
            "size": 204,
            "vin": [{"coinbase": "04ffff001d0104", "sequence": 4294967295u64}],
            "vout": [{"value": 50.0, "n": 0}]
        }))
        .unwrap();
        assert_eq!(tx.size, 204);
        assert!(tx.vin[0].txid.is_none());
        assert_eq!(sats_from_btc(tx.vout[0].value), 5_000_000_000);
    }

    #[test]
    fn test_malformed_txid_short_circuits_as_transient() {
        let client = offline_client();
        match client.lookup_size("not-a-txid") {
            Lookup::Transient(msg) => assert!(msg.contains("malformed")),
            other => panic!("expected Transient, got {:?}", other),
        }
        // 63 chars: wrong length for a txid
        let short = "a".repeat(63);
        match client.lookup_parents(&short) {
            Lookup::Transient(msg) => assert!(msg.contains("malformed")),
            other => panic!("expected Transient, got {:?}", other),
        }
    }
}
