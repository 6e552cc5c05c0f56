//! blvm-txscan CLI tool
//!
//! Batch transaction analysis against a Bitcoin Core node: reads a manifest
//! of job files from the data directory, analyzes every listed transaction,
//! and writes per-job result files.

use anyhow::Result;
use blvm_txscan::core_rpc_client::{CoreRpcClient, RpcConfig};
use blvm_txscan::{driver, intake, shutdown};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "blvm-txscan")]
#[command(about = "Bitcoin Commons transaction analysis tool")]
struct Cli {
    /// Directory holding the manifest, the job files, and the output artifacts
    #[arg(long, env = "TXSCAN_DATA_DIR", default_value = "tx-analysis-files")]
    data_dir: PathBuf,

    /// Manifest file name inside the data directory, one job file per line
    #[arg(long, env = "TXSCAN_MANIFEST", default_value = "txscan-input-file")]
    manifest: String,

    /// Bitcoin Core RPC endpoint
    #[arg(long, env = "TXSCAN_RPC_URL", default_value = "http://127.0.0.1:8332")]
    rpc_url: String,

    /// RPC username
    #[arg(long, env = "TXSCAN_RPC_USER")]
    rpc_user: String,

    /// RPC password
    #[arg(long, env = "TXSCAN_RPC_PASS")]
    rpc_pass: String,

    /// RPC request timeout in seconds
    #[arg(long, default_value_t = 30)]
    rpc_timeout: u64,
}

fn main() -> Result<()> {
    // .env before clap so TXSCAN_* values from env files are visible to it
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    shutdown::install_signal_handlers()?;

    let state = intake::init_run(&cli.data_dir, &cli.manifest)?;

    let ledger = CoreRpcClient::new(RpcConfig {
        url: cli.rpc_url,
        user: cli.rpc_user,
        pass: cli.rpc_pass,
        timeout: Duration::from_secs(cli.rpc_timeout),
    })?;

    let mut input = io::stdin().lock();
    driver::run(&cli.data_dir, state, &ledger, shutdown::flag(), &mut input)
}
