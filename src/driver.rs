//! Run driver
//!
//! Sequences intake output through analysis and writing: confirmation
//! prompt when intake degraded, strict manifest-order job processing,
//! per-job error isolation, and a cancellation check before each job.

use anyhow::Result;
use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::analysis;
use crate::intake::{read_tx_hashes, Job, RunState};
use crate::ledger::LedgerQuery;
use crate::writer;

/// Ask whether to continue after a degraded intake. Answers other than
/// y/Y/n/N are rejected and re-prompted; end of input counts as no.
pub fn confirm_continue(input: &mut dyn BufRead) -> Result<bool> {
    println!("> some files failed to be opened successfully. continue? [y/n]");
    loop {
        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        match answer.trim() {
            "y" | "Y" => return Ok(true),
            "n" | "N" => return Ok(false),
            _ => println!("> invalid character entered. continue? [y/n]"),
        }
    }
}

/// Process every registered job in manifest order.
///
/// Jobs are isolated from one another: a job-fatal error (invalid hash,
/// unreadable file, write failure) is reported on stderr and the next job
/// still runs. The shutdown flag is polled once before each job; a mid-job
/// cancellation still gets its partial results written, after which no
/// further jobs are scheduled.
pub fn run(
    base: &Path,
    state: RunState,
    ledger: &dyn LedgerQuery,
    shutdown: &AtomicBool,
    input: &mut dyn BufRead,
) -> Result<()> {
    if !state.intake_ok && !confirm_continue(input)? {
        println!("> transaction analysis complete");
        return Ok(());
    }

    for job in state.jobs {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let name = job.name.clone();
        if let Err(e) = process_job(base, job, ledger, shutdown) {
            eprintln!(">> ERROR - job <{}> failed: {:#}", name, e);
        }
    }

    println!("> transaction analysis complete");
    Ok(())
}

fn process_job(
    base: &Path,
    job: Job,
    ledger: &dyn LedgerQuery,
    shutdown: &AtomicBool,
) -> Result<()> {
    println!(">> INFO - reading tx hashes from <{}>", job.name);
    let hashes = read_tx_hashes(job.reader, shutdown)
        .map_err(|e| anyhow::anyhow!("unable to read <{}>: {}", job.name, e))?;

    println!(">> INFO - beginning transaction analysis of <{}>", job.name);
    let results = analysis::analyze(&hashes, ledger, shutdown);

    writer::write_results(base, &job.name, &results)
}
