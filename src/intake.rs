//! Job intake: manifest reading, job registration, and per-job hash reading
//!
//! The manifest names one job file per line, relative to the data directory.
//! Job files that are missing or unreadable degrade the run (warned on
//! stderr, intake flag cleared) instead of aborting it; only the manifest
//! itself failing to open is fatal to the whole run.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Longest accepted transaction hash, in characters.
pub const MAX_HASH_LEN: usize = 64;

/// One registered unit of work: the manifest line's text plus an open
/// reader over the job file. Consumed once by the driver.
pub struct Job {
    pub name: String,
    pub reader: BufReader<File>,
}

/// The accepted jobs, in manifest order, plus whether every manifest entry
/// was registered.
pub struct RunState {
    pub jobs: Vec<Job>,
    pub intake_ok: bool,
}

/// Job-fatal failure while reading a job file's hash lines.
#[derive(Debug, thiserror::Error)]
pub enum HashReadError {
    #[error("invalid tx hash <{0}>")]
    InvalidHash(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read the manifest at `<base>/<manifest>` and register a job for each
/// named file that exists and opens. Bad entries are warned about and clear
/// `intake_ok`; the remaining entries still register.
pub fn init_run(base: &Path, manifest: &str) -> Result<RunState> {
    let manifest_path = base.join(manifest);
    let manifest_file = File::open(&manifest_path)
        .with_context(|| format!("Failed to open manifest <{}>", manifest_path.display()))?;

    let mut jobs = Vec::new();
    let mut intake_ok = true;

    for line in BufReader::new(manifest_file).lines() {
        let line = line
            .with_context(|| format!("Failed to read manifest <{}>", manifest_path.display()))?;
        if line.is_empty() {
            continue;
        }

        let path = base.join(&line);
        if !path.exists() {
            eprintln!("> WARN - file path <{}> doesn't exist", path.display());
            intake_ok = false;
        } else if !path.is_file() {
            eprintln!("> WARN - file path <{}> is not a regular file", path.display());
            intake_ok = false;
        } else {
            match File::open(&path) {
                Ok(file) => {
                    println!("> INFO - file <{}> added to processing queue", path.display());
                    jobs.push(Job {
                        name: line,
                        reader: BufReader::new(file),
                    });
                }
                Err(e) => {
                    eprintln!("> WARN - couldn't open file <{}>: {}", path.display(), e);
                    intake_ok = false;
                }
            }
        }
    }

    Ok(RunState { jobs, intake_ok })
}

/// Read transaction hashes from a job file, one per line, terminators
/// stripped.
///
/// A line longer than [`MAX_HASH_LEN`] fails the whole job: nothing is
/// returned, not even hashes already read. Cancellation observed between
/// lines stops reading early without error and the prefix read so far is
/// returned. The underlying file closes on drop on both paths.
pub fn read_tx_hashes(
    reader: impl BufRead,
    shutdown: &AtomicBool,
) -> Result<Vec<String>, HashReadError> {
    let mut hashes = Vec::new();
    let mut lines = reader.lines();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match lines.next() {
            Some(line) => {
                let hash = line?;
                if hash.len() > MAX_HASH_LEN {
                    return Err(HashReadError::InvalidHash(hash));
                }
                hashes.push(hash);
            }
            None => break,
        }
    }

    Ok(hashes)
}
