//! Result writer
//!
//! Persists one job's classification as three artifacts under the data
//! directory: `<job>_out` (hash, fee, size per resolved transaction),
//! `<job>_parents/` (one file of parent ids per resolved transaction), and
//! `<job>_unknown` (one hash per line). Every file is truncated on open so
//! a rerun fully replaces the previous artifacts for the same job name.
//! Exceptional hashes are not persisted; they only appear in the console
//! counts.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::analysis::ResultSet;

/// Write the three artifacts for `job_name` under `base`. Fails on the
/// first directory or file that cannot be created or written; files already
/// completed for this job are left in place.
pub fn write_results(base: &Path, job_name: &str, results: &ResultSet) -> Result<()> {
    let out_path = base.join(format!("{}_out", job_name));
    let parents_dir = base.join(format!("{}_parents", job_name));
    let unknown_path = base.join(format!("{}_unknown", job_name));

    fs::create_dir_all(&parents_dir).with_context(|| {
        format!("Failed to create parents directory <{}>", parents_dir.display())
    })?;

    println!(
        ">> INFO - writing transaction fees and sizes to <{}>",
        out_path.display()
    );
    println!(
        ">> INFO - writing transaction parents to <{}>",
        parents_dir.display()
    );

    let out_file = File::create(&out_path)
        .with_context(|| format!("Failed to create output file <{}>", out_path.display()))?;
    let mut out = BufWriter::new(out_file);

    for (hash, record) in &results.resolved {
        writeln!(out, "{}, {}, {}", hash, record.fee, record.size)
            .with_context(|| format!("Failed to write output file <{}>", out_path.display()))?;

        let parent_path = parents_dir.join(hash);
        let parent_file = File::create(&parent_path).with_context(|| {
            format!("Failed to create parents file <{}>", parent_path.display())
        })?;
        let mut parent_out = BufWriter::new(parent_file);
        for parent in &record.parents {
            writeln!(parent_out, "{}", parent).with_context(|| {
                format!("Failed to write parents file <{}>", parent_path.display())
            })?;
        }
        parent_out.flush().with_context(|| {
            format!("Failed to write parents file <{}>", parent_path.display())
        })?;
    }

    out.flush()
        .with_context(|| format!("Failed to write output file <{}>", out_path.display()))?;

    println!(
        ">> INFO - writing hashes of unknown transactions to <{}>",
        unknown_path.display()
    );

    let unknown_file = File::create(&unknown_path)
        .with_context(|| format!("Failed to create unknown file <{}>", unknown_path.display()))?;
    let mut unknown_out = BufWriter::new(unknown_file);
    for hash in &results.unknown {
        writeln!(unknown_out, "{}", hash)
            .with_context(|| format!("Failed to write unknown file <{}>", unknown_path.display()))?;
    }
    unknown_out
        .flush()
        .with_context(|| format!("Failed to write unknown file <{}>", unknown_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TxRecord;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn record(fee: i64, size: u64, parents: &[&str]) -> TxRecord {
        TxRecord {
            fee,
            size,
            parents: parents.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_artifact_contents() {
        let dir = TempDir::new().unwrap();
        let mut results = ResultSet::default();
        results
            .resolved
            .insert("abc123".to_string(), record(500, 225, &["p1", "p2"]));
        results.unknown.insert("deadbeef".to_string());
        results.exceptional.push("flaky00".to_string());

        write_results(dir.path(), "jobA", &results).unwrap();

        let out = fs::read_to_string(dir.path().join("jobA_out")).unwrap();
        assert_eq!(out, "abc123, 500, 225\n");
        let parents = fs::read_to_string(dir.path().join("jobA_parents").join("abc123")).unwrap();
        assert_eq!(parents, "p1\np2\n");
        let unknown = fs::read_to_string(dir.path().join("jobA_unknown")).unwrap();
        assert_eq!(unknown, "deadbeef\n");
        // exceptional hashes are reported, never persisted
        assert!(!dir.path().join("jobA_parents").join("flaky00").exists());
        assert!(!out.contains("flaky00"));
    }

    #[test]
    fn test_rewrite_is_byte_identical_and_does_not_accumulate() {
        let dir = TempDir::new().unwrap();
        let mut results = ResultSet::default();
        results
            .resolved
            .insert("aa".to_string(), record(-7, 100, &["p"]));
        results.resolved.insert("bb".to_string(), record(3, 1, &[]));
        results.unknown.insert("cc".to_string());

        write_results(dir.path(), "job", &results).unwrap();
        let first_out = fs::read(dir.path().join("job_out")).unwrap();
        let first_unknown = fs::read(dir.path().join("job_unknown")).unwrap();

        write_results(dir.path(), "job", &results).unwrap();
        assert_eq!(fs::read(dir.path().join("job_out")).unwrap(), first_out);
        assert_eq!(
            fs::read(dir.path().join("job_unknown")).unwrap(),
            first_unknown
        );
    }

    #[test]
    fn test_empty_result_set_still_writes_empty_artifacts() {
        let dir = TempDir::new().unwrap();
        write_results(dir.path(), "job", &ResultSet::default()).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("job_out")).unwrap(), "");
        assert_eq!(
            fs::read_to_string(dir.path().join("job_unknown")).unwrap(),
            ""
        );
        assert!(dir.path().join("job_parents").is_dir());
    }

    proptest! {
        /// Re-parsing `<job>_out` lines recovers the written triples.
        #[test]
        fn test_out_lines_round_trip(
            hash in "[0-9a-f]{1,64}",
            fee in any::<i64>(),
            size in any::<u64>(),
        ) {
            let dir = TempDir::new().unwrap();
            let mut results = ResultSet::default();
            results.resolved.insert(hash.clone(), record(fee, size, &[]));

            write_results(dir.path(), "job", &results).unwrap();

            let out = fs::read_to_string(dir.path().join("job_out")).unwrap();
            let line = out.trim_end_matches('\n');
            let mut fields = line.splitn(3, ", ");
            prop_assert_eq!(fields.next().unwrap(), hash.as_str());
            prop_assert_eq!(fields.next().unwrap().parse::<i64>().unwrap(), fee);
            prop_assert_eq!(fields.next().unwrap().parse::<u64>().unwrap(), size);
        }
    }
}
