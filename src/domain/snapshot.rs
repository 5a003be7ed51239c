//! Snapshot Persistence
//!
//! Writes the full set of tracked records to numbered JSON files inside a
//! run directory. Each process invocation gets its own run directory
//! (`<data_dir>/1`, `<data_dir>/2`, ...), and each snapshot inside it is a
//! complete, non-incremental array (`1.json`, `2.json`, ...).

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::token::TokenRecord;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize snapshot: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write snapshot {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read snapshot {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No snapshot found under {0}")]
    NotFound(PathBuf),
}

/// Writer bound to one run directory
#[derive(Debug)]
pub struct SnapshotWriter {
    run_dir: PathBuf,
    next_seq: u64,
}

impl SnapshotWriter {
    /// Create the next free numbered run directory under `data_dir`
    pub fn create_run(data_dir: &Path) -> Result<Self, SnapshotError> {
        fs::create_dir_all(data_dir).map_err(|source| SnapshotError::DirectoryError {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let run_dir = next_run_dir(data_dir);
        fs::create_dir(&run_dir).map_err(|source| SnapshotError::DirectoryError {
            path: run_dir.clone(),
            source,
        })?;

        tracing::info!("Snapshots will be written to {}", run_dir.display());
        Ok(Self::in_dir(run_dir))
    }

    /// Use an existing directory as the run directory
    pub fn in_dir(run_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_dir: run_dir.into(),
            next_seq: 1,
        }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Sequence number the next snapshot will use
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Snapshots successfully written so far
    pub fn written(&self) -> u64 {
        self.next_seq - 1
    }

    /// Write `records` to `<run_dir>/<seq>.json` and advance the sequence
    pub fn write(&mut self, records: &[TokenRecord]) -> Result<PathBuf, SnapshotError> {
        let path = self.run_dir.join(format!("{}.json", self.next_seq));
        let content = serde_json::to_string_pretty(records)?;

        fs::write(&path, content).map_err(|source| SnapshotError::WriteError {
            path: path.clone(),
            source,
        })?;

        tracing::info!("Snapshot {} saved: {} tokens -> {}", self.next_seq, records.len(), path.display());
        self.next_seq += 1;
        Ok(path)
    }
}

/// First `<data_dir>/<n>` that does not exist yet, starting at 1
pub fn next_run_dir(data_dir: &Path) -> PathBuf {
    let mut n: u64 = 1;
    loop {
        let candidate = data_dir.join(n.to_string());
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Read a snapshot file back
pub fn load_snapshot(path: &Path) -> Result<Vec<TokenRecord>, SnapshotError> {
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Highest-numbered snapshot in the highest-numbered run that has one
pub fn latest_snapshot(data_dir: &Path) -> Result<PathBuf, SnapshotError> {
    let mut runs = numbered_entries(data_dir, |p| p.is_dir());
    runs.sort_by(|a, b| b.0.cmp(&a.0));

    for (_, run) in runs {
        let mut files = numbered_entries(&run, |p| {
            p.is_file() && p.extension().map_or(false, |e| e == "json")
        });
        files.sort_by(|a, b| b.0.cmp(&a.0));
        if let Some((_, file)) = files.into_iter().next() {
            return Ok(file);
        }
    }

    Err(SnapshotError::NotFound(data_dir.to_path_buf()))
}

fn numbered_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Vec<(u64, PathBuf)> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| keep(p))
        .filter_map(|p| {
            let n = p.file_stem()?.to_str()?.parse::<u64>().ok()?;
            Some((n, p))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::{BoostedToken, HolderConcentration, Valuation};
    use chrono::Utc;
    use tempfile::tempdir;

    fn records() -> Vec<TokenRecord> {
        vec![TokenRecord::new(
            &BoostedToken::new("MintA", "https://dexscreener.com/solana/minta", 10.0),
            Valuation::new(500_000.0, 12_000.0, 0.0005),
            HolderConcentration::Unavailable,
            Utc::now(),
        )]
    }

    #[test]
    fn test_run_dirs_are_numbered() {
        let dir = tempdir().unwrap();

        let first = SnapshotWriter::create_run(dir.path()).unwrap();
        let second = SnapshotWriter::create_run(dir.path()).unwrap();

        assert_eq!(first.run_dir(), dir.path().join("1"));
        assert_eq!(second.run_dir(), dir.path().join("2"));
    }

    #[test]
    fn test_create_run_makes_missing_data_dir() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("data");

        let writer = SnapshotWriter::create_run(&data_dir).unwrap();
        assert!(writer.run_dir().is_dir());
    }

    #[test]
    fn test_write_increments_sequence() {
        let dir = tempdir().unwrap();
        let mut writer = SnapshotWriter::create_run(dir.path()).unwrap();

        let p1 = writer.write(&records()).unwrap();
        let p2 = writer.write(&[]).unwrap();

        assert!(p1.ends_with("1/1.json"));
        assert!(p2.ends_with("1/2.json"));
        assert_eq!(writer.written(), 2);
        assert_eq!(writer.next_seq(), 3);
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempdir().unwrap();
        let mut writer = SnapshotWriter::create_run(dir.path()).unwrap();
        let original = records();

        let path = writer.write(&original).unwrap();
        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, original);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.trim_start().starts_with('['));
        assert!(raw.contains("\"initialBoost\""));
    }

    #[test]
    fn test_write_failure_keeps_sequence() {
        let dir = tempdir().unwrap();
        let mut writer = SnapshotWriter::in_dir(dir.path().join("missing"));

        assert!(matches!(writer.write(&records()), Err(SnapshotError::WriteError { .. })));
        assert_eq!(writer.next_seq(), 1);
    }

    #[test]
    fn test_latest_snapshot() {
        let dir = tempdir().unwrap();
        let mut run1 = SnapshotWriter::create_run(dir.path()).unwrap();
        run1.write(&records()).unwrap();
        run1.write(&records()).unwrap();

        let mut run2 = SnapshotWriter::create_run(dir.path()).unwrap();
        for _ in 0..10 {
            run2.write(&records()).unwrap();
        }

        // Empty third run is skipped
        SnapshotWriter::create_run(dir.path()).unwrap();

        let latest = latest_snapshot(dir.path()).unwrap();
        assert_eq!(latest, dir.path().join("2").join("10.json"));
    }

    #[test]
    fn test_latest_snapshot_empty() {
        let dir = tempdir().unwrap();
        assert!(matches!(latest_snapshot(dir.path()), Err(SnapshotError::NotFound(_))));
    }
}
